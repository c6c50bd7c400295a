use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use caritas_core::{
    campaigns::{
        Campaign, CampaignFilter, CampaignStatusChange, CampaignUpdate, CampaignView, NewCampaign,
        SweepReport,
    },
    constants::DEFAULT_RANKING_LIMIT,
    contributions::{Contribution, NewContribution, RecordedContribution},
    statistics::{CampaignRankingEntry, CampaignStatistics},
};

use super::{json_body, optional_body, query_params};
use crate::{
    auth::Actor,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{ApiResponse, RankingQuery, ReasonBody, StatusChangeResult},
};

type Envelope<T> = Json<ApiResponse<T>>;

async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CampaignFilter>, QueryRejection>,
) -> ApiResult<Envelope<Vec<CampaignView>>> {
    let filter = query_params(query)?;
    let campaigns = state.campaign_service.list_campaigns(filter)?;
    Ok(Json(ApiResponse::ok(campaigns)))
}

async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Actor(creator): Actor,
    payload: Result<Json<NewCampaign>, JsonRejection>,
) -> ApiResult<(StatusCode, Envelope<Campaign>)> {
    let new_campaign = json_body(payload)?;
    let campaign = state
        .campaign_service
        .create_campaign(new_campaign, &creator)
        .await
        .map_err(ApiError::write)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(campaign).with_message("Campaign created")),
    ))
}

async fn get_ranking(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RankingQuery>, QueryRejection>,
) -> ApiResult<Envelope<Vec<CampaignRankingEntry>>> {
    let limit = query_params(query)?.limit.unwrap_or(DEFAULT_RANKING_LIMIT);
    let ranking = state.campaign_service.get_ranking(limit)?;
    Ok(Json(ApiResponse::ok(ranking)))
}

async fn run_sweep(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
) -> ApiResult<Envelope<SweepReport>> {
    tracing::info!("Manual status sweep requested by {}", actor);
    let report = state.campaign_service.run_status_sweep().await;
    Ok(Json(ApiResponse::ok(report)))
}

async fn get_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Envelope<CampaignView>> {
    let campaign = state.campaign_service.get_campaign(&id)?;
    Ok(Json(ApiResponse::ok(campaign)))
}

async fn update_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    payload: Result<Json<CampaignUpdate>, JsonRejection>,
) -> ApiResult<Envelope<CampaignView>> {
    let update = json_body(payload)?;
    let campaign = state
        .campaign_service
        .update_campaign(&id, update, Some(actor))
        .await
        .map_err(ApiError::write)?;
    Ok(Json(
        ApiResponse::ok(campaign).with_message("Campaign updated"),
    ))
}

async fn list_contributions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Envelope<Vec<Contribution>>> {
    let contributions = state.campaign_service.list_campaign_contributions(&id)?;
    Ok(Json(ApiResponse::ok(contributions)))
}

async fn record_contribution(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(registered_by): Actor,
    payload: Result<Json<NewContribution>, JsonRejection>,
) -> ApiResult<(StatusCode, Envelope<RecordedContribution>)> {
    let new_contribution = json_body(payload)?;
    let recorded = state
        .campaign_service
        .record_contribution(&id, new_contribution, &registered_by)
        .await
        .map_err(ApiError::write)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(recorded).with_message("Contribution recorded")),
    ))
}

async fn get_statistics(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Envelope<CampaignStatistics>> {
    let statistics = state.campaign_service.get_campaign_statistics(&id)?;
    Ok(Json(ApiResponse::ok(statistics)))
}

async fn get_history(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Envelope<Vec<CampaignStatusChange>>> {
    let history = state.campaign_service.get_status_history(&id)?;
    Ok(Json(ApiResponse::ok(history)))
}

async fn close_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    body: Bytes,
) -> ApiResult<Envelope<StatusChangeResult>> {
    let ReasonBody { reason } = optional_body(&body)?;
    let changed = state
        .campaign_service
        .close_campaign(&id, reason, Some(actor))
        .await
        .map_err(ApiError::write)?;
    let campaign = state.campaign_service.get_campaign(&id)?;
    let message = if changed {
        "Campaign closed".to_string()
    } else {
        format!("Campaign is already {}", campaign.campaign.status)
    };
    Ok(Json(
        ApiResponse::ok(StatusChangeResult { changed, campaign }).with_message(message),
    ))
}

async fn cancel_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    body: Bytes,
) -> ApiResult<Envelope<StatusChangeResult>> {
    let ReasonBody { reason } = optional_body(&body)?;
    let changed = state
        .campaign_service
        .cancel_campaign(&id, reason, Some(actor))
        .await
        .map_err(ApiError::write)?;
    let campaign = state.campaign_service.get_campaign(&id)?;
    let message = if changed {
        "Campaign cancelled".to_string()
    } else {
        format!("Campaign is already {}", campaign.campaign.status)
    };
    Ok(Json(
        ApiResponse::ok(StatusChangeResult { changed, campaign }).with_message(message),
    ))
}

async fn reactivate_campaign(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
) -> ApiResult<Envelope<StatusChangeResult>> {
    state
        .campaign_service
        .reactivate_campaign(&id, Some(actor))
        .await
        .map_err(ApiError::write)?;
    let campaign = state.campaign_service.get_campaign(&id)?;
    Ok(Json(
        ApiResponse::ok(StatusChangeResult {
            changed: true,
            campaign,
        })
        .with_message("Campaign reactivated"),
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/campaigns/ranking", get(get_ranking))
        .route("/campaigns/sweep", post(run_sweep))
        .route("/campaigns/{id}", get(get_campaign).put(update_campaign))
        .route(
            "/campaigns/{id}/contributions",
            get(list_contributions).post(record_contribution),
        )
        .route("/campaigns/{id}/statistics", get(get_statistics))
        .route("/campaigns/{id}/history", get(get_history))
        .route("/campaigns/{id}/close", post(close_campaign))
        .route("/campaigns/{id}/cancel", post(cancel_campaign))
        .route("/campaigns/{id}/reactivate", post(reactivate_campaign))
}
