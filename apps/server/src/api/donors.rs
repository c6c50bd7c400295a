use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use caritas_core::contributions::DonorContribution;

use crate::{error::ApiResult, main_lib::AppState, models::ApiResponse};

async fn list_donor_contributions(
    Path(donor_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<DonorContribution>>>> {
    let contributions = state.campaign_service.list_donor_contributions(&donor_id)?;
    Ok(Json(ApiResponse::ok(contributions)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/donors/{id}/contributions", get(list_donor_contributions))
}
