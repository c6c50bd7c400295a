use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use caritas_core::campaigns::{Campaign, CampaignStatus, TransitionTrigger};
use caritas_core::contributions::{
    Contribution, ContributionRepositoryTrait, DonorContribution, LedgerAppend,
};
use caritas_core::errors::{Error, Result};

use super::model::ContributionDB;
use crate::campaigns::{current_status, write_status_change, CampaignDB, StatusChangeRecord};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{campaigns, contributions};
use crate::utils::chunk_for_sqlite;

const CONFIRMED: &str = caritas_core::constants::CONTRIBUTION_STATUS_CONFIRMED;

pub struct ContributionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ContributionRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ContributionRepository { pool, writer }
    }
}

fn into_contributions(rows: Vec<ContributionDB>) -> Result<Vec<Contribution>> {
    rows.into_iter()
        .map(|row| Contribution::try_from(row).map_err(Error::from))
        .collect()
}

#[async_trait]
impl ContributionRepositoryTrait for ContributionRepository {
    fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<Contribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = contributions::table
            .filter(contributions::campaign_id.eq(campaign_id))
            .filter(contributions::status.eq(CONFIRMED))
            .select(ContributionDB::as_select())
            .order((
                contributions::contributed_at.desc(),
                contributions::id.desc(),
            ))
            .load::<ContributionDB>(&mut conn)
            .into_core()?;
        into_contributions(rows)
    }

    fn list_confirmed_for_campaigns(&self, campaign_ids: &[String]) -> Result<Vec<Contribution>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows = Vec::new();
        for chunk in chunk_for_sqlite(campaign_ids) {
            rows.extend(
                contributions::table
                    .filter(contributions::campaign_id.eq_any(chunk))
                    .filter(contributions::status.eq(CONFIRMED))
                    .select(ContributionDB::as_select())
                    .load::<ContributionDB>(&mut conn)
                    .into_core()?,
            );
        }
        into_contributions(rows)
    }

    fn list_confirmed(&self) -> Result<Vec<Contribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = contributions::table
            .filter(contributions::status.eq(CONFIRMED))
            .select(ContributionDB::as_select())
            .load::<ContributionDB>(&mut conn)
            .into_core()?;
        into_contributions(rows)
    }

    fn list_by_donor(&self, donor_id: &str) -> Result<Vec<DonorContribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = contributions::table
            .inner_join(campaigns::table)
            .filter(contributions::donor_id.eq(donor_id))
            .filter(contributions::status.eq(CONFIRMED))
            .select((ContributionDB::as_select(), CampaignDB::as_select()))
            .order((
                contributions::contributed_at.desc(),
                contributions::id.desc(),
            ))
            .load::<(ContributionDB, CampaignDB)>(&mut conn)
            .into_core()?;

        rows.into_iter()
            .map(|(contribution, campaign)| {
                Ok(DonorContribution {
                    contribution: Contribution::try_from(contribution)?,
                    campaign: Campaign::try_from(campaign)?,
                })
            })
            .collect::<std::result::Result<Vec<_>, StorageError>>()
            .map_err(Error::from)
    }

    fn count_for_campaign(&self, campaign_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let count: i64 = contributions::table
            .filter(contributions::campaign_id.eq(campaign_id))
            .count()
            .get_result(&mut conn)
            .into_core()?;
        Ok(count as usize)
    }

    async fn append(&self, entry: LedgerAppend) -> Result<Contribution> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Contribution> {
                let LedgerAppend {
                    contribution: draft,
                    activation,
                } = entry;

                let mut status = current_status(conn, &draft.campaign_id)?.ok_or_else(|| {
                    Error::NotFound(format!("Campaign '{}'", draft.campaign_id))
                })?;

                if let (CampaignStatus::Planned, Some(activation)) = (status, activation) {
                    let promoted = write_status_change(
                        conn,
                        StatusChangeRecord {
                            campaign_id: &draft.campaign_id,
                            from: CampaignStatus::Planned,
                            to: CampaignStatus::Active,
                            trigger: TransitionTrigger::FirstContribution,
                            reason: None,
                            actor: Some(draft.registered_by.clone()),
                        },
                        Some(activation.start_date),
                    )?;
                    if promoted {
                        debug!(
                            "Campaign {} activated by its first contribution",
                            draft.campaign_id
                        );
                        status = CampaignStatus::Active;
                    }
                }

                // Re-checked here so a concurrent close or cancel wins.
                if status != CampaignStatus::Active {
                    return Err(Error::invalid_state(
                        "Campaign no longer accepts contributions",
                        status,
                    ));
                }

                let row = ContributionDB::from_draft(Uuid::now_v7().to_string(), draft);
                let inserted = diesel::insert_into(contributions::table)
                    .values(&row)
                    .returning(ContributionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Contribution::try_from(inserted)?)
            })
            .await
    }
}
