use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use caritas_core::campaigns::{
    BulkStatusTransition, Campaign, CampaignChanges, CampaignDraft, CampaignFilter,
    CampaignRepositoryTrait, CampaignStatus, CampaignStatusChange, StatusTransition,
    TransitionTrigger,
};
use caritas_core::errors::{Error, Result};

use super::model::{CampaignChangesDB, CampaignDB, CampaignStatusChangeDB, StatusChangesetDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{campaign_status_changes, campaigns};
use crate::utils::{chunk_for_sqlite, parse_token};

/// One audit row, written in the caller's transaction.
pub(crate) struct StatusChangeRecord<'a> {
    pub campaign_id: &'a str,
    pub from: CampaignStatus,
    pub to: CampaignStatus,
    pub trigger: TransitionTrigger,
    pub reason: Option<String>,
    pub actor: Option<String>,
}

impl StatusChangeRecord<'_> {
    fn into_db(self, changed_at: NaiveDateTime) -> CampaignStatusChangeDB {
        CampaignStatusChangeDB {
            id: Uuid::now_v7().to_string(),
            campaign_id: self.campaign_id.to_string(),
            from_status: self.from.as_str().to_string(),
            to_status: self.to.as_str().to_string(),
            transition_trigger: self.trigger.as_str().to_string(),
            reason: self.reason,
            actor: self.actor,
            changed_at,
        }
    }
}

/// Sets a campaign's status, guarded by the status read in the same
/// transaction, and appends the audit row. Returns false if the guard failed.
pub(crate) fn write_status_change(
    conn: &mut SqliteConnection,
    record: StatusChangeRecord<'_>,
    start_date: Option<NaiveDate>,
) -> Result<bool> {
    let now = Utc::now().naive_utc();
    let updated = diesel::update(
        campaigns::table
            .find(record.campaign_id)
            .filter(campaigns::status.eq(record.from.as_str())),
    )
    .set(&StatusChangesetDB {
        status: record.to.as_str().to_string(),
        start_date,
        updated_at: now,
    })
    .execute(conn)
    .map_err(StorageError::from)?;

    if updated == 0 {
        return Ok(false);
    }

    diesel::insert_into(campaign_status_changes::table)
        .values(&record.into_db(now))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(true)
}

/// Reads the stored status of one campaign inside a write job.
pub(crate) fn current_status(
    conn: &mut SqliteConnection,
    campaign_id: &str,
) -> Result<Option<CampaignStatus>> {
    let stored: Option<String> = campaigns::table
        .find(campaign_id)
        .select(campaigns::status)
        .first(conn)
        .optional()
        .map_err(StorageError::from)?;
    Ok(stored
        .map(|s| parse_token::<CampaignStatus>(&s, "campaign status"))
        .transpose()?)
}

pub struct CampaignRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CampaignRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CampaignRepository { pool, writer }
    }
}

fn into_campaigns(rows: Vec<CampaignDB>) -> Result<Vec<Campaign>> {
    rows.into_iter()
        .map(|row| Campaign::try_from(row).map_err(Error::from))
        .collect()
}

#[async_trait]
impl CampaignRepositoryTrait for CampaignRepository {
    fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>> {
        let mut conn = get_connection(&self.pool)?;
        let row = campaigns::table
            .find(campaign_id)
            .select(CampaignDB::as_select())
            .first::<CampaignDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Campaign::try_from).transpose()?)
    }

    fn list_campaigns(&self, filter: &CampaignFilter, today: NaiveDate) -> Result<Vec<Campaign>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = campaigns::table
            .select(CampaignDB::as_select())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(campaigns::status.eq(status.as_str()));
        }
        if let Some(category) = &filter.category {
            query = query.filter(campaigns::category.eq(category.clone()));
        }
        if filter.only_currently_running {
            query = query.filter(campaigns::start_date.le(today)).filter(
                campaigns::end_date
                    .is_null()
                    .or(campaigns::end_date.ge(today)),
            );
        }

        let rows = query
            .order((campaigns::start_date.desc(), campaigns::id.asc()))
            .load::<CampaignDB>(&mut conn)
            .into_core()?;
        into_campaigns(rows)
    }

    fn list_campaigns_by_status(&self, statuses: &[CampaignStatus]) -> Result<Vec<Campaign>> {
        let mut conn = get_connection(&self.pool)?;
        let tokens: Vec<&str> = statuses.iter().map(CampaignStatus::as_str).collect();
        let rows = campaigns::table
            .filter(campaigns::status.eq_any(tokens))
            .select(CampaignDB::as_select())
            .order(campaigns::id.asc())
            .load::<CampaignDB>(&mut conn)
            .into_core()?;
        into_campaigns(rows)
    }

    fn get_status_history(&self, campaign_id: &str) -> Result<Vec<CampaignStatusChange>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = campaign_status_changes::table
            .filter(campaign_status_changes::campaign_id.eq(campaign_id))
            .select(CampaignStatusChangeDB::as_select())
            .order((
                campaign_status_changes::changed_at.asc(),
                campaign_status_changes::id.asc(),
            ))
            .load::<CampaignStatusChangeDB>(&mut conn)
            .into_core()?;
        rows.into_iter()
            .map(|row| CampaignStatusChange::try_from(row).map_err(Error::from))
            .collect()
    }

    async fn insert_campaign(&self, draft: CampaignDraft) -> Result<Campaign> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Campaign> {
                let row = CampaignDB::from_draft(
                    Uuid::now_v7().to_string(),
                    draft,
                    Utc::now().naive_utc(),
                );
                let inserted = diesel::insert_into(campaigns::table)
                    .values(&row)
                    .returning(CampaignDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Campaign::try_from(inserted)?)
            })
            .await
    }

    async fn update_campaign(
        &self,
        campaign_id: &str,
        changes: CampaignChanges,
    ) -> Result<Campaign> {
        let campaign_id = campaign_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Campaign> {
                let changeset = CampaignChangesDB::new(changes, Utc::now().naive_utc());
                let updated = diesel::update(campaigns::table.find(&campaign_id))
                    .set(&changeset)
                    .returning(CampaignDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", campaign_id)))?;
                Ok(Campaign::try_from(updated)?)
            })
            .await
    }

    async fn apply_status_transition(&self, transition: StatusTransition) -> Result<bool> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let current = current_status(conn, &transition.campaign_id)?.ok_or_else(|| {
                    Error::NotFound(format!("Campaign '{}'", transition.campaign_id))
                })?;
                if !transition.allowed_from.contains(&current) {
                    debug!(
                        "Skipping {} of campaign {}: status is {}",
                        transition.trigger, transition.campaign_id, current
                    );
                    return Ok(false);
                }
                write_status_change(
                    conn,
                    StatusChangeRecord {
                        campaign_id: &transition.campaign_id,
                        from: current,
                        to: transition.to,
                        trigger: transition.trigger,
                        reason: transition.reason,
                        actor: transition.actor,
                    },
                    transition.start_date,
                )
            })
            .await
    }

    async fn apply_bulk_transition(
        &self,
        transition: BulkStatusTransition,
    ) -> Result<Vec<String>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Vec<String>> {
                let now = Utc::now().naive_utc();
                let mut changed: Vec<String> = Vec::new();

                for chunk in chunk_for_sqlite(&transition.campaign_ids) {
                    let ids: Vec<String> = diesel::update(
                        campaigns::table
                            .filter(campaigns::id.eq_any(chunk))
                            .filter(campaigns::status.eq(transition.from.as_str())),
                    )
                    .set((
                        campaigns::status.eq(transition.to.as_str()),
                        campaigns::updated_at.eq(now),
                    ))
                    .returning(campaigns::id)
                    .get_results(conn)
                    .map_err(StorageError::from)?;
                    changed.extend(ids);
                }

                let audit: Vec<CampaignStatusChangeDB> = changed
                    .iter()
                    .map(|campaign_id| {
                        StatusChangeRecord {
                            campaign_id,
                            from: transition.from,
                            to: transition.to,
                            trigger: transition.trigger,
                            reason: None,
                            actor: None,
                        }
                        .into_db(now)
                    })
                    .collect();
                for rows in chunk_for_sqlite(&audit) {
                    diesel::insert_into(campaign_status_changes::table)
                        .values(rows)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                changed.sort();
                Ok(changed)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_db, TestDb};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repository(db: &TestDb) -> CampaignRepository {
        CampaignRepository::new(Arc::clone(&db.pool), db.writer.clone())
    }

    #[tokio::test]
    async fn test_insert_is_always_planned_and_keeps_decimal_goal() {
        let db = create_test_db();
        let repo = repository(&db);

        let campaign = repo
            .insert_campaign(CampaignDraft {
                name: "Winter coats".to_string(),
                description: Some("Coats for the shelter".to_string()),
                goal_amount: Some(dec!(12345.67)),
                start_date: date(2024, 6, 1),
                end_date: Some(date(2024, 8, 31)),
                category: Some("clothing".to_string()),
                image_url: None,
                created_by: "staff-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(campaign.status, CampaignStatus::Planned);
        let stored = repo.get_campaign(&campaign.id).unwrap().unwrap();
        assert_eq!(stored.goal_amount, Some(dec!(12345.67)));
        assert_eq!(stored.end_date, Some(date(2024, 8, 31)));
        assert!(repo.get_campaign("missing").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_clears_nullable_fields() {
        let db = create_test_db();
        db.execute(
            "INSERT INTO campaigns (id, name, category, start_date, status, created_by, created_at, updated_at) \
             VALUES ('c1', 'Food', 'food', '2024-06-01', 'ativa', 'staff-1', datetime('now'), datetime('now'))",
        );
        let repo = repository(&db);

        let updated = repo
            .update_campaign(
                "c1",
                CampaignChanges {
                    name: Some("Food baskets".to_string()),
                    category: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Food baskets");
        assert_eq!(updated.category, None);
        assert_eq!(updated.status, CampaignStatus::Active);

        let missing = repo
            .update_campaign(
                "nope",
                CampaignChanges {
                    name: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let db = create_test_db();
        db.insert_campaign("a", "ativa", "2024-06-01", None);
        db.insert_campaign("b", "planejada", "2024-07-01", None);
        db.insert_campaign("c", "ativa", "2024-05-01", Some("2024-05-31"));
        db.insert_campaign("d", "cancelada", "2024-06-01", Some("2024-06-30"));
        let repo = repository(&db);
        let today = date(2024, 6, 15);

        let all = repo
            .list_campaigns(&CampaignFilter::default(), today)
            .unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "d", "c"]);

        let running = repo
            .list_campaigns(
                &CampaignFilter {
                    only_currently_running: true,
                    ..Default::default()
                },
                today,
            )
            .unwrap();
        let ids: Vec<&str> = running.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);

        let active = repo
            .list_campaigns_by_status(&[CampaignStatus::Active])
            .unwrap();
        assert_eq!(active.len(), 2);
    }

    #[tokio::test]
    async fn test_status_transition_is_conditional_and_audited() {
        let db = create_test_db();
        db.insert_campaign("c1", "planejada", "2024-06-01", None);
        let repo = repository(&db);

        let applied = repo
            .apply_status_transition(StatusTransition {
                campaign_id: "c1".to_string(),
                allowed_from: vec![CampaignStatus::Planned, CampaignStatus::Active],
                to: CampaignStatus::Cancelled,
                start_date: None,
                trigger: TransitionTrigger::ManualCancel,
                reason: Some("duplicate".to_string()),
                actor: Some("staff-2".to_string()),
            })
            .await
            .unwrap();
        assert!(applied);

        let again = repo
            .apply_status_transition(StatusTransition {
                campaign_id: "c1".to_string(),
                allowed_from: vec![CampaignStatus::Planned, CampaignStatus::Active],
                to: CampaignStatus::Closed,
                start_date: None,
                trigger: TransitionTrigger::ManualClose,
                reason: None,
                actor: None,
            })
            .await
            .unwrap();
        assert!(!again);

        let campaign = repo.get_campaign("c1").unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Cancelled);
        let history = repo.get_status_history("c1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from_status, CampaignStatus::Planned);
        assert_eq!(history[0].to_status, CampaignStatus::Cancelled);
        assert_eq!(history[0].reason.as_deref(), Some("duplicate"));
        assert_eq!(history[0].actor.as_deref(), Some("staff-2"));
    }

    #[tokio::test]
    async fn test_bulk_transition_skips_rows_whose_status_moved() {
        let db = create_test_db();
        db.insert_campaign("a", "ativa", "2024-05-01", Some("2024-05-31"));
        db.insert_campaign("b", "cancelada", "2024-05-01", Some("2024-05-31"));
        let repo = repository(&db);

        let changed = repo
            .apply_bulk_transition(BulkStatusTransition {
                campaign_ids: vec!["a".to_string(), "b".to_string()],
                from: CampaignStatus::Active,
                to: CampaignStatus::Closed,
                trigger: TransitionTrigger::Sweep,
            })
            .await
            .unwrap();

        assert_eq!(changed, vec!["a".to_string()]);
        assert_eq!(
            repo.get_campaign("b").unwrap().unwrap().status,
            CampaignStatus::Cancelled
        );
        assert_eq!(repo.get_status_history("a").unwrap().len(), 1);
        assert!(repo.get_status_history("b").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_window_is_rejected_by_the_schema() {
        let db = create_test_db();
        db.insert_campaign("c1", "planejada", "2024-06-01", Some("2024-06-30"));
        let repo = repository(&db);

        let result = repo
            .update_campaign(
                "c1",
                CampaignChanges {
                    start_date: Some(date(2024, 7, 1)),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(
            repo.get_campaign("c1").unwrap().unwrap().start_date,
            date(2024, 6, 1)
        );
    }
}
