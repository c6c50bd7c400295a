//! Database models for campaigns.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use caritas_core::campaigns::{
    Campaign, CampaignChanges, CampaignDraft, CampaignStatus, CampaignStatusChange,
};

use crate::errors::StorageError;
use crate::utils::{parse_decimal, parse_token};

/// Database model for campaigns
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CampaignDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal_amount: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CampaignDB {
    /// New planned campaign row.
    pub fn from_draft(id: String, draft: CampaignDraft, now: NaiveDateTime) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            goal_amount: draft.goal_amount.map(|g| g.to_string()),
            start_date: draft.start_date,
            end_date: draft.end_date,
            category: draft.category,
            image_url: draft.image_url,
            status: CampaignStatus::Planned.as_str().to_string(),
            created_by: draft.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<CampaignDB> for Campaign {
    type Error = StorageError;

    fn try_from(db: CampaignDB) -> Result<Self, Self::Error> {
        Ok(Self {
            goal_amount: db
                .goal_amount
                .as_deref()
                .map(|g| parse_decimal(g, "goal_amount"))
                .transpose()?,
            status: parse_token(&db.status, "campaign status")?,
            id: db.id,
            name: db.name,
            description: db.description,
            start_date: db.start_date,
            end_date: db.end_date,
            category: db.category,
            image_url: db.image_url,
            created_by: db.created_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

/// Changeset for editable campaign fields. `None` leaves a column untouched,
/// `Some(None)` writes NULL.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct CampaignChangesDB {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub goal_amount: Option<Option<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub category: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl CampaignChangesDB {
    pub fn new(changes: CampaignChanges, now: NaiveDateTime) -> Self {
        Self {
            name: changes.name,
            description: changes.description,
            goal_amount: changes.goal_amount.map(|g| g.map(|v| v.to_string())),
            start_date: changes.start_date,
            end_date: changes.end_date,
            category: changes.category,
            image_url: changes.image_url,
            updated_at: now,
        }
    }
}

/// Changeset applied by a status transition.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::campaigns)]
pub struct StatusChangesetDB {
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub updated_at: NaiveDateTime,
}

/// Database model for the status audit trail
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::campaign_status_changes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatusChangeDB {
    pub id: String,
    pub campaign_id: String,
    pub from_status: String,
    pub to_status: String,
    pub transition_trigger: String,
    pub reason: Option<String>,
    pub actor: Option<String>,
    pub changed_at: NaiveDateTime,
}

impl TryFrom<CampaignStatusChangeDB> for CampaignStatusChange {
    type Error = StorageError;

    fn try_from(db: CampaignStatusChangeDB) -> Result<Self, Self::Error> {
        Ok(Self {
            from_status: parse_token(&db.from_status, "from_status")?,
            to_status: parse_token(&db.to_status, "to_status")?,
            trigger: parse_token(&db.transition_trigger, "transition_trigger")?,
            id: db.id,
            campaign_id: db.campaign_id,
            reason: db.reason,
            actor: db.actor,
            changed_at: db.changed_at,
        })
    }
}
