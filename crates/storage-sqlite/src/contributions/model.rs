//! Database models for the contribution ledger.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use caritas_core::contributions::{Contribution, ContributionDraft, ContributionStatus};

use crate::errors::StorageError;
use crate::utils::{parse_decimal, parse_token};

/// Database model for ledger rows. Amounts are stored as TEXT.
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
#[diesel(table_name = crate::schema::contributions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ContributionDB {
    pub id: String,
    pub donor_id: String,
    pub campaign_id: String,
    pub amount: String,
    pub payment_method: Option<String>,
    pub receipt_number: Option<String>,
    pub anonymous: bool,
    pub message: Option<String>,
    pub registered_by: String,
    pub contributed_at: NaiveDateTime,
    pub status: String,
}

impl ContributionDB {
    pub fn from_draft(id: String, draft: ContributionDraft) -> Self {
        Self {
            id,
            donor_id: draft.donor_id,
            campaign_id: draft.campaign_id,
            amount: draft.amount.to_string(),
            payment_method: draft.payment_method,
            receipt_number: draft.receipt_number,
            anonymous: draft.anonymous,
            message: draft.message,
            registered_by: draft.registered_by,
            contributed_at: draft.contributed_at,
            status: ContributionStatus::Confirmed.as_str().to_string(),
        }
    }
}

impl TryFrom<ContributionDB> for Contribution {
    type Error = StorageError;

    fn try_from(db: ContributionDB) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_decimal(&db.amount, "amount")?,
            status: parse_token(&db.status, "contribution status")?,
            id: db.id,
            donor_id: db.donor_id,
            campaign_id: db.campaign_id,
            payment_method: db.payment_method,
            receipt_number: db.receipt_number,
            anonymous: db.anonymous,
            message: db.message,
            registered_by: db.registered_by,
            contributed_at: db.contributed_at,
        })
    }
}
