//! Contribution ledger domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::campaigns::{Campaign, CampaignView};
use crate::constants::*;
use crate::errors::{Error, Result, ValidationError};
use crate::utils::campaign_date_from_utc;

/// Confirmation state of a ledger row. Only confirmed rows count anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContributionStatus {
    #[serde(rename = "confirmada")]
    Confirmed,
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "revogada")]
    Revoked,
}

impl ContributionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionStatus::Confirmed => CONTRIBUTION_STATUS_CONFIRMED,
            ContributionStatus::Pending => CONTRIBUTION_STATUS_PENDING,
            ContributionStatus::Revoked => CONTRIBUTION_STATUS_REVOKED,
        }
    }
}

impl fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CONTRIBUTION_STATUS_CONFIRMED => Ok(ContributionStatus::Confirmed),
            CONTRIBUTION_STATUS_PENDING => Ok(ContributionStatus::Pending),
            CONTRIBUTION_STATUS_REVOKED => Ok(ContributionStatus::Revoked),
            _ => Err(format!("Unknown contribution status: {}", s)),
        }
    }
}

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub donor_id: String,
    pub campaign_id: String,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub receipt_number: Option<String>,
    pub anonymous: bool,
    pub message: Option<String>,
    pub registered_by: String,
    pub contributed_at: NaiveDateTime,
    pub status: ContributionStatus,
}

impl Contribution {
    pub fn is_confirmed(&self) -> bool {
        self.status == ContributionStatus::Confirmed
    }

    /// Calendar day the contribution counts for in `tz`.
    pub fn contribution_date(&self, tz: Tz) -> NaiveDate {
        campaign_date_from_utc(self.contributed_at.and_utc(), tz)
    }
}

/// Input model for recording a contribution. The campaign comes from the route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContribution {
    #[serde(default)]
    pub donor_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub receipt_number: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewContribution {
    /// The amount, if it is positive and within [`MAX_MONEY_AMOUNT`].
    pub fn validated_amount(&self) -> Result<Decimal> {
        match self.amount {
            None => Err(Error::Validation(ValidationError::MissingField(
                "amount".to_string(),
            ))),
            Some(amount) if amount <= Decimal::ZERO => Err(Error::invalid_input(format!(
                "Contribution amount must be positive, got {}",
                amount
            ))),
            Some(amount) if amount > Decimal::from(MAX_MONEY_AMOUNT) => {
                Err(Error::invalid_input(format!(
                    "Contribution amount must not exceed {}, got {}",
                    MAX_MONEY_AMOUNT, amount
                )))
            }
            Some(amount) => Ok(amount),
        }
    }

    pub fn validated_donor_id(&self) -> Result<&str> {
        self.donor_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Validation(ValidationError::MissingField("donorId".to_string())))
    }
}

/// Validated ledger row ready for storage. Storage assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionDraft {
    pub donor_id: String,
    pub campaign_id: String,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub receipt_number: Option<String>,
    pub anonymous: bool,
    pub message: Option<String>,
    pub registered_by: String,
    pub contributed_at: NaiveDateTime,
}

/// Promotion of a planned campaign performed together with the append.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignActivation {
    pub start_date: NaiveDate,
}

/// One append to the ledger.
///
/// Storage re-reads the campaign status inside the write transaction. The row
/// is only inserted if the campaign is active at that point, after applying
/// `activation` to a campaign that is still planned.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerAppend {
    pub contribution: ContributionDraft,
    pub activation: Option<CampaignActivation>,
}

/// A donor's contribution together with the campaign it went to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorContribution {
    pub campaign: Campaign,
    pub contribution: Contribution,
}

/// Result of recording a contribution: the new row and the refreshed campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedContribution {
    pub contribution: Contribution,
    pub campaign: CampaignView,
}
