//! Campaign domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::*;
use crate::errors::{Error, Result, ValidationError};

/// Lifecycle status of a campaign.
///
/// The serialized tokens are part of the public contract and of the stored
/// data, so they never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    #[serde(rename = "planejada")]
    Planned,
    #[serde(rename = "ativa")]
    Active,
    #[serde(rename = "encerrada")]
    Closed,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 4] = [
        CampaignStatus::Planned,
        CampaignStatus::Active,
        CampaignStatus::Closed,
        CampaignStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Planned => CAMPAIGN_STATUS_PLANNED,
            CampaignStatus::Active => CAMPAIGN_STATUS_ACTIVE,
            CampaignStatus::Closed => CAMPAIGN_STATUS_CLOSED,
            CampaignStatus::Cancelled => CAMPAIGN_STATUS_CANCELLED,
        }
    }

    /// Planned and active campaigns can still be closed or cancelled by hand.
    pub fn is_open(&self) -> bool {
        matches!(self, CampaignStatus::Planned | CampaignStatus::Active)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CAMPAIGN_STATUS_PLANNED => Ok(CampaignStatus::Planned),
            CAMPAIGN_STATUS_ACTIVE => Ok(CampaignStatus::Active),
            CAMPAIGN_STATUS_CLOSED => Ok(CampaignStatus::Closed),
            CAMPAIGN_STATUS_CANCELLED => Ok(CampaignStatus::Cancelled),
            _ => Err(format!("Unknown campaign status: {}", s)),
        }
    }
}

/// Where a campaign's window sits relative to today, regardless of status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalSituation {
    Upcoming,
    Ongoing,
    Finished,
}

/// Domain model representing a fundraising campaign
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal_amount: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub status: CampaignStatus,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Campaign {
    /// True when today falls inside the campaign window.
    pub fn is_running_on(&self, today: NaiveDate) -> bool {
        self.start_date <= today && self.end_date.map_or(true, |end| end >= today)
    }

    pub fn temporal_situation(&self, today: NaiveDate) -> TemporalSituation {
        if self.start_date > today {
            TemporalSituation::Upcoming
        } else if self.end_date.is_some_and(|end| end < today) {
            TemporalSituation::Finished
        } else {
            TemporalSituation::Ongoing
        }
    }
}

/// Input model for creating a new campaign.
///
/// Required fields are optional here so that a missing value is reported as a
/// field-level validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goal_amount: Option<Decimal>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Accepted for compatibility and ignored: campaigns always start planned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
}

impl NewCampaign {
    /// Validates the input and produces the record handed to storage.
    pub fn into_draft(self, created_by: &str) -> Result<CampaignDraft> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::Validation(ValidationError::MissingField("name".into())))?
            .to_string();
        let start_date = self
            .start_date
            .ok_or_else(|| Error::Validation(ValidationError::MissingField("startDate".into())))?;
        validate_goal(self.goal_amount)?;
        validate_window(start_date, self.end_date)?;

        Ok(CampaignDraft {
            name,
            description: self.description,
            goal_amount: self.goal_amount,
            start_date,
            end_date: self.end_date,
            category: self.category,
            image_url: self.image_url,
            created_by: created_by.to_string(),
        })
    }
}

/// Validated campaign ready to be persisted. Storage always writes it as planned.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignDraft {
    pub name: String,
    pub description: Option<String>,
    pub goal_amount: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_by: String,
}

/// Partial update of a campaign.
///
/// For nullable fields, an absent key leaves the value untouched while an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub goal_amount: Option<Option<Decimal>>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
}

fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl CampaignUpdate {
    /// True when at least one whitelisted field is present.
    pub fn has_changes(&self) -> bool {
        self.status.is_some() || !self.changes().is_empty()
    }

    /// The non-status part of the update.
    pub fn changes(&self) -> CampaignChanges {
        CampaignChanges {
            name: self.name.as_ref().map(|n| n.trim().to_string()),
            description: self.description.clone(),
            goal_amount: self.goal_amount,
            start_date: self.start_date,
            end_date: self.end_date,
            category: self.category.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Field changes handed to storage. Status is never part of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub goal_amount: Option<Option<Decimal>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub category: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

impl CampaignChanges {
    pub fn is_empty(&self) -> bool {
        self == &CampaignChanges::default()
    }

    /// Returns the campaign as it would look after applying these changes.
    pub fn apply_to(&self, campaign: &Campaign) -> Campaign {
        let mut merged = campaign.clone();
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(goal) = self.goal_amount {
            merged.goal_amount = goal;
        }
        if let Some(start) = self.start_date {
            merged.start_date = start;
        }
        if let Some(end) = self.end_date {
            merged.end_date = end;
        }
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        if let Some(image_url) = &self.image_url {
            merged.image_url = image_url.clone();
        }
        merged
    }

    /// Validates the changes against the stored campaign.
    ///
    /// Dates are checked on the merged result, so moving only the start date
    /// past an existing end date is rejected too.
    pub fn validate_against(&self, campaign: &Campaign) -> Result<()> {
        if let Some(name) = &self.name {
            if name.is_empty() {
                return Err(Error::invalid_input("Campaign name cannot be empty"));
            }
        }
        if let Some(goal) = self.goal_amount {
            validate_goal(goal)?;
        }
        let merged = self.apply_to(campaign);
        validate_window(merged.start_date, merged.end_date)
    }
}

fn validate_goal(goal: Option<Decimal>) -> Result<()> {
    match goal {
        Some(goal) if goal < Decimal::ZERO => Err(Error::invalid_input(
            "Goal amount must be greater than or equal to zero",
        )),
        Some(goal) if goal > Decimal::from(MAX_MONEY_AMOUNT) => Err(Error::invalid_input(
            format!("Goal amount must not exceed {}, got {}", MAX_MONEY_AMOUNT, goal),
        )),
        _ => Ok(()),
    }
}

fn validate_window(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<()> {
    match end_date {
        Some(end) if end < start_date => Err(Error::invalid_input(format!(
            "End date {} precedes start date {}",
            end, start_date
        ))),
        _ => Ok(()),
    }
}

/// Listing filters. `only_currently_running` looks at dates, not status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignFilter {
    #[serde(default)]
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub only_currently_running: bool,
}

/// Aggregates derived from the ledger. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTotals {
    pub donor_count: usize,
    pub contribution_count: usize,
    pub total_raised: Decimal,
    pub percent_of_goal: Decimal,
}

impl Default for CampaignTotals {
    fn default() -> Self {
        Self {
            donor_count: 0,
            contribution_count: 0,
            total_raised: Decimal::ZERO,
            percent_of_goal: Decimal::ZERO,
        }
    }
}

/// A campaign together with its derived view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: Campaign,
    #[serde(flatten)]
    pub totals: CampaignTotals,
    pub temporal_situation: TemporalSituation,
}

/// What caused a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    /// Periodic date-driven sweep.
    Sweep,
    /// Single-campaign reconciliation ahead of a state-dependent operation.
    Reconcile,
    FirstContribution,
    ManualActivate,
    ManualClose,
    ManualCancel,
    ManualReactivate,
}

impl TransitionTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionTrigger::Sweep => "sweep",
            TransitionTrigger::Reconcile => "reconcile",
            TransitionTrigger::FirstContribution => "first_contribution",
            TransitionTrigger::ManualActivate => "manual_activate",
            TransitionTrigger::ManualClose => "manual_close",
            TransitionTrigger::ManualCancel => "manual_cancel",
            TransitionTrigger::ManualReactivate => "manual_reactivate",
        }
    }
}

impl fmt::Display for TransitionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionTrigger {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sweep" => Ok(TransitionTrigger::Sweep),
            "reconcile" => Ok(TransitionTrigger::Reconcile),
            "first_contribution" => Ok(TransitionTrigger::FirstContribution),
            "manual_activate" => Ok(TransitionTrigger::ManualActivate),
            "manual_close" => Ok(TransitionTrigger::ManualClose),
            "manual_cancel" => Ok(TransitionTrigger::ManualCancel),
            "manual_reactivate" => Ok(TransitionTrigger::ManualReactivate),
            _ => Err(format!("Unknown transition trigger: {}", s)),
        }
    }
}

/// A conditional status change for a single campaign.
///
/// Storage applies it only if the stored status is still one of
/// `allowed_from`, and records an audit row in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub campaign_id: String,
    pub allowed_from: Vec<CampaignStatus>,
    pub to: CampaignStatus,
    /// New start date, when the transition moves the launch forward.
    pub start_date: Option<NaiveDate>,
    pub trigger: TransitionTrigger,
    pub reason: Option<String>,
    pub actor: Option<String>,
}

/// A set-based conditional status change used by the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkStatusTransition {
    pub campaign_ids: Vec<String>,
    pub from: CampaignStatus,
    pub to: CampaignStatus,
    pub trigger: TransitionTrigger,
}

/// Audit record of one status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatusChange {
    pub id: String,
    pub campaign_id: String,
    pub from_status: CampaignStatus,
    pub to_status: CampaignStatus,
    pub trigger: TransitionTrigger,
    pub reason: Option<String>,
    pub actor: Option<String>,
    pub changed_at: NaiveDateTime,
}

/// Outcome of one sweep run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub activated: Vec<String>,
    pub closed: Vec<String>,
    pub failures: Vec<String>,
}

impl SweepReport {
    pub fn is_noop(&self) -> bool {
        self.activated.is_empty() && self.closed.is_empty() && self.failures.is_empty()
    }
}
