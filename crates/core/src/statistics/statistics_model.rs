//! Read-only views derived from the contribution ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::campaigns::Campaign;

/// Total given by one donor to one campaign.
///
/// Anonymous contributions are grouped under a synthetic donor with no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRanking {
    pub donor_id: Option<String>,
    pub donor_name: String,
    pub anonymous: bool,
    pub total_amount: Decimal,
    pub contribution_count: usize,
}

/// Contributions received on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyContribution {
    pub date: NaiveDate,
    pub contribution_count: usize,
    pub total_amount: Decimal,
    /// Running total up to and including this day.
    pub cumulative_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatistics {
    pub campaign_id: String,
    pub donor_count: usize,
    pub contribution_count: usize,
    pub total_raised: Decimal,
    pub average_amount: Decimal,
    pub max_amount: Option<Decimal>,
    pub min_amount: Option<Decimal>,
    pub percent_of_goal: Decimal,
    pub top_donors: Vec<DonorRanking>,
    pub daily_evolution: Vec<DailyContribution>,
}

/// One row of the fundraising ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRankingEntry {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub donor_count: usize,
    pub contribution_count: usize,
    pub total_raised: Decimal,
    pub percent_of_goal: Decimal,
}
