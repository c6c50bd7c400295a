//! Statistics module - aggregates computed from the contribution ledger.

mod statistics_model;
mod statistics_service;


pub use statistics_model::{
    CampaignRankingEntry, CampaignStatistics, DailyContribution, DonorRanking,
};
pub use statistics_service::{
    campaign_totals, compute_campaign_statistics, daily_evolution, percent_of_goal,
    rank_campaigns, top_donors, StatisticsService, StatisticsServiceTrait,
};
