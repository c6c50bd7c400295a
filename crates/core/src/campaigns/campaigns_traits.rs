use async_trait::async_trait;
use chrono::NaiveDate;

use crate::campaigns::campaigns_model::{
    BulkStatusTransition, Campaign, CampaignChanges, CampaignDraft, CampaignFilter,
    CampaignStatus, CampaignStatusChange, CampaignUpdate, CampaignView, NewCampaign,
    StatusTransition, SweepReport,
};
use crate::contributions::{
    Contribution, DonorContribution, NewContribution, RecordedContribution,
};
use crate::errors::Result;
use crate::statistics::{CampaignRankingEntry, CampaignStatistics};

/// Trait for campaign repository operations
#[async_trait]
pub trait CampaignRepositoryTrait: Send + Sync {
    fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>>;

    /// Lists campaigns matching the filter. `today` is only used by
    /// `only_currently_running`.
    fn list_campaigns(&self, filter: &CampaignFilter, today: NaiveDate) -> Result<Vec<Campaign>>;

    fn list_campaigns_by_status(&self, statuses: &[CampaignStatus]) -> Result<Vec<Campaign>>;

    /// Status changes of one campaign, oldest first.
    fn get_status_history(&self, campaign_id: &str) -> Result<Vec<CampaignStatusChange>>;

    /// Inserts a new campaign in the planned status.
    async fn insert_campaign(&self, draft: CampaignDraft) -> Result<Campaign>;

    async fn update_campaign(&self, campaign_id: &str, changes: CampaignChanges)
        -> Result<Campaign>;

    /// Applies the transition if the stored status is still allowed.
    /// Returns false when nothing changed.
    async fn apply_status_transition(&self, transition: StatusTransition) -> Result<bool>;

    /// Applies one status change to many campaigns at once, each row guarded by
    /// its current status. Returns the ids that actually changed.
    async fn apply_bulk_transition(&self, transition: BulkStatusTransition)
        -> Result<Vec<String>>;
}

/// Trait for campaign service operations
#[async_trait]
pub trait CampaignServiceTrait: Send + Sync {
    async fn create_campaign(&self, new_campaign: NewCampaign, creator_id: &str)
        -> Result<Campaign>;
    async fn update_campaign(
        &self,
        campaign_id: &str,
        update: CampaignUpdate,
        actor: Option<String>,
    ) -> Result<CampaignView>;
    fn get_campaign(&self, campaign_id: &str) -> Result<CampaignView>;
    fn list_campaigns(&self, filter: CampaignFilter) -> Result<Vec<CampaignView>>;
    fn get_status_history(&self, campaign_id: &str) -> Result<Vec<CampaignStatusChange>>;

    async fn record_contribution(
        &self,
        campaign_id: &str,
        new_contribution: NewContribution,
        registered_by: &str,
    ) -> Result<RecordedContribution>;
    fn list_campaign_contributions(&self, campaign_id: &str) -> Result<Vec<Contribution>>;
    fn list_donor_contributions(&self, donor_id: &str) -> Result<Vec<DonorContribution>>;

    async fn close_campaign(
        &self,
        campaign_id: &str,
        reason: Option<String>,
        actor: Option<String>,
    ) -> Result<bool>;
    async fn cancel_campaign(
        &self,
        campaign_id: &str,
        reason: Option<String>,
        actor: Option<String>,
    ) -> Result<bool>;
    async fn reactivate_campaign(&self, campaign_id: &str, actor: Option<String>)
        -> Result<Campaign>;

    fn get_campaign_statistics(&self, campaign_id: &str) -> Result<CampaignStatistics>;
    fn get_ranking(&self, limit: usize) -> Result<Vec<CampaignRankingEntry>>;

    async fn run_status_sweep(&self) -> SweepReport;
}
