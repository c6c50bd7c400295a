use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use super::campaigns_model::{
    Campaign, CampaignFilter, CampaignStatus, CampaignStatusChange, CampaignUpdate, CampaignView,
    NewCampaign, SweepReport,
};
use super::campaigns_traits::{CampaignRepositoryTrait, CampaignServiceTrait};
use super::status_reconciler::StatusReconciler;
use crate::contributions::{
    Contribution, ContributionLedger, ContributionRepositoryTrait, DonorContribution,
    NewContribution, RecordedContribution,
};
use crate::donors::DonorRegistryTrait;
use crate::errors::{Error, Result};
use crate::statistics::{
    campaign_totals, CampaignRankingEntry, CampaignStatistics, StatisticsService,
    StatisticsServiceTrait,
};
use crate::utils::Clock;

/// Service for managing campaigns and their contributions
pub struct CampaignService {
    repository: Arc<dyn CampaignRepositoryTrait>,
    contribution_repository: Arc<dyn ContributionRepositoryTrait>,
    reconciler: Arc<StatusReconciler>,
    ledger: ContributionLedger,
    statistics: Arc<dyn StatisticsServiceTrait>,
    clock: Arc<dyn Clock>,
}

impl CampaignService {
    /// Creates a new CampaignService instance
    pub fn new(
        repository: Arc<dyn CampaignRepositoryTrait>,
        contribution_repository: Arc<dyn ContributionRepositoryTrait>,
        donor_registry: Arc<dyn DonorRegistryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reconciler = Arc::new(StatusReconciler::new(repository.clone(), clock.clone()));
        let ledger = ContributionLedger::new(
            contribution_repository.clone(),
            repository.clone(),
            donor_registry.clone(),
            reconciler.clone(),
            clock.clone(),
        );
        let statistics = Arc::new(StatisticsService::new(
            repository.clone(),
            contribution_repository.clone(),
            donor_registry,
            clock.clone(),
        ));
        Self {
            repository,
            contribution_repository,
            reconciler,
            ledger,
            statistics,
            clock,
        }
    }

    fn load(&self, campaign_id: &str) -> Result<Campaign> {
        self.repository
            .get_campaign(campaign_id)?
            .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", campaign_id)))
    }

    fn build_view(
        &self,
        campaign: Campaign,
        contributions: &[&Contribution],
    ) -> Result<CampaignView> {
        let totals = campaign_totals(campaign.goal_amount, contributions.iter().copied())?;
        let temporal_situation = campaign.temporal_situation(self.clock.today());
        Ok(CampaignView {
            campaign,
            totals,
            temporal_situation,
        })
    }

    fn view_of(&self, campaign: Campaign) -> Result<CampaignView> {
        let contributions = self.contribution_repository.list_by_campaign(&campaign.id)?;
        let refs: Vec<&Contribution> = contributions.iter().collect();
        self.build_view(campaign, &refs)
    }

    /// Moves a campaign to a status requested through an update.
    async fn apply_requested_status(
        &self,
        campaign_id: &str,
        from: CampaignStatus,
        to: CampaignStatus,
        actor: Option<String>,
    ) -> Result<()> {
        match (from, to) {
            (from, to) if from == to => {}
            (_, CampaignStatus::Closed) => {
                self.reconciler.close(campaign_id, None, actor).await?;
            }
            (_, CampaignStatus::Cancelled) => {
                self.reconciler.cancel(campaign_id, None, actor).await?;
            }
            (CampaignStatus::Planned, CampaignStatus::Active) => {
                self.reconciler.activate(campaign_id, actor).await?;
            }
            (_, _) => {
                self.reconciler.reactivate(campaign_id, actor).await?;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CampaignServiceTrait for CampaignService {
    async fn create_campaign(
        &self,
        new_campaign: NewCampaign,
        creator_id: &str,
    ) -> Result<Campaign> {
        if let Some(status) = new_campaign.status {
            if status != CampaignStatus::Planned {
                debug!("Ignoring requested status {} on campaign creation", status);
            }
        }
        let draft = new_campaign.into_draft(creator_id)?;
        let campaign = self.repository.insert_campaign(draft).await?;
        info!("Created campaign {} ({})", campaign.id, campaign.name);
        Ok(campaign)
    }

    async fn update_campaign(
        &self,
        campaign_id: &str,
        update: CampaignUpdate,
        actor: Option<String>,
    ) -> Result<CampaignView> {
        let campaign = self.load(campaign_id)?;
        if !update.has_changes() {
            return Err(Error::invalid_input("nothing to update"));
        }

        let changes = update.changes();
        changes.validate_against(&campaign)?;
        if let Some(requested) = update.status {
            self.reconciler
                .check_requested_status(&changes.apply_to(&campaign), requested)?;
        }

        if !changes.is_empty() {
            self.repository
                .update_campaign(campaign_id, changes)
                .await?;
            info!("Updated campaign {}", campaign_id);
        }
        if let Some(requested) = update.status {
            self.apply_requested_status(campaign_id, campaign.status, requested, actor)
                .await?;
        }

        let current = self.reconciler.reconcile_campaign(campaign_id).await?;
        self.view_of(current)
    }

    fn get_campaign(&self, campaign_id: &str) -> Result<CampaignView> {
        let campaign = self.load(campaign_id)?;
        self.view_of(campaign)
    }

    fn list_campaigns(&self, filter: CampaignFilter) -> Result<Vec<CampaignView>> {
        let campaigns = self
            .repository
            .list_campaigns(&filter, self.clock.today())?;
        if campaigns.is_empty() {
            return Ok(Vec::new());
        }

        let campaign_ids: Vec<String> = campaigns.iter().map(|c| c.id.clone()).collect();
        let contributions = self
            .contribution_repository
            .list_confirmed_for_campaigns(&campaign_ids)?;
        let mut by_campaign: HashMap<&str, Vec<&Contribution>> = HashMap::new();
        for contribution in &contributions {
            by_campaign
                .entry(contribution.campaign_id.as_str())
                .or_default()
                .push(contribution);
        }

        campaigns
            .into_iter()
            .map(|campaign| {
                let rows = by_campaign.remove(campaign.id.as_str()).unwrap_or_default();
                self.build_view(campaign, &rows)
            })
            .collect()
    }

    fn get_status_history(&self, campaign_id: &str) -> Result<Vec<CampaignStatusChange>> {
        self.load(campaign_id)?;
        self.repository.get_status_history(campaign_id)
    }

    async fn record_contribution(
        &self,
        campaign_id: &str,
        new_contribution: NewContribution,
        registered_by: &str,
    ) -> Result<RecordedContribution> {
        let contribution = self
            .ledger
            .record_contribution(campaign_id, new_contribution, registered_by)
            .await?;
        let campaign = self.get_campaign(campaign_id)?;
        Ok(RecordedContribution {
            contribution,
            campaign,
        })
    }

    fn list_campaign_contributions(&self, campaign_id: &str) -> Result<Vec<Contribution>> {
        self.ledger.list_by_campaign(campaign_id)
    }

    fn list_donor_contributions(&self, donor_id: &str) -> Result<Vec<DonorContribution>> {
        self.ledger.list_by_donor(donor_id)
    }

    async fn close_campaign(
        &self,
        campaign_id: &str,
        reason: Option<String>,
        actor: Option<String>,
    ) -> Result<bool> {
        self.reconciler.close(campaign_id, reason, actor).await
    }

    async fn cancel_campaign(
        &self,
        campaign_id: &str,
        reason: Option<String>,
        actor: Option<String>,
    ) -> Result<bool> {
        self.reconciler.cancel(campaign_id, reason, actor).await
    }

    async fn reactivate_campaign(
        &self,
        campaign_id: &str,
        actor: Option<String>,
    ) -> Result<Campaign> {
        self.reconciler.reactivate(campaign_id, actor).await
    }

    fn get_campaign_statistics(&self, campaign_id: &str) -> Result<CampaignStatistics> {
        self.statistics.campaign_statistics(campaign_id)
    }

    fn get_ranking(&self, limit: usize) -> Result<Vec<CampaignRankingEntry>> {
        self.statistics.ranking(limit)
    }

    async fn run_status_sweep(&self) -> SweepReport {
        self.reconciler.run_sweep().await
    }
}
