use std::sync::Arc;

use log::{debug, info};

use super::contributions_model::{
    CampaignActivation, Contribution, ContributionDraft, DonorContribution, LedgerAppend,
    NewContribution,
};
use super::contributions_traits::ContributionRepositoryTrait;
use crate::campaigns::{
    launch_date_on_first_contribution, CampaignRepositoryTrait, CampaignStatus, StatusReconciler,
};
use crate::donors::DonorRegistryTrait;
use crate::errors::{Error, Result};
use crate::utils::Clock;

/// Validates and appends contributions.
///
/// Checks run in a fixed order and each failure is distinct: amount, campaign,
/// donor, campaign status. None of them writes anything.
pub struct ContributionLedger {
    repository: Arc<dyn ContributionRepositoryTrait>,
    campaign_repository: Arc<dyn CampaignRepositoryTrait>,
    donor_registry: Arc<dyn DonorRegistryTrait>,
    reconciler: Arc<StatusReconciler>,
    clock: Arc<dyn Clock>,
}

impl ContributionLedger {
    pub fn new(
        repository: Arc<dyn ContributionRepositoryTrait>,
        campaign_repository: Arc<dyn CampaignRepositoryTrait>,
        donor_registry: Arc<dyn DonorRegistryTrait>,
        reconciler: Arc<StatusReconciler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            campaign_repository,
            donor_registry,
            reconciler,
            clock,
        }
    }

    pub async fn record_contribution(
        &self,
        campaign_id: &str,
        new_contribution: NewContribution,
        registered_by: &str,
    ) -> Result<Contribution> {
        let amount = new_contribution.validated_amount()?;
        let donor_id = new_contribution.validated_donor_id()?.to_string();

        let campaign = self
            .campaign_repository
            .get_campaign(campaign_id)?
            .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", campaign_id)))?;

        if !self.donor_registry.donor_exists(&donor_id)? {
            return Err(Error::NotFound(format!("Donor '{}'", donor_id)));
        }

        // Status must be current before the guard below reads it.
        let campaign = self.reconciler.reconcile(campaign).await?;
        let today = self.clock.today();

        let activation = match campaign.status {
            CampaignStatus::Active => None,
            CampaignStatus::Planned if campaign.end_date.is_some_and(|end| end < today) => {
                return Err(Error::invalid_state(
                    "Campaign window ended before it was activated",
                    campaign.status,
                ));
            }
            CampaignStatus::Planned => Some(CampaignActivation {
                start_date: launch_date_on_first_contribution(&campaign, today),
            }),
            status @ (CampaignStatus::Closed | CampaignStatus::Cancelled) => {
                return Err(Error::invalid_state(
                    "Campaign no longer accepts contributions",
                    status,
                ));
            }
        };

        let draft = ContributionDraft {
            donor_id,
            campaign_id: campaign.id.clone(),
            amount,
            payment_method: new_contribution.payment_method,
            receipt_number: new_contribution.receipt_number,
            anonymous: new_contribution.anonymous,
            message: new_contribution.message,
            registered_by: registered_by.to_string(),
            contributed_at: self.clock.now().naive_utc(),
        };

        if activation.is_some() {
            debug!(
                "First contribution activates planned campaign {}",
                campaign.id
            );
        }

        let contribution = self
            .repository
            .append(LedgerAppend {
                contribution: draft,
                activation,
            })
            .await?;
        info!(
            "Recorded contribution {} of {} to campaign {}",
            contribution.id, contribution.amount, contribution.campaign_id
        );
        Ok(contribution)
    }

    pub fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<Contribution>> {
        if self.campaign_repository.get_campaign(campaign_id)?.is_none() {
            return Err(Error::NotFound(format!("Campaign '{}'", campaign_id)));
        }
        self.repository.list_by_campaign(campaign_id)
    }

    pub fn list_by_donor(&self, donor_id: &str) -> Result<Vec<DonorContribution>> {
        if !self.donor_registry.donor_exists(donor_id)? {
            return Err(Error::NotFound(format!("Donor '{}'", donor_id)));
        }
        self.repository.list_by_donor(donor_id)
    }
}
