//! Campaign state machine.
//!
//! Every date-based guard lives in this module. Other components ask the
//! reconciler what a campaign's status should be instead of comparing dates
//! themselves.
//!
//! | From                | To                  | Trigger                         |
//! |---------------------|---------------------|---------------------------------|
//! | planejada           | ativa               | sweep, reconcile, contribution  |
//! | ativa               | encerrada           | sweep, reconcile                |
//! | planejada, ativa    | encerrada           | manual close                    |
//! | planejada, ativa    | cancelada           | manual cancel                   |
//! | cancelada, encerrada| ativa or planejada  | manual reactivate               |

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info, warn};

use super::campaigns_model::{
    BulkStatusTransition, Campaign, CampaignStatus, StatusTransition, SweepReport,
    TransitionTrigger,
};
use super::campaigns_traits::CampaignRepositoryTrait;
use crate::errors::{Error, Result};
use crate::utils::Clock;

/// Planned campaigns may go live once their window is open.
pub fn activation_guard(campaign: &Campaign, today: NaiveDate) -> bool {
    campaign.start_date <= today && campaign.end_date.map_or(true, |end| end >= today)
}

/// Active campaigns expire the day after their end date.
pub fn expiry_guard(campaign: &Campaign, today: NaiveDate) -> bool {
    campaign.end_date.is_some_and(|end| end < today)
}

/// The status the dates call for, if it differs from the stored one.
///
/// Cancelled and closed campaigns are never moved by dates alone, and a planned
/// campaign whose window passed without activation is left for a human.
pub fn scheduled_transition(campaign: &Campaign, today: NaiveDate) -> Option<CampaignStatus> {
    match campaign.status {
        CampaignStatus::Planned if activation_guard(campaign, today) => {
            Some(CampaignStatus::Active)
        }
        CampaignStatus::Active if expiry_guard(campaign, today) => Some(CampaignStatus::Closed),
        _ => None,
    }
}

/// Status a closed or cancelled campaign returns to when reactivated.
pub fn reactivation_target(campaign: &Campaign, today: NaiveDate) -> Result<CampaignStatus> {
    if campaign.status.is_open() {
        return Err(Error::invalid_state(
            "Only closed or cancelled campaigns can be reactivated",
            campaign.status,
        ));
    }
    if expiry_guard(campaign, today) {
        return Err(Error::invalid_state(
            format!(
                "Campaign ended on {} and cannot be reactivated",
                campaign.end_date.unwrap_or(campaign.start_date)
            ),
            campaign.status,
        ));
    }
    if campaign.start_date <= today {
        Ok(CampaignStatus::Active)
    } else {
        Ok(CampaignStatus::Planned)
    }
}

/// Start date a planned campaign takes when its first contribution arrives.
///
/// The date only ever moves earlier: a donation received before the declared
/// start is the real launch.
pub fn launch_date_on_first_contribution(campaign: &Campaign, today: NaiveDate) -> NaiveDate {
    campaign.start_date.min(today)
}

/// Applies date-driven and manual status transitions.
pub struct StatusReconciler {
    repository: Arc<dyn CampaignRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl StatusReconciler {
    pub fn new(repository: Arc<dyn CampaignRepositoryTrait>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn load(&self, campaign_id: &str) -> Result<Campaign> {
        self.repository
            .get_campaign(campaign_id)?
            .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", campaign_id)))
    }

    /// Brings one campaign's stored status in line with its dates.
    pub async fn reconcile_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        let campaign = self.load(campaign_id)?;
        self.reconcile(campaign).await
    }

    /// Same as [`reconcile_campaign`](Self::reconcile_campaign) for an already
    /// loaded campaign. Returns the campaign as it is stored afterwards.
    pub async fn reconcile(&self, campaign: Campaign) -> Result<Campaign> {
        let today = self.today();
        let Some(target) = scheduled_transition(&campaign, today) else {
            return Ok(campaign);
        };

        let applied = self
            .repository
            .apply_status_transition(StatusTransition {
                campaign_id: campaign.id.clone(),
                allowed_from: vec![campaign.status],
                to: target,
                start_date: None,
                trigger: TransitionTrigger::Reconcile,
                reason: None,
                actor: None,
            })
            .await?;
        if applied {
            info!(
                "Campaign {} reconciled from {} to {}",
                campaign.id, campaign.status, target
            );
        } else {
            debug!(
                "Campaign {} changed concurrently while reconciling",
                campaign.id
            );
        }
        self.load(&campaign.id)
    }

    /// Runs one sweep over every campaign.
    ///
    /// Activation and expiry run as independent set-based updates; a failure in
    /// one is reported and does not stop the other.
    pub async fn run_sweep(&self) -> SweepReport {
        let today = self.today();
        let mut report = SweepReport::default();
        debug!("Running campaign status sweep for {}", today);

        match self
            .sweep_step(CampaignStatus::Planned, CampaignStatus::Active, today)
            .await
        {
            Ok(ids) => report.activated = ids,
            Err(e) => {
                warn!("Campaign activation sweep failed: {}", e);
                report.failures.push(format!("activation: {}", e));
            }
        }

        match self
            .sweep_step(CampaignStatus::Active, CampaignStatus::Closed, today)
            .await
        {
            Ok(ids) => report.closed = ids,
            Err(e) => {
                warn!("Campaign expiry sweep failed: {}", e);
                report.failures.push(format!("expiry: {}", e));
            }
        }

        if !report.is_noop() {
            info!(
                "Campaign sweep: {} activated, {} closed, {} failures",
                report.activated.len(),
                report.closed.len(),
                report.failures.len()
            );
        }
        report
    }

    async fn sweep_step(
        &self,
        from: CampaignStatus,
        to: CampaignStatus,
        today: NaiveDate,
    ) -> Result<Vec<String>> {
        let campaign_ids: Vec<String> = self
            .repository
            .list_campaigns_by_status(&[from])?
            .into_iter()
            .filter(|c| scheduled_transition(c, today) == Some(to))
            .map(|c| c.id)
            .collect();

        if campaign_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.repository
            .apply_bulk_transition(BulkStatusTransition {
                campaign_ids,
                from,
                to,
                trigger: TransitionTrigger::Sweep,
            })
            .await
    }

    /// Closes a planned or active campaign. Returns false if it was not open.
    pub async fn close(
        &self,
        campaign_id: &str,
        reason: Option<String>,
        actor: Option<String>,
    ) -> Result<bool> {
        self.finish(
            campaign_id,
            CampaignStatus::Closed,
            TransitionTrigger::ManualClose,
            reason,
            actor,
        )
        .await
    }

    /// Cancels a planned or active campaign. Returns false if it was not open.
    pub async fn cancel(
        &self,
        campaign_id: &str,
        reason: Option<String>,
        actor: Option<String>,
    ) -> Result<bool> {
        self.finish(
            campaign_id,
            CampaignStatus::Cancelled,
            TransitionTrigger::ManualCancel,
            reason,
            actor,
        )
        .await
    }

    async fn finish(
        &self,
        campaign_id: &str,
        to: CampaignStatus,
        trigger: TransitionTrigger,
        reason: Option<String>,
        actor: Option<String>,
    ) -> Result<bool> {
        let campaign = self.reconcile_campaign(campaign_id).await?;
        if !campaign.status.is_open() {
            debug!(
                "Ignoring {} for campaign {} in status {}",
                trigger, campaign_id, campaign.status
            );
            return Ok(false);
        }

        let applied = self
            .repository
            .apply_status_transition(StatusTransition {
                campaign_id: campaign_id.to_string(),
                allowed_from: vec![CampaignStatus::Planned, CampaignStatus::Active],
                to,
                start_date: None,
                trigger,
                reason,
                actor,
            })
            .await?;
        if applied {
            info!("Campaign {} moved from {} to {}", campaign_id, campaign.status, to);
        }
        Ok(applied)
    }

    /// Reopens a closed or cancelled campaign whose window has not passed.
    pub async fn reactivate(&self, campaign_id: &str, actor: Option<String>) -> Result<Campaign> {
        let campaign = self.load(campaign_id)?;
        let target = reactivation_target(&campaign, self.today())?;

        let applied = self
            .repository
            .apply_status_transition(StatusTransition {
                campaign_id: campaign_id.to_string(),
                allowed_from: vec![campaign.status],
                to: target,
                start_date: None,
                trigger: TransitionTrigger::ManualReactivate,
                reason: None,
                actor,
            })
            .await?;

        let current = self.load(campaign_id)?;
        if !applied {
            return Err(Error::invalid_state(
                "Campaign status changed while reactivating",
                current.status,
            ));
        }
        info!(
            "Campaign {} reactivated from {} to {}",
            campaign_id, campaign.status, target
        );
        Ok(current)
    }

    /// Activates a planned campaign by hand. Requires its window to be open.
    pub async fn activate(&self, campaign_id: &str, actor: Option<String>) -> Result<Campaign> {
        let campaign = self.reconcile_campaign(campaign_id).await?;
        match campaign.status {
            CampaignStatus::Active => return Ok(campaign),
            CampaignStatus::Planned if activation_guard(&campaign, self.today()) => {}
            status => {
                return Err(Error::invalid_state(
                    "Campaign cannot be activated outside its date window",
                    status,
                ))
            }
        }

        let applied = self
            .repository
            .apply_status_transition(StatusTransition {
                campaign_id: campaign_id.to_string(),
                allowed_from: vec![CampaignStatus::Planned],
                to: CampaignStatus::Active,
                start_date: None,
                trigger: TransitionTrigger::ManualActivate,
                reason: None,
                actor,
            })
            .await?;

        let current = self.load(campaign_id)?;
        if !applied && current.status != CampaignStatus::Active {
            return Err(Error::invalid_state(
                "Campaign status changed while activating",
                current.status,
            ));
        }
        Ok(current)
    }

    /// Checks, without writing, that a status requested through an update is
    /// reachable from the campaign's current state.
    pub fn check_requested_status(
        &self,
        campaign: &Campaign,
        requested: CampaignStatus,
    ) -> Result<()> {
        let today = self.today();
        let current = campaign.status;
        match (current, requested) {
            (from, to) if from == to => Ok(()),
            (from, CampaignStatus::Closed | CampaignStatus::Cancelled) if from.is_open() => Ok(()),
            (CampaignStatus::Planned, CampaignStatus::Active)
                if activation_guard(campaign, today) =>
            {
                Ok(())
            }
            (CampaignStatus::Closed | CampaignStatus::Cancelled, to) if to.is_open() => {
                let target = reactivation_target(campaign, today)?;
                if target == to {
                    Ok(())
                } else {
                    Err(Error::invalid_state(
                        format!("Reactivated campaign would be {}, not {}", target, to),
                        current,
                    ))
                }
            }
            (_, to) => Err(Error::invalid_state(
                format!("Campaign cannot move to {}", to),
                current,
            )),
        }
    }
}
