//! In-memory store shared by the service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::campaigns::{
    BulkStatusTransition, Campaign, CampaignChanges, CampaignDraft, CampaignFilter,
    CampaignRepositoryTrait, CampaignService, CampaignStatus, CampaignStatusChange,
    StatusTransition, TransitionTrigger,
};
use crate::contributions::{
    Contribution, ContributionRepositoryTrait, ContributionStatus, DonorContribution, LedgerAppend,
};
use crate::donors::{Donor, DonorRegistryTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::utils::FixedClock;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn timestamp(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).unwrap()
}

pub fn campaign(
    id: &str,
    status: CampaignStatus,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Campaign {
    let created_at = timestamp(start_date, 9);
    Campaign {
        id: id.to_string(),
        name: format!("Campaign {}", id),
        description: None,
        goal_amount: None,
        start_date,
        end_date,
        category: None,
        image_url: None,
        status,
        created_by: "staff-1".to_string(),
        created_at,
        updated_at: created_at,
    }
}

pub fn contribution(
    id: &str,
    campaign_id: &str,
    donor_id: &str,
    amount: Decimal,
    contributed_at: NaiveDateTime,
) -> Contribution {
    Contribution {
        id: id.to_string(),
        donor_id: donor_id.to_string(),
        campaign_id: campaign_id.to_string(),
        amount,
        payment_method: None,
        receipt_number: None,
        anonymous: false,
        message: None,
        registered_by: "staff-1".to_string(),
        contributed_at,
        status: ContributionStatus::Confirmed,
    }
}

#[derive(Default)]
struct State {
    campaigns: Vec<Campaign>,
    contributions: Vec<Contribution>,
    history: Vec<CampaignStatusChange>,
    donors: Vec<Donor>,
    next_id: u64,
    failing_bulk_target: Option<CampaignStatus>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", prefix, self.next_id)
    }

    fn record_change(
        &mut self,
        campaign_id: &str,
        from: CampaignStatus,
        to: CampaignStatus,
        trigger: TransitionTrigger,
        reason: Option<String>,
        actor: Option<String>,
    ) {
        let id = self.next_id("change");
        self.history.push(CampaignStatusChange {
            id,
            campaign_id: campaign_id.to_string(),
            from_status: from,
            to_status: to,
            trigger,
            reason,
            actor,
            changed_at: chrono::Utc::now().naive_utc(),
        });
    }
}

/// Campaigns, ledger, history and donors behind one lock, so that an append
/// sees the same campaign row the status transitions write.
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<State>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_campaign(&self, campaign: Campaign) {
        self.state.lock().unwrap().campaigns.push(campaign);
    }

    pub fn add_donor(&self, id: &str, name: &str) {
        self.state.lock().unwrap().donors.push(Donor {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn add_contribution(&self, contribution: Contribution) {
        self.state.lock().unwrap().contributions.push(contribution);
    }

    /// Makes every bulk transition into `to` fail with a database error.
    pub fn fail_bulk_transitions_to(&self, to: CampaignStatus) {
        self.state.lock().unwrap().failing_bulk_target = Some(to);
    }

    pub fn campaign(&self, id: &str) -> Campaign {
        self.state
            .lock()
            .unwrap()
            .campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .unwrap()
    }

    pub fn contribution_count(&self) -> usize {
        self.state.lock().unwrap().contributions.len()
    }

    pub fn history(&self, campaign_id: &str) -> Vec<CampaignStatusChange> {
        self.state
            .lock()
            .unwrap()
            .history
            .iter()
            .filter(|h| h.campaign_id == campaign_id)
            .cloned()
            .collect()
    }

    pub fn service(&self, today: NaiveDate) -> CampaignService {
        self.service_with_clock(FixedClock::new(today))
    }

    pub fn service_with_clock(&self, clock: FixedClock) -> CampaignService {
        CampaignService::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(clock),
        )
    }
}

fn sorted_newest_first(mut contributions: Vec<Contribution>) -> Vec<Contribution> {
    contributions.sort_by(|a, b| {
        b.contributed_at
            .cmp(&a.contributed_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    contributions
}

#[async_trait]
impl CampaignRepositoryTrait for MockStore {
    fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>> {
        let state = self.state.lock().unwrap();
        Ok(state.campaigns.iter().find(|c| c.id == campaign_id).cloned())
    }

    fn list_campaigns(&self, filter: &CampaignFilter, today: NaiveDate) -> Result<Vec<Campaign>> {
        let state = self.state.lock().unwrap();
        let mut campaigns: Vec<Campaign> = state
            .campaigns
            .iter()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |cat| c.category.as_ref() == Some(cat))
            })
            .filter(|c| !filter.only_currently_running || c.is_running_on(today))
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.id.cmp(&b.id)));
        Ok(campaigns)
    }

    fn list_campaigns_by_status(&self, statuses: &[CampaignStatus]) -> Result<Vec<Campaign>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .campaigns
            .iter()
            .filter(|c| statuses.contains(&c.status))
            .cloned()
            .collect())
    }

    fn get_status_history(&self, campaign_id: &str) -> Result<Vec<CampaignStatusChange>> {
        Ok(self.history(campaign_id))
    }

    async fn insert_campaign(&self, draft: CampaignDraft) -> Result<Campaign> {
        let mut state = self.state.lock().unwrap();
        let now = chrono::Utc::now().naive_utc();
        let campaign = Campaign {
            id: state.next_id("campaign"),
            name: draft.name,
            description: draft.description,
            goal_amount: draft.goal_amount,
            start_date: draft.start_date,
            end_date: draft.end_date,
            category: draft.category,
            image_url: draft.image_url,
            status: CampaignStatus::Planned,
            created_by: draft.created_by,
            created_at: now,
            updated_at: now,
        };
        state.campaigns.push(campaign.clone());
        Ok(campaign)
    }

    async fn update_campaign(
        &self,
        campaign_id: &str,
        changes: CampaignChanges,
    ) -> Result<Campaign> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .campaigns
            .iter_mut()
            .find(|c| c.id == campaign_id)
            .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", campaign_id)))?;
        *stored = changes.apply_to(stored);
        Ok(stored.clone())
    }

    async fn apply_status_transition(&self, transition: StatusTransition) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .campaigns
            .iter_mut()
            .find(|c| c.id == transition.campaign_id)
            .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", transition.campaign_id)))?;
        if !transition.allowed_from.contains(&stored.status) {
            return Ok(false);
        }
        let from = stored.status;
        stored.status = transition.to;
        if let Some(start_date) = transition.start_date {
            stored.start_date = start_date;
        }
        state.record_change(
            &transition.campaign_id,
            from,
            transition.to,
            transition.trigger,
            transition.reason,
            transition.actor,
        );
        Ok(true)
    }

    async fn apply_bulk_transition(
        &self,
        transition: BulkStatusTransition,
    ) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        if state.failing_bulk_target == Some(transition.to) {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "database is locked".to_string(),
            )));
        }
        let mut changed = Vec::new();
        for campaign in state.campaigns.iter_mut() {
            if transition.campaign_ids.contains(&campaign.id) && campaign.status == transition.from
            {
                campaign.status = transition.to;
                changed.push(campaign.id.clone());
            }
        }
        for campaign_id in &changed {
            state.record_change(
                campaign_id,
                transition.from,
                transition.to,
                transition.trigger,
                None,
                None,
            );
        }
        Ok(changed)
    }
}

#[async_trait]
impl ContributionRepositoryTrait for MockStore {
    fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<Contribution>> {
        let state = self.state.lock().unwrap();
        Ok(sorted_newest_first(
            state
                .contributions
                .iter()
                .filter(|c| c.campaign_id == campaign_id && c.is_confirmed())
                .cloned()
                .collect(),
        ))
    }

    fn list_confirmed_for_campaigns(&self, campaign_ids: &[String]) -> Result<Vec<Contribution>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contributions
            .iter()
            .filter(|c| c.is_confirmed() && campaign_ids.contains(&c.campaign_id))
            .cloned()
            .collect())
    }

    fn list_confirmed(&self) -> Result<Vec<Contribution>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contributions
            .iter()
            .filter(|c| c.is_confirmed())
            .cloned()
            .collect())
    }

    fn list_by_donor(&self, donor_id: &str) -> Result<Vec<DonorContribution>> {
        let state = self.state.lock().unwrap();
        let contributions = sorted_newest_first(
            state
                .contributions
                .iter()
                .filter(|c| c.donor_id == donor_id && c.is_confirmed())
                .cloned()
                .collect(),
        );
        Ok(contributions
            .into_iter()
            .filter_map(|contribution| {
                state
                    .campaigns
                    .iter()
                    .find(|c| c.id == contribution.campaign_id)
                    .map(|campaign| DonorContribution {
                        campaign: campaign.clone(),
                        contribution,
                    })
            })
            .collect())
    }

    fn count_for_campaign(&self, campaign_id: &str) -> Result<usize> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contributions
            .iter()
            .filter(|c| c.campaign_id == campaign_id)
            .count())
    }

    async fn append(&self, entry: LedgerAppend) -> Result<Contribution> {
        let mut state = self.state.lock().unwrap();
        let draft = entry.contribution;
        let stored = state
            .campaigns
            .iter_mut()
            .find(|c| c.id == draft.campaign_id)
            .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", draft.campaign_id)))?;

        let mut promoted = None;
        if let (CampaignStatus::Planned, Some(activation)) = (stored.status, &entry.activation) {
            stored.status = CampaignStatus::Active;
            stored.start_date = activation.start_date;
            promoted = Some(stored.id.clone());
        }
        if stored.status != CampaignStatus::Active {
            return Err(Error::invalid_state(
                "Campaign no longer accepts contributions",
                stored.status,
            ));
        }
        if let Some(campaign_id) = promoted {
            state.record_change(
                &campaign_id,
                CampaignStatus::Planned,
                CampaignStatus::Active,
                TransitionTrigger::FirstContribution,
                None,
                Some(draft.registered_by.clone()),
            );
        }

        let contribution = Contribution {
            id: state.next_id("contribution"),
            donor_id: draft.donor_id,
            campaign_id: draft.campaign_id,
            amount: draft.amount,
            payment_method: draft.payment_method,
            receipt_number: draft.receipt_number,
            anonymous: draft.anonymous,
            message: draft.message,
            registered_by: draft.registered_by,
            contributed_at: draft.contributed_at,
            status: ContributionStatus::Confirmed,
        };
        state.contributions.push(contribution.clone());
        Ok(contribution)
    }
}

impl DonorRegistryTrait for MockStore {
    fn get_donor(&self, donor_id: &str) -> Result<Option<Donor>> {
        let state = self.state.lock().unwrap();
        Ok(state.donors.iter().find(|d| d.id == donor_id).cloned())
    }
}
