//! Campaigns module - domain models, state machine, services, and traits.

mod campaigns_model;
mod campaigns_service;
mod campaigns_traits;
mod status_reconciler;



#[cfg(test)]
mod status_reconciler_tests;

pub use campaigns_model::{
    BulkStatusTransition, Campaign, CampaignChanges, CampaignDraft, CampaignFilter,
    CampaignStatus, CampaignStatusChange, CampaignTotals, CampaignUpdate, CampaignView,
    NewCampaign, StatusTransition, SweepReport, TemporalSituation, TransitionTrigger,
};
pub use campaigns_service::CampaignService;
pub use campaigns_traits::{CampaignRepositoryTrait, CampaignServiceTrait};
pub use status_reconciler::{
    activation_guard, expiry_guard, launch_date_on_first_contribution, reactivation_target,
    scheduled_transition, StatusReconciler,
};
