//! Contributions module - the append-only ledger of donations to campaigns.

mod contributions_model;
mod contributions_traits;
mod ledger;


pub use contributions_model::{
    CampaignActivation, Contribution, ContributionDraft, ContributionStatus, DonorContribution,
    LedgerAppend, NewContribution, RecordedContribution,
};
pub use contributions_traits::ContributionRepositoryTrait;
pub use ledger::ContributionLedger;
