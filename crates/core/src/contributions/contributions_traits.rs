use async_trait::async_trait;

use super::contributions_model::{Contribution, DonorContribution, LedgerAppend};
use crate::errors::Result;

/// Storage for the append-only contribution ledger.
///
/// There is no update or delete: ledger rows are financial facts and are kept
/// for history and auditability.
#[async_trait]
pub trait ContributionRepositoryTrait: Send + Sync {
    /// Confirmed contributions of one campaign, most recent first.
    fn list_by_campaign(&self, campaign_id: &str) -> Result<Vec<Contribution>>;

    /// Confirmed contributions of the given campaigns, in no particular order.
    fn list_confirmed_for_campaigns(&self, campaign_ids: &[String]) -> Result<Vec<Contribution>>;

    /// Every confirmed contribution in the ledger.
    fn list_confirmed(&self) -> Result<Vec<Contribution>>;

    /// A donor's confirmed contributions with their campaigns, most recent first.
    fn list_by_donor(&self, donor_id: &str) -> Result<Vec<DonorContribution>>;

    /// Number of ledger rows of a campaign, whatever their status.
    fn count_for_campaign(&self, campaign_id: &str) -> Result<usize>;

    /// Appends one contribution, activating the campaign first when requested.
    async fn append(&self, entry: LedgerAppend) -> Result<Contribution>;
}
