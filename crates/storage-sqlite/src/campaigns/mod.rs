//! SQLite storage implementation for campaigns and their status history.

mod model;
mod repository;

pub use model::{CampaignChangesDB, CampaignDB, CampaignStatusChangeDB, StatusChangesetDB};
pub use repository::CampaignRepository;
pub(crate) use repository::{current_status, write_status_change, StatusChangeRecord};
