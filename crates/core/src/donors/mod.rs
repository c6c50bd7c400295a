//! Read-only view of the external donor registry.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// The part of a donor record this subsystem reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: String,
    pub name: String,
}

/// Lookup into the donor registry, owned by another module.
pub trait DonorRegistryTrait: Send + Sync {
    fn get_donor(&self, donor_id: &str) -> Result<Option<Donor>>;

    fn donor_exists(&self, donor_id: &str) -> Result<bool> {
        Ok(self.get_donor(donor_id)?.is_some())
    }

    /// Donors for the given ids. Unknown ids are skipped.
    fn get_donors(&self, donor_ids: &[String]) -> Result<Vec<Donor>> {
        let mut donors = Vec::with_capacity(donor_ids.len());
        for donor_id in donor_ids {
            if let Some(donor) = self.get_donor(donor_id)? {
                donors.push(donor);
            }
        }
        Ok(donors)
    }
}
