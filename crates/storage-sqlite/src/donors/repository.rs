use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use caritas_core::donors::{Donor, DonorRegistryTrait};
use caritas_core::errors::Result;

use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::donors;
use crate::utils::chunk_for_sqlite;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::donors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DonorDB {
    pub id: String,
    pub name: String,
}

impl From<DonorDB> for Donor {
    fn from(db: DonorDB) -> Self {
        Donor {
            id: db.id,
            name: db.name,
        }
    }
}

/// Donor lookups. Donors are written by the registry module, never here.
pub struct DonorRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl DonorRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        DonorRepository { pool }
    }
}

impl DonorRegistryTrait for DonorRepository {
    fn get_donor(&self, donor_id: &str) -> Result<Option<Donor>> {
        let mut conn = get_connection(&self.pool)?;
        let donor = donors::table
            .find(donor_id)
            .select(DonorDB::as_select())
            .first::<DonorDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(donor.map(Donor::from))
    }

    fn get_donors(&self, donor_ids: &[String]) -> Result<Vec<Donor>> {
        let mut conn = get_connection(&self.pool)?;
        let mut found = Vec::with_capacity(donor_ids.len());
        for chunk in chunk_for_sqlite(donor_ids) {
            found.extend(
                donors::table
                    .filter(donors::id.eq_any(chunk))
                    .select(DonorDB::as_select())
                    .load::<DonorDB>(&mut conn)
                    .into_core()?
                    .into_iter()
                    .map(Donor::from),
            );
        }
        Ok(found)
    }
}
