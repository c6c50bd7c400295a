use std::sync::Arc;

use caritas_core::{
    campaigns::{CampaignService, CampaignServiceTrait},
    utils::SystemClock,
};
use caritas_storage_sqlite::{
    self as storage, CampaignRepository, ContributionRepository, DonorRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub campaign_service: Arc<dyn CampaignServiceTrait>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = storage::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = storage::create_pool(&db_path)?;
    storage::run_migrations(&pool)?;
    let writer = storage::spawn_writer((*pool).clone());

    let campaign_repository = Arc::new(CampaignRepository::new(pool.clone(), writer.clone()));
    let contribution_repository = Arc::new(ContributionRepository::new(pool.clone(), writer));
    let donor_repository = Arc::new(DonorRepository::new(pool));
    let clock = Arc::new(SystemClock::new(config.timezone));
    tracing::info!("Campaign dates evaluated in {}", config.timezone.name());

    let campaign_service: Arc<dyn CampaignServiceTrait> = Arc::new(CampaignService::new(
        campaign_repository,
        contribution_repository,
        donor_repository,
        clock,
    ));

    Ok(Arc::new(AppState { campaign_service }))
}
