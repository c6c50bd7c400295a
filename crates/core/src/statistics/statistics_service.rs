use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono_tz::Tz;
use rust_decimal::Decimal;

use super::statistics_model::{
    CampaignRankingEntry, CampaignStatistics, DailyContribution, DonorRanking,
};
use crate::campaigns::{Campaign, CampaignFilter, CampaignRepositoryTrait, CampaignTotals};
use crate::constants::{ANONYMOUS_DONOR_NAME, DISPLAY_DECIMAL_PRECISION, TOP_DONORS_LIMIT};
use crate::contributions::{Contribution, ContributionRepositoryTrait};
use crate::donors::DonorRegistryTrait;
use crate::errors::{Error, Result};
use crate::utils::Clock;

fn add_amounts(total: Decimal, amount: Decimal) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| Error::Unexpected(format!("Amount overflow adding {} to {}", amount, total)))
}

/// Share of the goal reached, in percent. Zero when there is no usable goal.
pub fn percent_of_goal(total_raised: Decimal, goal: Option<Decimal>) -> Result<Decimal> {
    match goal {
        Some(goal) if goal > Decimal::ZERO => total_raised
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(goal))
            .map(|percent| percent.round_dp(DISPLAY_DECIMAL_PRECISION))
            .ok_or_else(|| {
                Error::Unexpected(format!(
                    "Percent overflow for {} raised against goal {}",
                    total_raised, goal
                ))
            }),
        _ => Ok(Decimal::ZERO),
    }
}

/// Totals of the confirmed contributions in `contributions`.
pub fn campaign_totals<'a, I>(goal: Option<Decimal>, contributions: I) -> Result<CampaignTotals>
where
    I: IntoIterator<Item = &'a Contribution>,
{
    let mut donors: HashSet<&str> = HashSet::new();
    let mut contribution_count = 0;
    let mut total_raised = Decimal::ZERO;

    for contribution in contributions.into_iter().filter(|c| c.is_confirmed()) {
        donors.insert(contribution.donor_id.as_str());
        contribution_count += 1;
        total_raised = add_amounts(total_raised, contribution.amount)?;
    }

    Ok(CampaignTotals {
        donor_count: donors.len(),
        contribution_count,
        total_raised,
        percent_of_goal: percent_of_goal(total_raised, goal)?,
    })
}

/// Ranks donors by total given, largest first, ties by donor id.
///
/// Anonymous contributions form their own bucket even when the same donor
/// also gave openly. On a tie the anonymous bucket comes last.
pub fn top_donors(
    contributions: &[Contribution],
    donor_names: &HashMap<String, String>,
    limit: usize,
) -> Result<Vec<DonorRanking>> {
    let mut buckets: HashMap<Option<&str>, (Decimal, usize)> = HashMap::new();
    for contribution in contributions.iter().filter(|c| c.is_confirmed()) {
        let key = if contribution.anonymous {
            None
        } else {
            Some(contribution.donor_id.as_str())
        };
        let entry = buckets.entry(key).or_insert((Decimal::ZERO, 0));
        entry.0 = add_amounts(entry.0, contribution.amount)?;
        entry.1 += 1;
    }

    let mut ranked: Vec<_> = buckets.into_iter().collect();
    ranked.sort_by(|(a_key, (a_total, _)), (b_key, (b_total, _))| {
        b_total.cmp(a_total).then_with(|| match (a_key, b_key) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });

    Ok(ranked
        .into_iter()
        .take(limit)
        .map(|(key, (total_amount, contribution_count))| match key {
            Some(donor_id) => DonorRanking {
                donor_id: Some(donor_id.to_string()),
                donor_name: donor_names
                    .get(donor_id)
                    .cloned()
                    .unwrap_or_else(|| donor_id.to_string()),
                anonymous: false,
                total_amount,
                contribution_count,
            },
            None => DonorRanking {
                donor_id: None,
                donor_name: ANONYMOUS_DONOR_NAME.to_string(),
                anonymous: true,
                total_amount,
                contribution_count,
            },
        })
        .collect())
}

/// Confirmed contributions grouped by calendar day in `tz`, oldest first.
pub fn daily_evolution(
    contributions: &[Contribution],
    tz: Tz,
) -> Result<Vec<DailyContribution>> {
    let mut by_day: BTreeMap<_, (usize, Decimal)> = BTreeMap::new();
    for contribution in contributions.iter().filter(|c| c.is_confirmed()) {
        let entry = by_day
            .entry(contribution.contribution_date(tz))
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 = add_amounts(entry.1, contribution.amount)?;
    }

    let mut cumulative_amount = Decimal::ZERO;
    by_day
        .into_iter()
        .map(|(date, (contribution_count, total_amount))| -> Result<DailyContribution> {
            cumulative_amount = add_amounts(cumulative_amount, total_amount)?;
            Ok(DailyContribution {
                date,
                contribution_count,
                total_amount,
                cumulative_amount,
            })
        })
        .collect()
}

/// Full statistics of one campaign from its ledger rows, with days taken in `tz`.
pub fn compute_campaign_statistics(
    campaign: &Campaign,
    contributions: &[Contribution],
    donor_names: &HashMap<String, String>,
    tz: Tz,
) -> Result<CampaignStatistics> {
    let totals = campaign_totals(campaign.goal_amount, contributions)?;
    let confirmed = || contributions.iter().filter(|c| c.is_confirmed());

    let average_amount = if totals.contribution_count == 0 {
        Decimal::ZERO
    } else {
        (totals.total_raised / Decimal::from(totals.contribution_count))
            .round_dp(DISPLAY_DECIMAL_PRECISION)
    };

    Ok(CampaignStatistics {
        campaign_id: campaign.id.clone(),
        donor_count: totals.donor_count,
        contribution_count: totals.contribution_count,
        total_raised: totals.total_raised,
        average_amount,
        max_amount: confirmed().map(|c| c.amount).max(),
        min_amount: confirmed().map(|c| c.amount).min(),
        percent_of_goal: totals.percent_of_goal,
        top_donors: top_donors(contributions, donor_names, TOP_DONORS_LIMIT)?,
        daily_evolution: daily_evolution(contributions, tz)?,
    })
}

/// Campaigns ordered by total raised, largest first, ties by campaign id.
pub fn rank_campaigns(
    campaigns: Vec<Campaign>,
    contributions: &[Contribution],
    limit: usize,
) -> Result<Vec<CampaignRankingEntry>> {
    let mut by_campaign: HashMap<&str, Vec<&Contribution>> = HashMap::new();
    for contribution in contributions {
        by_campaign
            .entry(contribution.campaign_id.as_str())
            .or_default()
            .push(contribution);
    }

    let mut entries: Vec<CampaignRankingEntry> = campaigns
        .into_iter()
        .map(|campaign| -> Result<CampaignRankingEntry> {
            let totals = campaign_totals(
                campaign.goal_amount,
                by_campaign
                    .get(campaign.id.as_str())
                    .into_iter()
                    .flatten()
                    .copied(),
            )?;
            Ok(CampaignRankingEntry {
                campaign,
                donor_count: totals.donor_count,
                contribution_count: totals.contribution_count,
                total_raised: totals.total_raised,
                percent_of_goal: totals.percent_of_goal,
            })
        })
        .collect::<Result<_>>()?;

    entries.sort_by(|a, b| {
        b.total_raised
            .cmp(&a.total_raised)
            .then_with(|| a.campaign.id.cmp(&b.campaign.id))
    });
    entries.truncate(limit);
    Ok(entries)
}

/// Trait for statistics operations
pub trait StatisticsServiceTrait: Send + Sync {
    fn campaign_statistics(&self, campaign_id: &str) -> Result<CampaignStatistics>;
    fn ranking(&self, limit: usize) -> Result<Vec<CampaignRankingEntry>>;
}

/// Computes statistics from the ledger on every call. Nothing is cached.
pub struct StatisticsService {
    campaign_repository: Arc<dyn CampaignRepositoryTrait>,
    contribution_repository: Arc<dyn ContributionRepositoryTrait>,
    donor_registry: Arc<dyn DonorRegistryTrait>,
    clock: Arc<dyn Clock>,
}

impl StatisticsService {
    pub fn new(
        campaign_repository: Arc<dyn CampaignRepositoryTrait>,
        contribution_repository: Arc<dyn ContributionRepositoryTrait>,
        donor_registry: Arc<dyn DonorRegistryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            campaign_repository,
            contribution_repository,
            donor_registry,
            clock,
        }
    }

    fn donor_names(&self, contributions: &[Contribution]) -> Result<HashMap<String, String>> {
        let mut donor_ids: Vec<String> = contributions
            .iter()
            .filter(|c| !c.anonymous)
            .map(|c| c.donor_id.clone())
            .collect();
        donor_ids.sort();
        donor_ids.dedup();

        Ok(self
            .donor_registry
            .get_donors(&donor_ids)?
            .into_iter()
            .map(|donor| (donor.id, donor.name))
            .collect())
    }
}

impl StatisticsServiceTrait for StatisticsService {
    fn campaign_statistics(&self, campaign_id: &str) -> Result<CampaignStatistics> {
        let campaign = self
            .campaign_repository
            .get_campaign(campaign_id)?
            .ok_or_else(|| Error::NotFound(format!("Campaign '{}'", campaign_id)))?;
        let contributions = self.contribution_repository.list_by_campaign(campaign_id)?;
        let donor_names = self.donor_names(&contributions)?;
        compute_campaign_statistics(
            &campaign,
            &contributions,
            &donor_names,
            self.clock.timezone(),
        )
    }

    fn ranking(&self, limit: usize) -> Result<Vec<CampaignRankingEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let campaigns = self
            .campaign_repository
            .list_campaigns(&CampaignFilter::default(), self.clock.today())?;
        let contributions = self.contribution_repository.list_confirmed()?;
        rank_campaigns(campaigns, &contributions, limit)
    }
}
