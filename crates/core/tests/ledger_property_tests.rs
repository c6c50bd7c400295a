//! Property-based tests for ledger aggregates.
//!
//! Totals are recomputed from the ledger on every read, so they must not
//! depend on the order in which rows were inserted or returned.

use caritas_core::campaigns::{Campaign, CampaignStatus};
use caritas_core::contributions::{Contribution, ContributionStatus};
use caritas_core::statistics::{campaign_totals, daily_evolution, rank_campaigns};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

/// Amounts in cents, between one cent and one million.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_status() -> impl Strategy<Value = ContributionStatus> {
    prop_oneof![
        8 => Just(ContributionStatus::Confirmed),
        1 => Just(ContributionStatus::Pending),
        1 => Just(ContributionStatus::Revoked),
    ]
}

fn arb_contribution() -> impl Strategy<Value = Contribution> {
    (
        arb_amount(),
        arb_status(),
        0usize..3,   // campaign
        "d[0-9]{1}", // donor
        any::<bool>(),
        0u32..30,  // day offset
        0u32..24,  // hour
    )
        .prop_map(|(amount, status, campaign, donor, anonymous, day, hour)| {
            let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + chrono::Days::new(day as u64);
            Contribution {
                id: String::new(),
                donor_id: donor,
                campaign_id: format!("c{}", campaign),
                amount,
                payment_method: None,
                receipt_number: None,
                anonymous,
                message: None,
                registered_by: "staff-1".to_string(),
                contributed_at: date.and_hms_opt(hour, 0, 0).unwrap(),
                status,
            }
        })
}

fn arb_ledger() -> impl Strategy<Value = Vec<Contribution>> {
    proptest::collection::vec(arb_contribution(), 0..60).prop_map(|mut rows| {
        for (i, row) in rows.iter_mut().enumerate() {
            row.id = format!("k{:03}", i);
        }
        rows
    })
}

fn campaigns() -> Vec<Campaign> {
    let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let created_at = start.and_hms_opt(9, 0, 0).unwrap();
    (0..3)
        .map(|i| Campaign {
            id: format!("c{}", i),
            name: format!("Campaign {}", i),
            description: None,
            goal_amount: Some(Decimal::new(50_000, 0)),
            start_date: start,
            end_date: None,
            category: None,
            image_url: None,
            status: CampaignStatus::Active,
            created_by: "staff-1".to_string(),
            created_at,
            updated_at: created_at,
        })
        .collect()
}

fn independent_sum(rows: &[Contribution], campaign_id: &str) -> Decimal {
    rows.iter()
        .filter(|c| c.campaign_id == campaign_id && c.status == ContributionStatus::Confirmed)
        .fold(Decimal::ZERO, |acc, c| acc + c.amount)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Total raised equals the plain sum of confirmed amounts, whatever the
    /// insert order.
    #[test]
    fn prop_total_raised_matches_independent_sum(
        (rows, shuffled) in arb_ledger().prop_flat_map(|rows| {
            let shuffled = Just(rows.clone()).prop_shuffle();
            (Just(rows), shuffled)
        })
    ) {
        for campaign_id in ["c0", "c1", "c2"] {
            let expected = independent_sum(&rows, campaign_id);
            let forward = campaign_totals(
                None,
                rows.iter().filter(|c| c.campaign_id == campaign_id),
            )
            .unwrap();
            let reordered = campaign_totals(
                None,
                shuffled.iter().filter(|c| c.campaign_id == campaign_id),
            )
            .unwrap();
            prop_assert_eq!(forward.total_raised, expected);
            prop_assert_eq!(reordered, forward);
        }
    }

    /// The last cumulative value of the daily evolution is the total raised.
    #[test]
    fn prop_daily_evolution_ends_at_total(rows in arb_ledger()) {
        let in_c0: Vec<Contribution> =
            rows.into_iter().filter(|c| c.campaign_id == "c0").collect();
        let days = daily_evolution(&in_c0, chrono_tz::UTC).unwrap();
        let total = independent_sum(&in_c0, "c0");
        prop_assert_eq!(
            days.last().map(|d| d.cumulative_amount).unwrap_or(Decimal::ZERO),
            total
        );
        let ascending = days.windows(2).all(|w| w[0].date < w[1].date);
        prop_assert!(ascending);
    }

    /// Ranking returns at most `limit` campaigns, sorted by total descending.
    #[test]
    fn prop_ranking_is_bounded_and_sorted(rows in arb_ledger(), limit in 0usize..5) {
        let ranking = rank_campaigns(campaigns(), &rows, limit).unwrap();
        prop_assert!(ranking.len() <= limit);
        let sorted = ranking.windows(2).all(|w| {
            w[0].total_raised > w[1].total_raised
                || (w[0].total_raised == w[1].total_raised && w[0].campaign.id < w[1].campaign.id)
        });
        prop_assert!(sorted, "ranking out of order: {:?}", ranking);
        for entry in &ranking {
            prop_assert_eq!(entry.total_raised, independent_sum(&rows, &entry.campaign.id));
        }
    }
}
