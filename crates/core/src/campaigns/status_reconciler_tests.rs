#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::campaigns::*;
    use crate::errors::Error;
    use crate::test_support::{campaign, date, MockStore};
    use crate::utils::FixedClock;

    fn reconciler(store: &MockStore, today: chrono::NaiveDate) -> StatusReconciler {
        StatusReconciler::new(Arc::new(store.clone()), Arc::new(FixedClock::new(today)))
    }

    #[test]
    fn activation_guard_requires_open_window() {
        let today = date(2024, 6, 15);
        let open = campaign("a", CampaignStatus::Planned, today, None);
        let future = campaign("b", CampaignStatus::Planned, date(2024, 6, 16), None);
        let ended = campaign(
            "c",
            CampaignStatus::Planned,
            date(2024, 6, 1),
            Some(date(2024, 6, 14)),
        );
        let last_day = campaign("d", CampaignStatus::Planned, date(2024, 6, 1), Some(today));

        assert!(activation_guard(&open, today));
        assert!(!activation_guard(&future, today));
        assert!(!activation_guard(&ended, today));
        assert!(activation_guard(&last_day, today));
    }

    #[test]
    fn expiry_starts_the_day_after_end() {
        let c = campaign(
            "a",
            CampaignStatus::Active,
            date(2024, 6, 1),
            Some(date(2024, 6, 30)),
        );
        assert!(!expiry_guard(&c, date(2024, 6, 30)));
        assert!(expiry_guard(&c, date(2024, 7, 1)));
        let open_ended = campaign("b", CampaignStatus::Active, date(2024, 6, 1), None);
        assert!(!expiry_guard(&open_ended, date(2030, 1, 1)));
    }

    #[test]
    fn dates_never_move_cancelled_or_expired_planned_campaigns() {
        let today = date(2024, 7, 10);
        for status in [CampaignStatus::Cancelled, CampaignStatus::Closed] {
            let c = campaign("a", status, date(2024, 6, 1), Some(date(2024, 8, 1)));
            assert_eq!(scheduled_transition(&c, today), None);
        }
        let stale = campaign(
            "b",
            CampaignStatus::Planned,
            date(2024, 6, 1),
            Some(date(2024, 6, 30)),
        );
        assert_eq!(scheduled_transition(&stale, today), None);
    }

    #[test]
    fn reactivation_target_depends_on_start() {
        let today = date(2024, 6, 15);
        let started = campaign("a", CampaignStatus::Cancelled, date(2024, 6, 1), None);
        let future = campaign("b", CampaignStatus::Closed, date(2024, 7, 1), None);
        assert_eq!(
            reactivation_target(&started, today).unwrap(),
            CampaignStatus::Active
        );
        assert_eq!(
            reactivation_target(&future, today).unwrap(),
            CampaignStatus::Planned
        );

        let open = campaign("c", CampaignStatus::Active, date(2024, 6, 1), None);
        assert!(matches!(
            reactivation_target(&open, today),
            Err(Error::InvalidState { status: CampaignStatus::Active, .. })
        ));
    }

    #[test]
    fn first_contribution_only_moves_start_earlier() {
        let today = date(2024, 6, 15);
        let later = campaign("a", CampaignStatus::Planned, date(2024, 7, 1), None);
        let earlier = campaign("b", CampaignStatus::Planned, date(2024, 6, 1), None);
        assert_eq!(launch_date_on_first_contribution(&later, today), today);
        assert_eq!(
            launch_date_on_first_contribution(&earlier, today),
            date(2024, 6, 1)
        );
    }

    #[tokio::test]
    async fn sweep_activates_and_closes_but_skips_cancelled() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign("due", CampaignStatus::Planned, today, None));
        store.add_campaign(campaign(
            "expired",
            CampaignStatus::Active,
            date(2024, 6, 1),
            Some(date(2024, 6, 14)),
        ));
        store.add_campaign(campaign(
            "cancelled",
            CampaignStatus::Cancelled,
            date(2024, 6, 1),
            None,
        ));
        store.add_campaign(campaign(
            "stale",
            CampaignStatus::Planned,
            date(2024, 5, 1),
            Some(date(2024, 5, 31)),
        ));

        let report = reconciler(&store, today).run_sweep().await;

        assert_eq!(report.activated, vec!["due".to_string()]);
        assert_eq!(report.closed, vec!["expired".to_string()]);
        assert!(report.failures.is_empty());
        assert_eq!(store.campaign("cancelled").status, CampaignStatus::Cancelled);
        assert_eq!(store.campaign("stale").status, CampaignStatus::Planned);
        assert_eq!(store.history("due")[0].trigger, TransitionTrigger::Sweep);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign("due", CampaignStatus::Planned, today, None));
        let reconciler = reconciler(&store, today);

        assert_eq!(reconciler.run_sweep().await.activated.len(), 1);
        assert!(reconciler.run_sweep().await.is_noop());
        assert_eq!(store.history("due").len(), 1);
    }

    #[tokio::test]
    async fn failed_activation_does_not_block_expiry() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign("due", CampaignStatus::Planned, today, None));
        store.add_campaign(campaign(
            "expired",
            CampaignStatus::Active,
            date(2024, 6, 1),
            Some(date(2024, 6, 14)),
        ));
        store.fail_bulk_transitions_to(CampaignStatus::Active);

        let report = reconciler(&store, today).run_sweep().await;

        assert!(report.activated.is_empty());
        assert_eq!(report.closed, vec!["expired".to_string()]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].starts_with("activation"));
        assert_eq!(store.campaign("due").status, CampaignStatus::Planned);
    }

    #[tokio::test]
    async fn close_and_cancel_report_false_on_finished_campaigns() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign("c", CampaignStatus::Cancelled, date(2024, 6, 1), None));
        let reconciler = reconciler(&store, today);

        assert!(!reconciler.close("c", None, None).await.unwrap());
        assert!(!reconciler.cancel("c", None, None).await.unwrap());
        assert!(store.history("c").is_empty());
        assert!(matches!(
            reconciler.close("missing", None, None).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn manual_close_records_reason_and_actor() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign("c", CampaignStatus::Active, date(2024, 6, 1), None));

        let closed = reconciler(&store, today)
            .close("c", Some("goal reached".into()), Some("staff-2".into()))
            .await
            .unwrap();

        assert!(closed);
        let history = store.history("c");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from_status, CampaignStatus::Active);
        assert_eq!(history[0].to_status, CampaignStatus::Closed);
        assert_eq!(history[0].trigger, TransitionTrigger::ManualClose);
        assert_eq!(history[0].reason.as_deref(), Some("goal reached"));
        assert_eq!(history[0].actor.as_deref(), Some("staff-2"));
    }

    #[tokio::test]
    async fn reactivating_an_ended_campaign_fails_without_change() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign(
            "c",
            CampaignStatus::Cancelled,
            date(2024, 6, 1),
            Some(date(2024, 6, 10)),
        ));

        let result = reconciler(&store, today).reactivate("c", None).await;

        assert!(matches!(
            result,
            Err(Error::InvalidState { status: CampaignStatus::Cancelled, .. })
        ));
        assert_eq!(store.campaign("c").status, CampaignStatus::Cancelled);
        assert!(store.history("c").is_empty());
    }

    #[tokio::test]
    async fn reactivate_returns_planned_for_future_start() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign("c", CampaignStatus::Closed, date(2024, 7, 1), None));

        let campaign = reconciler(&store, today).reactivate("c", None).await.unwrap();

        assert_eq!(campaign.status, CampaignStatus::Planned);
        assert_eq!(
            store.history("c")[0].trigger,
            TransitionTrigger::ManualReactivate
        );
    }

    #[tokio::test]
    async fn reconcile_brings_one_campaign_up_to_date() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        store.add_campaign(campaign(
            "c",
            CampaignStatus::Active,
            date(2024, 6, 1),
            Some(date(2024, 6, 10)),
        ));

        let campaign = reconciler(&store, today).reconcile_campaign("c").await.unwrap();

        assert_eq!(campaign.status, CampaignStatus::Closed);
        assert_eq!(store.history("c")[0].trigger, TransitionTrigger::Reconcile);
    }

    #[test]
    fn requested_status_is_checked_against_the_machine() {
        let today = date(2024, 6, 15);
        let store = MockStore::new();
        let reconciler = reconciler(&store, today);
        let planned_future = campaign("a", CampaignStatus::Planned, date(2024, 7, 1), None);
        let active = campaign("b", CampaignStatus::Active, date(2024, 6, 1), None);

        assert!(reconciler
            .check_requested_status(&planned_future, CampaignStatus::Cancelled)
            .is_ok());
        assert!(matches!(
            reconciler.check_requested_status(&planned_future, CampaignStatus::Active),
            Err(Error::InvalidState { .. })
        ));
        assert!(matches!(
            reconciler.check_requested_status(&active, CampaignStatus::Planned),
            Err(Error::InvalidState { .. })
        ));

        let cancelled = campaign("c", CampaignStatus::Cancelled, date(2024, 6, 1), None);
        assert!(reconciler
            .check_requested_status(&cancelled, CampaignStatus::Active)
            .is_ok());
        assert!(reconciler
            .check_requested_status(&cancelled, CampaignStatus::Planned)
            .is_err());
    }
}
