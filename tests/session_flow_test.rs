// ==========================================
// ScheduleSession 集成测试
// ==========================================
// 测试目标: 月份加载、权威刷新、节假日降级、过期结果丢弃
// ==========================================


use std::sync::Arc;

use meal_delivery_aps::domain::holiday::Holiday;
use meal_delivery_aps::domain::rule::PeriodicityRule;
use meal_delivery_aps::domain::types::{DeliveryOrigin, DeliveryStatus};
use meal_delivery_aps::engine::events::OptionalEventPublisher;
use meal_delivery_aps::engine::merge::ScheduleMerger;
use meal_delivery_aps::engine::session::{ScheduleSession, SessionError, SessionOptions};
use test_helpers::{date, test_ctx, FakeHolidaySource, FakeOverrideStore};

fn session_with(
    holiday_source: Arc<FakeHolidaySource>,
    override_store: Arc<FakeOverrideStore>,
    options: SessionOptions,
) -> ScheduleSession {
    ScheduleSession::new(
        test_ctx(),
        PeriodicityRule::weekly(vec![2, 4]),
        holiday_source,
        override_store,
        ScheduleMerger::default(),
        OptionalEventPublisher::none(),
        options,
    )
}

#[tokio::test]
async fn test_load_month_produces_merged_view() {
    let holidays = Arc::new(FakeHolidaySource::new(vec![Holiday::new(
        date(2024, 1, 1),
        "New Year",
    )]));
    let store = Arc::new(FakeOverrideStore::new());
    let session = session_with(holidays, store, SessionOptions::default());

    let view = session.load_month(2024, 1).await.unwrap();
    assert_eq!(view.deliveries.len(), 10);
    assert_eq!(view.statistics.conflict_count, 1);
    assert_eq!(view.holidays.len(), 1);
    assert!(session.current_view().is_some());
}

#[tokio::test]
async fn test_holiday_failure_degrades_to_empty() {
    let holidays = Arc::new(FakeHolidaySource::new(vec![Holiday::new(
        date(2024, 1, 1),
        "New Year",
    )]));
    holidays.set_fail(true);
    let store = Arc::new(FakeOverrideStore::new());
    let session = session_with(holidays, store, SessionOptions::default());

    // 降级: 排期照常生成, 无节假日冲突
    let view = session.load_month(2024, 1).await.unwrap();
    assert_eq!(view.deliveries.len(), 10);
    assert_eq!(view.statistics.conflict_count, 0);
    assert!(view.holidays.is_empty());
}

#[tokio::test]
async fn test_holiday_failure_surfaces_when_degrade_disabled() {
    let holidays = Arc::new(FakeHolidaySource::new(vec![]));
    holidays.set_fail(true);
    let store = Arc::new(FakeOverrideStore::new());
    let session = session_with(
        holidays,
        store,
        SessionOptions {
            degrade_holiday_failure: false,
        },
    );

    let err = session.load_month(2024, 1).await.unwrap_err();
    assert!(matches!(err, SessionError::HolidaySource { .. }));
}

#[tokio::test]
async fn test_invalid_rule_blocks_generation() {
    let holidays = Arc::new(FakeHolidaySource::new(vec![]));
    let store = Arc::new(FakeOverrideStore::new());
    let session = ScheduleSession::new(
        test_ctx(),
        PeriodicityRule::weekly(vec![]),
        holidays,
        store,
        ScheduleMerger::default(),
        OptionalEventPublisher::none(),
        SessionOptions::default(),
    );

    assert!(matches!(
        session.load_month(2024, 1).await,
        Err(SessionError::Rule(_))
    ));
}

#[tokio::test]
async fn test_add_delivery_refreshes_from_authoritative_list() {
    let holidays = Arc::new(FakeHolidaySource::new(vec![]));
    let store = Arc::new(FakeOverrideStore::new());
    let session = session_with(holidays, store.clone(), SessionOptions::default());

    session.load_month(2024, 1).await.unwrap();
    // 2024-01-09 是周二, 不在生成基线上
    let view = session.add_delivery(date(2024, 1, 9), None).await.unwrap();

    assert_eq!(view.deliveries.len(), 11);
    let added = view
        .deliveries
        .iter()
        .find(|i| i.date == date(2024, 1, 9))
        .unwrap();
    assert_eq!(added.origin, DeliveryOrigin::Override);
    assert_eq!(added.status, DeliveryStatus::Scheduled);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn test_suppress_then_unsuppress_restores_generated() {
    let holidays = Arc::new(FakeHolidaySource::new(vec![]));
    let store = Arc::new(FakeOverrideStore::new());
    let session = session_with(holidays, store.clone(), SessionOptions::default());

    session.load_month(2024, 1).await.unwrap();
    let view = session.suppress_date(date(2024, 1, 8)).await.unwrap();
    assert!(!view.deliveries.iter().any(|i| i.date == date(2024, 1, 8)));

    // 删除压制用的墓碑记录本身 (删除之删除): 生成日期回归
    let tombstone_id = 1;
    let view = session.remove_override(tombstone_id).await.unwrap();
    let restored = view
        .deliveries
        .iter()
        .find(|i| i.date == date(2024, 1, 8))
        .unwrap();
    assert_eq!(restored.origin, DeliveryOrigin::Generated);
}

#[tokio::test]
async fn test_failed_mutation_leaves_last_good_state() {
    let holidays = Arc::new(FakeHolidaySource::new(vec![]));
    let store = Arc::new(FakeOverrideStore::new());
    let session = session_with(holidays, store.clone(), SessionOptions::default());

    let before = session.load_month(2024, 1).await.unwrap();
    store.set_fail_mutations(true);

    let err = session
        .add_delivery(date(2024, 1, 9), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::OverrideConflict { .. }));

    // 本地快照保持最后一次良好状态
    let after = session.current_view().unwrap();
    assert_eq!(after.deliveries, before.deliveries);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn test_stale_month_load_discarded() {
    // 慢速节假日来源: 第一次加载挂起, 期间切换月份
    use async_trait::async_trait;
    use meal_delivery_aps::engine::ports::{BoundaryError, HolidaySource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowFirstCall {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HolidaySource for SlowFirstCall {
        async fn fetch_holidays(
            &self,
            _start: chrono::NaiveDate,
            _end: chrono::NaiveDate,
        ) -> Result<Vec<Holiday>, BoundaryError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(std::time::Duration::from_millis(120)).await;
            }
            Ok(vec![])
        }
    }

    let store = Arc::new(FakeOverrideStore::new());
    let session = Arc::new(ScheduleSession::new(
        test_ctx(),
        PeriodicityRule::weekly(vec![2, 4]),
        Arc::new(SlowFirstCall {
            calls: AtomicUsize::new(0),
        }),
        store,
        ScheduleMerger::default(),
        OptionalEventPublisher::none(),
        SessionOptions::default(),
    ));

    // 一月加载在途时切换到二月
    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.load_month(2024, 1).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let fast = session.load_month(2024, 2).await.unwrap();
    assert_eq!(fast.month, 2);

    // 迟到的一月结果被丢弃, 不得覆盖二月视图
    let stale = slow.await.unwrap();
    assert!(matches!(
        stale,
        Err(SessionError::StaleRequestDiscarded { year: 2024, month: 1 })
    ));
    let current = session.current_view().unwrap();
    assert_eq!(current.month, 2);
}
