// ==========================================
// ScheduleApi 端到端测试
// ==========================================
// 测试目标: 真实 SQLite 上的装配、月视图、手势编辑全链路
// ==========================================


use meal_delivery_aps::api::{ApiError, ScheduleApi};
use meal_delivery_aps::domain::delivery::GroupingContext;
use meal_delivery_aps::domain::holiday::Holiday;
use meal_delivery_aps::domain::rule::PeriodicityRule;
use meal_delivery_aps::domain::types::{
    ConflictKind, DeliveryOrigin, DeliveryStatus, QuinzenaVariant,
};
use meal_delivery_aps::engine::GestureOutcome;
use test_helpers::{create_test_db, date, open_test_connection};

fn seed_holidays(db_path: &str) {
    let conn = open_test_connection(db_path).unwrap();
    let repo = meal_delivery_aps::repository::HolidayRepository::from_connection(conn);
    repo.upsert(&Holiday::new(date(2024, 1, 1), "Confraternização Universal"))
        .unwrap();
    repo.upsert(&Holiday::new(date(2024, 1, 25), "Aniversário de São Paulo"))
        .unwrap();
}

#[tokio::test]
async fn test_month_view_end_to_end() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_holidays(&db_path);

    let api = ScheduleApi::new(&db_path).unwrap();
    let ctx = GroupingContext::new("grp-foods-01", 15, 6);
    let rule = PeriodicityRule::weekly(vec![2, 4]);

    let view = api.month_view(ctx, rule, 2024, 1).await.unwrap();

    // 1月周一/周三共10次, 元旦为冲突
    assert_eq!(view.deliveries.len(), 10);
    let jan1 = view
        .deliveries
        .iter()
        .find(|i| i.date == date(2024, 1, 1))
        .unwrap();
    assert_eq!(jan1.status, DeliveryStatus::Conflict);
    assert_eq!(jan1.conflicts[0].kind, ConflictKind::Holiday);
    // 替代日期建议默认开启: 元旦(周一)建议回退到上周五
    assert_eq!(
        jan1.conflicts[0].alternative_date,
        Some(date(2023, 12, 29))
    );
    assert_eq!(view.statistics.conflict_count, 1);
    assert_eq!(view.statistics.total_schools, 150);
}

#[tokio::test]
async fn test_gesture_edit_survives_reload() {
    let (_temp_file, db_path) = create_test_db().unwrap();

    let api = ScheduleApi::new(&db_path).unwrap();
    let ctx = GroupingContext::new("grp-foods-02", 9, 3);
    let rule = PeriodicityRule::weekly(vec![2]);

    // 第一次编辑会话: 拖动 8日 -> 9日
    {
        let controller = api
            .open_controller(ctx.clone(), rule.clone())
            .unwrap();
        controller.session().load_month(2024, 1).await.unwrap();
        controller.drag_start(
            "gen-2024-01-08",
            date(2024, 1, 8),
            DeliveryOrigin::Generated,
            None,
        );
        let outcome = controller.drop_on(date(2024, 1, 9)).await;
        assert!(matches!(outcome, GestureOutcome::Applied(_)));
    }

    // 会话丢弃后重开 (页面刷新): 覆写从库中恢复
    let controller = api.open_controller(ctx, rule).unwrap();
    let view = controller.session().load_month(2024, 1).await.unwrap();

    assert!(!view.deliveries.iter().any(|i| i.date == date(2024, 1, 8)));
    let moved = view
        .deliveries
        .iter()
        .find(|i| i.date == date(2024, 1, 9))
        .unwrap();
    assert_eq!(moved.origin, DeliveryOrigin::Override);
}

#[tokio::test]
async fn test_biweekly_view_and_parallel_groupings() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let api = ScheduleApi::new(&db_path).unwrap();

    let requests = vec![
        (
            GroupingContext::new("grp-a", 5, 2),
            PeriodicityRule::weekly(vec![6]),
        ),
        (
            GroupingContext::new("grp-b", 7, 4),
            PeriodicityRule::biweekly(vec![6], QuinzenaVariant::FirstHalf),
        ),
    ];

    let views = api.month_views(requests, 2024, 3).await;
    assert_eq!(views.len(), 2);

    // 2024-03 周五: 1,8,15,22,29; 上半月仅 1,8,15
    let weekly = views[0].as_ref().unwrap();
    assert_eq!(weekly.deliveries.len(), 5);
    let first_half = views[1].as_ref().unwrap();
    assert_eq!(first_half.deliveries.len(), 3);
}

#[tokio::test]
async fn test_invalid_rule_blocks_with_explicit_error() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let api = ScheduleApi::new(&db_path).unwrap();

    let err = api
        .month_view(
            GroupingContext::new("grp-x", 1, 1),
            PeriodicityRule::weekly(vec![]),
            2024,
            1,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRule(_)));
}

#[tokio::test]
async fn test_alternative_suggestion_configurable() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_holidays(&db_path);

    let api = ScheduleApi::new(&db_path).unwrap();
    api.config()
        .set_global_config_value(
            meal_delivery_aps::config::config_keys::SUGGEST_ALTERNATIVE_DATE,
            "false",
        )
        .unwrap();

    let view = api
        .month_view(
            GroupingContext::new("grp-y", 2, 2),
            PeriodicityRule::weekly(vec![2]),
            2024,
            1,
        )
        .await
        .unwrap();

    let jan1 = view
        .deliveries
        .iter()
        .find(|i| i.date == date(2024, 1, 1))
        .unwrap();
    assert_eq!(jan1.status, DeliveryStatus::Conflict);
    assert_eq!(jan1.conflicts[0].alternative_date, None);
}
