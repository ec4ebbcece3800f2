// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 覆写/节假日仓储的 CRUD 与适配器行为
// ==========================================


use std::sync::Arc;

use meal_delivery_aps::domain::holiday::Holiday;
use meal_delivery_aps::engine::ports::{HolidaySource, OverrideStore};
use meal_delivery_aps::repository::{
    DeliveryOverrideRepository, HolidayRepository, RepositoryError, SqliteHolidaySource,
    SqliteOverrideStore,
};
use test_helpers::{create_test_db, date, open_test_connection};

#[test]
fn test_override_crud_round_trip() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let repo = DeliveryOverrideRepository::from_connection(conn);

    // 插入
    let record = repo
        .insert("grp-1", date(2024, 1, 9), false, Some("临时加餐"))
        .unwrap();
    let id = record.id.unwrap();
    assert_eq!(record.note.as_deref(), Some("临时加餐"));

    // 按月查询
    let listed = repo.find_by_grouping_month("grp-1", 2024, 1).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].date, date(2024, 1, 9));

    // 其他聚合组/月份不可见
    assert!(repo.find_by_grouping_month("grp-2", 2024, 1).unwrap().is_empty());
    assert!(repo.find_by_grouping_month("grp-1", 2024, 2).unwrap().is_empty());

    // 移动 (单记录改日期)
    let moved = repo.update_date(id, date(2024, 1, 12), None).unwrap();
    assert_eq!(moved.date, date(2024, 1, 12));
    // 未给备注时保留原值
    assert_eq!(moved.note.as_deref(), Some("临时加餐"));

    // 物理删除
    repo.delete(id).unwrap();
    assert!(repo.find_by_id(id).unwrap().is_none());
}

#[test]
fn test_tombstone_round_trip() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let repo = DeliveryOverrideRepository::from_connection(conn);

    let tombstone = repo.insert("grp-1", date(2024, 1, 8), true, None).unwrap();
    assert!(tombstone.deleted);

    let listed = repo.find_by_grouping_month("grp-1", 2024, 1).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].deleted);
}

#[test]
fn test_update_missing_record_not_found() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let repo = DeliveryOverrideRepository::from_connection(conn);

    let err = repo.update_date(404, date(2024, 1, 1), None).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let err = repo.delete(404).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_holiday_range_query_ordered() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let repo = HolidayRepository::from_connection(conn);

    repo.upsert(&Holiday::new(date(2024, 2, 13), "Carnaval")).unwrap();
    repo.upsert(&Holiday::new(date(2024, 1, 1), "Confraternização Universal"))
        .unwrap();
    repo.upsert(&Holiday::new(date(2024, 1, 25), "Aniversário de São Paulo"))
        .unwrap();

    let january = repo
        .find_by_range(date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();
    assert_eq!(january.len(), 2);
    assert_eq!(january[0].date, date(2024, 1, 1));
    assert_eq!(january[1].date, date(2024, 1, 25));
}

#[test]
fn test_holiday_upsert_overwrites_name() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let repo = HolidayRepository::from_connection(conn);

    repo.upsert(&Holiday::new(date(2024, 1, 1), "Ano Novo")).unwrap();
    repo.upsert(&Holiday::new(date(2024, 1, 1), "Confraternização Universal"))
        .unwrap();

    let found = repo
        .find_by_range(date(2024, 1, 1), date(2024, 1, 1))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Confraternização Universal");
}

#[tokio::test]
async fn test_sqlite_adapters_implement_engine_ports() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();

    let holiday_repo = Arc::new(HolidayRepository::from_connection(conn.clone()));
    holiday_repo
        .upsert(&Holiday::new(date(2024, 1, 1), "Confraternização Universal"))
        .unwrap();
    let source = SqliteHolidaySource::new(holiday_repo);
    let fetched = source
        .fetch_holidays(date(2024, 1, 1), date(2024, 1, 31))
        .await
        .unwrap();
    assert_eq!(fetched.len(), 1);

    let override_repo = Arc::new(DeliveryOverrideRepository::from_connection(conn));
    let store = SqliteOverrideStore::new(override_repo);
    let added = store
        .add("grp-1", date(2024, 1, 9), false, None)
        .await
        .unwrap();
    let id = added.id.unwrap();

    let moved = store.update(id, date(2024, 1, 12), None).await.unwrap();
    assert_eq!(moved.date, date(2024, 1, 12));

    let listed = store.list("grp-1", 2024, 1).await.unwrap();
    assert_eq!(listed.len(), 1);

    store.remove(id).await.unwrap();
    assert!(store.list("grp-1", 2024, 1).await.unwrap().is_empty());
}
