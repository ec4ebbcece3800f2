// ==========================================
// 校餐配送排期系统 - 命令行入口
// ==========================================
// 用途: 读取聚合组定义 (JSON), 输出目标月份的合并排期与统计
// 用法: meal-delivery-aps <grouping.json> <year> <month> [db_path]
// ==========================================

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use meal_delivery_aps::domain::delivery::GroupingContext;
use meal_delivery_aps::domain::rule::PeriodicityRule;
use meal_delivery_aps::{db, logging, ScheduleApi};

/// 聚合组定义文件
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupingFile {
    grouping_id: String,
    #[serde(default)]
    school_count: u32,
    #[serde(default)]
    product_count: u32,
    rule: PeriodicityRule,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 周期性配送排期引擎", meal_delivery_aps::APP_NAME);
    tracing::info!("系统版本: {}", meal_delivery_aps::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        bail!(
            "用法: {} <grouping.json> <year> <month> [db_path]",
            args[0]
        );
    }

    let grouping_path = &args[1];
    let year: i32 = args[2].parse().context("year 必须是整数")?;
    let month: u32 = args[3].parse().context("month 必须是 1..=12")?;
    let db_path = args
        .get(4)
        .cloned()
        .unwrap_or_else(db::default_db_path);

    tracing::info!("使用数据库: {}", db_path);

    let raw = std::fs::read_to_string(grouping_path)
        .with_context(|| format!("读取聚合组定义失败: {}", grouping_path))?;
    let grouping: GroupingFile =
        serde_json::from_str(&raw).context("聚合组定义 JSON 解析失败")?;

    let api = ScheduleApi::new(&db_path)?;
    let ctx = GroupingContext::new(
        grouping.grouping_id.clone(),
        grouping.school_count,
        grouping.product_count,
    );

    let view = api.month_view(ctx, grouping.rule, year, month).await?;

    println!(
        "聚合组 {} 在 {}-{:02} 的配送排期 ({} 次):",
        grouping.grouping_id, view.year, view.month, view.deliveries.len()
    );
    for instance in &view.deliveries {
        let conflict_note = instance
            .conflicts
            .first()
            .map(|c| format!("  [{}]", c.message))
            .unwrap_or_default();
        println!(
            "  {}  {:9}  {:9}  学校 {:3}  产品 {:3}{}",
            instance.date,
            instance.status.as_str(),
            instance.origin.as_str(),
            instance.school_count,
            instance.product_count,
            conflict_note
        );
    }

    let stats = view.statistics;
    println!(
        "统计: 共 {} 次 | 已排定 {} | 冲突 {} | 待确认 {} | 当月节假日 {}",
        stats.total_deliveries,
        stats.scheduled_count,
        stats.conflict_count,
        stats.pending_count,
        stats.holiday_count
    );

    Ok(())
}
