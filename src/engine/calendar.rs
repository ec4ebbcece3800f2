// ==========================================
// 校餐配送排期系统 - 日历工具
// ==========================================
// 职责: 纯日历运算, 被其余所有引擎依赖
// 红线: 日期一律按日历字段构造, 禁止经时间戳换算
//       (时间戳+时区换算曾导致前端日期偏移一天)
// ==========================================

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// 当月天数
///
/// # 参数
/// - year: 年份
/// - month: 月份 (1..=12)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("月份已约束在 1..=12");
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("月份已约束在 1..=12");
    (first_of_next - first).num_days() as u32
}

/// 日期对应的星期编号 (1=周日 .. 7=周六)
pub fn weekday_of(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday() + 1
}

/// 星期编号转 chrono::Weekday
///
/// # 返回
/// - Some(Weekday): 编号在 1..=7 内
/// - None: 编号越界
pub fn weekday_from_number(weekday: u32) -> Option<Weekday> {
    match weekday {
        1 => Some(Weekday::Sun),
        2 => Some(Weekday::Mon),
        3 => Some(Weekday::Tue),
        4 => Some(Weekday::Wed),
        5 => Some(Weekday::Thu),
        6 => Some(Weekday::Fri),
        7 => Some(Weekday::Sat),
        _ => None,
    }
}

/// 本地日期构造 (仅日历字段, 无时区参与)
pub fn local_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 当月首日
pub fn first_day(year: i32, month: u32) -> Option<NaiveDate> {
    local_date(year, month, 1)
}

/// 当月末日
pub fn last_day(year: i32, month: u32) -> Option<NaiveDate> {
    local_date(year, month, days_in_month(year, month))
}

/// 指定星期在当月的全部出现日期 (升序)
///
/// # 参数
/// - weekday: 星期编号 (1=周日 .. 7=周六)
pub fn nth_weekday_occurrences(year: i32, month: u32, weekday: u32) -> Vec<NaiveDate> {
    let mut occurrences = Vec::new();
    for day in 1..=days_in_month(year, month) {
        if let Some(date) = local_date(year, month, day) {
            if weekday_of(date) == weekday {
                occurrences.push(date);
            }
        }
    }
    occurrences
}

/// 日期所属周序号 (自当月1日起按7天滚动窗口, 1-based)
///
/// week = ceil(day / 7): 1~7日为第1周, 8~14日为第2周, 以此类推
pub fn week_index(day: u32) -> u32 {
    (day + 6) / 7
}

/// 当月最后7天窗口的起始日
pub fn last_week_start(year: i32, month: u32) -> u32 {
    let days = days_in_month(year, month);
    days.saturating_sub(6).max(1)
}

/// 节假日冲突的建议替代日期
///
/// 取前一日; 若前一日为周日则再回退到周五。
/// 可能跨出当月 (如节假日在1日), 由调用方决定是否采纳。
pub fn alternative_date(holiday_date: NaiveDate) -> NaiveDate {
    let mut candidate = holiday_date - Duration::days(1);
    if candidate.weekday() == Weekday::Sun {
        candidate = candidate - Duration::days(2);
    }
    candidate
}
