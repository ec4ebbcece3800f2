// ==========================================
// 校餐配送排期系统 - 排期合并引擎
// ==========================================
// 职责: 生成基线 + 覆写记录 + 冲突标记 -> 最终月度实例列表
// 红线: 合并结果是唯一事实来源, UI 不得原地修补
// 红线: 同聚合组同日期至多一个实例
// ==========================================
// 覆写应用顺序: 墓碑删除 -> 已落库移动/编辑 -> 未落库新增
// 两种移动表示法均被接受:
//   (a) 单记录改日期 (update), 旧日期由重算基线自然让出
//   (b) 旧日期墓碑 + 新日期新增
// ==========================================

use crate::domain::delivery::{DeliveryInstance, GroupingContext};
use crate::domain::holiday::Holiday;
use crate::domain::override_record::OverrideRecord;
use crate::domain::types::{DeliveryStatus, PatternType};
use crate::engine::conflict::ConflictDetector;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

// ==========================================
// MergeInput - 合并输入
// ==========================================
#[derive(Debug, Clone)]
pub struct MergeInput<'a> {
    /// 周期求值产出的基线日期 (升序)
    pub generated: &'a [NaiveDate],
    /// 该聚合组的全部覆写记录 (含墓碑)
    pub overrides: &'a [OverrideRecord],
    /// 当月节假日
    pub holidays: &'a [Holiday],
    /// 展示用周期类型
    pub pattern: PatternType,
    /// 聚合组上下文 (学校数/产品数)
    pub ctx: &'a GroupingContext,
}

// ==========================================
// ScheduleMerger - 排期合并器
// ==========================================

/// 排期合并器
///
/// 幂等: 相同输入必然产出相同实例列表
pub struct ScheduleMerger {
    detector: ConflictDetector,
}

impl Default for ScheduleMerger {
    fn default() -> Self {
        Self {
            detector: ConflictDetector::default(),
        }
    }
}

impl ScheduleMerger {
    pub fn new(detector: ConflictDetector) -> Self {
        Self { detector }
    }

    /// 合并: 输出按日期升序的最终实例列表
    ///
    /// # 算法
    /// 1. 以日期为键建工作映射, 基线日期各占一个 generated 实例
    /// 2. 应用覆写: 先墓碑, 再已落库记录, 最后未落库新增;
    ///    覆写落在已有 generated 日期时静默取代 (不算冲突)
    /// 3. 对最终日期集重跑冲突检测 (移动/新增日期补打节假日标记)
    /// 4. 按日期升序输出
    pub fn merge(&self, input: &MergeInput<'_>) -> Vec<DeliveryInstance> {
        let mut map: BTreeMap<NaiveDate, DeliveryInstance> = BTreeMap::new();

        // 1. 基线
        for &date in input.generated {
            map.insert(
                date,
                DeliveryInstance::generated(date, input.pattern, input.ctx),
            );
        }

        // 2a. 墓碑: 压制生成实例或取消既有新增
        for record in input.overrides.iter().filter(|r| r.deleted) {
            map.remove(&record.date);
        }

        // 同日多条非墓碑覆写属于脏数据: 保留最新落库者, 其余计入重复冲突
        let mut override_count: HashMap<NaiveDate, usize> = HashMap::new();

        // 2b. 已落库覆写 (移动/编辑): 按 id 升序应用, 后写者胜
        let mut persisted: Vec<&OverrideRecord> = input
            .overrides
            .iter()
            .filter(|r| !r.deleted && r.id.is_some())
            .collect();
        persisted.sort_by_key(|r| r.id);
        for record in persisted {
            let Some(id) = record.id else { continue };
            *override_count.entry(record.date).or_insert(0) += 1;
            map.insert(
                record.date,
                DeliveryInstance::from_override(
                    id,
                    record.date,
                    input.pattern,
                    input.ctx,
                    record.note.clone(),
                ),
            );
        }

        // 2c. 未落库新增: 状态为待确认, 直到持久化拿到ID
        for record in input.overrides.iter().filter(|r| !r.deleted && r.id.is_none()) {
            *override_count.entry(record.date).or_insert(0) += 1;
            map.insert(
                record.date,
                DeliveryInstance::pending_addition(
                    record.date,
                    input.pattern,
                    input.ctx,
                    record.note.clone(),
                ),
            );
        }

        // 3. 冲突检测: 最终日期集 + 同日覆写的多余重数
        let mut detection_dates: Vec<NaiveDate> = map.keys().copied().collect();
        for (date, count) in &override_count {
            if *count > 1 && map.contains_key(date) {
                for _ in 1..*count {
                    detection_dates.push(*date);
                }
            }
        }
        let conflicts = self.detector.detect(&detection_dates, input.holidays);

        // 4. 回填冲突并输出
        map.into_values()
            .map(|mut instance| {
                if let Some(found) = conflicts.get(&instance.date) {
                    instance.conflicts = found.clone();
                    instance.status = DeliveryStatus::Conflict;
                }
                instance
            })
            .collect()
    }
}
