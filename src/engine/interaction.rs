// ==========================================
// 校餐配送排期系统 - 交互控制器
// ==========================================
// 职责: 把离散 UI 手势 (双击/拖拽/弹窗保存删除) 翻译为覆写变更
// 状态机: Idle -> Dragging -> Idle, Idle -> Editing -> Idle
// 红线: 同 (聚合组, 日期) 的变更串行化, 在途期间拒绝二次触发
// 红线: 适配器失败时本地状态保持不变, 仅上报错误
// ==========================================
// 保存/删除成功后编辑弹窗保持打开 (带一次性成功标记),
// 用户无需重开即可连续编辑
// ==========================================

use crate::domain::types::DeliveryOrigin;
use crate::engine::session::{MonthView, ScheduleSession, SessionError};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// 交互状态
// ==========================================

/// 编辑目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    /// 实例ID (生成: "gen-...", 覆写: 持久化ID字符串)
    pub instance_id: String,
    /// 实例日期
    pub date: NaiveDate,
    /// 实例来源
    pub origin: DeliveryOrigin,
    /// 覆写记录ID (仅 Override 来源)
    pub override_id: Option<i64>,
}

/// 编辑器状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    /// None = 空日期双击 (新增意图); Some = 既有实例 (修改/删除意图)
    pub target: Option<EditTarget>,
    /// 新增意图的预填日期
    pub prefill_date: NaiveDate,
    /// 最近一次保存/删除是否成功 (一次性成功标记)
    pub last_action_succeeded: bool,
}

/// 交互状态机状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionState {
    /// 空闲
    Idle,
    /// 拖拽中
    Dragging {
        instance_id: String,
        from_date: NaiveDate,
        origin: DeliveryOrigin,
        override_id: Option<i64>,
    },
    /// 编辑弹窗打开
    Editing(EditorState),
}

// ==========================================
// 手势结果
// ==========================================

/// 手势处理结果
#[derive(Debug, Clone)]
pub enum GestureOutcome {
    /// 变更已落库并完成权威重算
    Applied(MonthView),
    /// 状态迁移完成, 无存储调用
    Transitioned,
    /// 同日期变更在途, 本次手势被拒绝 (防丢失更新)
    Busy,
    /// 手势在当前状态下无意义, 忽略
    Ignored,
    /// 适配器失败: 本地排期保持最后一次良好状态
    Failed { message: String },
}

// ==========================================
// InteractionController - 交互控制器
// ==========================================

/// 交互控制器
///
/// 每个聚合组编辑会话一个实例, 随会话丢弃
pub struct InteractionController {
    session: Arc<ScheduleSession>,
    state: Mutex<InteractionState>,
    /// 在途变更日期集: 串行化同日期的存储调用
    in_flight: Mutex<HashSet<NaiveDate>>,
}

impl InteractionController {
    pub fn new(session: Arc<ScheduleSession>) -> Self {
        Self {
            session,
            state: Mutex::new(InteractionState::Idle),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// 当前状态快照
    pub fn state(&self) -> InteractionState {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    pub fn session(&self) -> &Arc<ScheduleSession> {
        &self.session
    }

    // ==========================================
    // 拖拽
    // ==========================================

    /// 拖拽开始: 仅在 Idle 且目标是既有实例时进入 Dragging
    pub fn drag_start(
        &self,
        instance_id: impl Into<String>,
        from_date: NaiveDate,
        origin: DeliveryOrigin,
        override_id: Option<i64>,
    ) -> GestureOutcome {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match *state {
            InteractionState::Idle => {
                *state = InteractionState::Dragging {
                    instance_id: instance_id.into(),
                    from_date,
                    origin,
                    override_id,
                };
                GestureOutcome::Transitioned
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// 拖拽结束但未落点: 回到 Idle
    pub fn drag_cancel(&self) -> GestureOutcome {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match *state {
            InteractionState::Dragging { .. } => {
                *state = InteractionState::Idle;
                GestureOutcome::Transitioned
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// 落点: 发出"移动"变更, 成功后权威重算
    ///
    /// - 覆写实例: 单记录改日期 (update)
    /// - 生成实例: 先新增目标日期, 再写原日期墓碑
    ///   (新增先行: 若墓碑失败, 至多出现双日可见, 不丢数据)
    pub async fn drop_on(&self, target_date: NaiveDate) -> GestureOutcome {
        let dragging = {
            let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            match state.clone() {
                InteractionState::Dragging {
                    instance_id,
                    from_date,
                    origin,
                    override_id,
                } => {
                    // 无论成败, 拖拽手势到此结束
                    *state = InteractionState::Idle;
                    (instance_id, from_date, origin, override_id)
                }
                _ => return GestureOutcome::Ignored,
            }
        };
        let (_, from_date, origin, override_id) = dragging;

        if from_date == target_date {
            return GestureOutcome::Transitioned;
        }
        if !self.begin_in_flight(&[from_date, target_date]) {
            return GestureOutcome::Busy;
        }

        let result = match (origin, override_id) {
            (DeliveryOrigin::Override, Some(id)) => {
                self.session.update_delivery(id, target_date, None).await
            }
            _ => {
                // 生成实例的移动: 新增 + 墓碑
                match self.session.add_delivery(target_date, None).await {
                    Ok(_) => self.session.suppress_date(from_date).await,
                    Err(e) => Err(e),
                }
            }
        };
        self.end_in_flight(&[from_date, target_date]);

        match result {
            Ok(view) => GestureOutcome::Applied(view),
            Err(e) => self.fail(e),
        }
    }

    // ==========================================
    // 编辑弹窗
    // ==========================================

    /// 空日期双击: 新增意图
    pub fn open_editor_for_date(&self, date: NaiveDate) -> GestureOutcome {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match *state {
            InteractionState::Idle => {
                *state = InteractionState::Editing(EditorState {
                    target: None,
                    prefill_date: date,
                    last_action_succeeded: false,
                });
                GestureOutcome::Transitioned
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// 既有实例双击: 修改/删除意图
    pub fn open_editor_for_instance(&self, target: EditTarget) -> GestureOutcome {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match *state {
            InteractionState::Idle => {
                let prefill_date = target.date;
                *state = InteractionState::Editing(EditorState {
                    target: Some(target),
                    prefill_date,
                    last_action_succeeded: false,
                });
                GestureOutcome::Transitioned
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// 弹窗保存: 新增或更新, 成功后弹窗保持打开并带成功标记
    pub async fn save(&self, date: NaiveDate, note: Option<String>) -> GestureOutcome {
        let editor = {
            let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            match &*state {
                InteractionState::Editing(editor) => editor.clone(),
                _ => return GestureOutcome::Ignored,
            }
        };

        let touched = match &editor.target {
            Some(target) if target.date != date => vec![target.date, date],
            _ => vec![date],
        };
        if !self.begin_in_flight(&touched) {
            return GestureOutcome::Busy;
        }

        let result = match &editor.target {
            // 新增意图
            None => self.session.add_delivery(date, note).await,
            // 既有覆写: 单记录更新
            Some(EditTarget {
                override_id: Some(id),
                ..
            }) => self.session.update_delivery(*id, date, note).await,
            // 生成实例的编辑: 覆写取代之 (日期未变则原日期即被取代;
            // 日期改变则额外写原日期墓碑)
            Some(target) => match self.session.add_delivery(date, note).await {
                Ok(view) if target.date == date => Ok(view),
                Ok(_) => self.session.suppress_date(target.date).await,
                Err(e) => Err(e),
            },
        };
        self.end_in_flight(&touched);

        match result {
            Ok(view) => {
                self.mark_editor_success();
                GestureOutcome::Applied(view)
            }
            Err(e) => self.fail(e),
        }
    }

    /// 弹窗删除: 覆写记录物理删除 / 生成实例写墓碑; 弹窗保持打开
    pub async fn delete(&self) -> GestureOutcome {
        let target = {
            let state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            match &*state {
                InteractionState::Editing(EditorState {
                    target: Some(target),
                    ..
                }) => target.clone(),
                _ => return GestureOutcome::Ignored,
            }
        };

        if !self.begin_in_flight(&[target.date]) {
            return GestureOutcome::Busy;
        }

        let result = match target.override_id {
            // 覆写实例: 物理删除记录
            Some(id) => self.session.remove_override(id).await,
            // 生成实例: 写墓碑压制
            None => self.session.suppress_date(target.date).await,
        };
        self.end_in_flight(&[target.date]);

        match result {
            Ok(view) => {
                self.mark_editor_success();
                GestureOutcome::Applied(view)
            }
            Err(e) => self.fail(e),
        }
    }

    /// 弹窗取消/关闭: 无存储调用
    pub fn close_editor(&self) -> GestureOutcome {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match *state {
            InteractionState::Editing(_) => {
                *state = InteractionState::Idle;
                GestureOutcome::Transitioned
            }
            _ => GestureOutcome::Ignored,
        }
    }

    // ==========================================
    // 内部
    // ==========================================

    /// 标记在途日期; 任一日期已在途则拒绝
    fn begin_in_flight(&self, dates: &[NaiveDate]) -> bool {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if dates.iter().any(|d| in_flight.contains(d)) {
            return false;
        }
        for &d in dates {
            in_flight.insert(d);
        }
        true
    }

    fn end_in_flight(&self, dates: &[NaiveDate]) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for d in dates {
            in_flight.remove(d);
        }
    }

    fn mark_editor_success(&self) {
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let InteractionState::Editing(editor) = &mut *state {
            editor.last_action_succeeded = true;
        }
    }

    fn fail(&self, error: SessionError) -> GestureOutcome {
        tracing::warn!("覆写变更失败, 保持最后良好状态: {}", error);
        GestureOutcome::Failed {
            message: error.to_string(),
        }
    }
}
