// ==========================================
// 校餐配送排期系统 - 排期 API
// ==========================================
// 职责: 组装仓储/适配器/引擎, 对外提供月视图与编辑会话
// 说明: 本层只做装配与错误转换, 业务规则全部在 Engine 层
// ==========================================

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use rusqlite::Connection;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::delivery::GroupingContext;
use crate::domain::rule::PeriodicityRule;
use crate::engine::conflict::ConflictDetector;
use crate::engine::events::{OptionalEventPublisher, ScheduleEventPublisher};
use crate::engine::interaction::InteractionController;
use crate::engine::merge::ScheduleMerger;
use crate::engine::ports::{HolidaySource, OverrideStore};
use crate::engine::session::{MonthView, ScheduleSession};
use crate::importer::holiday_importer::HolidayImporterImpl;
use crate::repository::holiday_repo::{HolidayRepository, SqliteHolidaySource};
use crate::repository::override_repo::{DeliveryOverrideRepository, SqliteOverrideStore};

// ==========================================
// ScheduleApi - 排期 API
// ==========================================

/// 排期API
///
/// 职责:
/// 1. 打开数据库并装配仓储/适配器
/// 2. 创建聚合组编辑会话与交互控制器
/// 3. 一次性月视图查询 (含跨聚合组并发)
/// 4. 节假日日历导入入口
pub struct ScheduleApi {
    holiday_repo: Arc<HolidayRepository>,
    override_repo: Arc<DeliveryOverrideRepository>,
    config: Arc<ConfigManager>,
    holiday_source: Arc<dyn HolidaySource>,
    override_store: Arc<dyn OverrideStore>,
    publisher: Option<Arc<dyn ScheduleEventPublisher>>,
}

impl ScheduleApi {
    /// 打开数据库并装配 (schema 初始化幂等)
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path).map_err(|e| {
            ApiError::Repository(crate::repository::RepositoryError::DatabaseConnectionError(
                e.to_string(),
            ))
        })?;
        crate::db::init_schema(&conn).map_err(|e| {
            ApiError::Repository(crate::repository::RepositoryError::DatabaseQueryError(
                e.to_string(),
            ))
        })?;

        if let Ok(Some(version)) = crate::db::read_schema_version(&conn) {
            if version != crate::db::CURRENT_SCHEMA_VERSION {
                tracing::warn!(
                    "schema_version 不匹配: 库中 {}, 代码期望 {}",
                    version,
                    crate::db::CURRENT_SCHEMA_VERSION
                );
            }
        }

        let conn = Arc::new(Mutex::new(conn));
        Self::from_connection(conn)
    }

    /// 从已有连接装配 (测试用)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let holiday_repo = Arc::new(HolidayRepository::from_connection(conn.clone()));
        let override_repo = Arc::new(DeliveryOverrideRepository::from_connection(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| ApiError::Config(e.to_string()))?,
        );

        let holiday_source: Arc<dyn HolidaySource> =
            Arc::new(SqliteHolidaySource::new(holiday_repo.clone()));
        let override_store: Arc<dyn OverrideStore> =
            Arc::new(SqliteOverrideStore::new(override_repo.clone()));

        Ok(Self {
            holiday_repo,
            override_repo,
            config,
            holiday_source,
            override_store,
            publisher: None,
        })
    }

    /// 配置事件发布者
    pub fn with_publisher(mut self, publisher: Arc<dyn ScheduleEventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    pub fn override_repo(&self) -> &Arc<DeliveryOverrideRepository> {
        &self.override_repo
    }

    /// 节假日日历导入器
    pub fn holiday_importer(&self) -> HolidayImporterImpl {
        HolidayImporterImpl::new(self.holiday_repo.clone())
    }

    // ==========================================
    // 会话装配
    // ==========================================

    /// 打开聚合组编辑会话
    ///
    /// 规则在此即刻校验: 非法规则直接报错, 阻断日历渲染
    pub fn open_session(
        &self,
        ctx: GroupingContext,
        rule: PeriodicityRule,
    ) -> ApiResult<Arc<ScheduleSession>> {
        rule.validate()?;

        let suggest = self
            .config
            .get_suggest_alternative_date()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        let options = self
            .config
            .session_options()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let merger = ScheduleMerger::new(ConflictDetector::new(suggest));
        let publisher = match &self.publisher {
            Some(p) => OptionalEventPublisher::with_publisher(p.clone()),
            None => OptionalEventPublisher::none(),
        };

        Ok(Arc::new(ScheduleSession::new(
            ctx,
            rule,
            self.holiday_source.clone(),
            self.override_store.clone(),
            merger,
            publisher,
            options,
        )))
    }

    /// 打开聚合组交互控制器 (会话 + 手势状态机)
    pub fn open_controller(
        &self,
        ctx: GroupingContext,
        rule: PeriodicityRule,
    ) -> ApiResult<InteractionController> {
        let session = self.open_session(ctx, rule)?;
        Ok(InteractionController::new(session))
    }

    // ==========================================
    // 月视图查询
    // ==========================================

    /// 一次性月视图 (不保留会话)
    pub async fn month_view(
        &self,
        ctx: GroupingContext,
        rule: PeriodicityRule,
        year: i32,
        month: u32,
    ) -> ApiResult<MonthView> {
        let session = self.open_session(ctx, rule)?;
        Ok(session.load_month(year, month).await?)
    }

    /// 跨聚合组并发月视图: 各聚合组互不阻塞
    pub async fn month_views(
        &self,
        requests: Vec<(GroupingContext, PeriodicityRule)>,
        year: i32,
        month: u32,
    ) -> Vec<ApiResult<MonthView>> {
        let futures = requests
            .into_iter()
            .map(|(ctx, rule)| async move { self.month_view(ctx, rule, year, month).await });
        join_all(futures).await
    }
}
