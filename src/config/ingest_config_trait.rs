// ==========================================
// 船舶遥测数据系统 - 导入/查询配置读取 Trait
// ==========================================
// 职责: 定义导入与查询所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// IngestConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait IngestConfigReader: Send + Sync {
    /// 是否允许重复上传返回成功（而非拒绝）
    ///
    /// # 默认值
    /// - false
    ///
    /// # 覆写
    /// - 环境变量 ALLOW_UNSAFE_DUPLICATE_INGEST 优先于 config_kv
    async fn allow_unsafe_duplicate_ingest(&self) -> ConfigResult<bool>;

    /// 分页默认条数
    ///
    /// # 默认值
    /// - 200
    async fn default_page_limit(&self) -> ConfigResult<usize>;

    /// 分页最大条数（超出时回落到默认值）
    ///
    /// # 默认值
    /// - 1000
    async fn max_page_limit(&self) -> ConfigResult<usize>;
}
