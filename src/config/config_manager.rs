// ==========================================
// 船舶遥测数据系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::ingest_config_trait::{ConfigResult, IngestConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const ALLOW_UNSAFE_DUPLICATE_INGEST: &str = "allow_unsafe_duplicate_ingest";
    pub const DEFAULT_PAGE_LIMIT: &str = "default_page_limit";
    pub const MAX_PAGE_LIMIT: &str = "max_page_limit";
}

/// 环境变量覆写
pub const ENV_ALLOW_UNSAFE_DUPLICATE_INGEST: &str = "ALLOW_UNSAFE_DUPLICATE_INGEST";

pub const DEFAULT_PAGE_LIMIT: usize = 200;
pub const MAX_PAGE_LIMIT: usize = 1000;

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2,
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_usize_or_default(&self, key: &str, default: usize) -> ConfigResult<usize> {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// IngestConfigReader Trait 实现
// ==========================================
#[async_trait]
impl IngestConfigReader for ConfigManager {
    async fn allow_unsafe_duplicate_ingest(&self) -> ConfigResult<bool> {
        if let Ok(raw) = std::env::var(ENV_ALLOW_UNSAFE_DUPLICATE_INGEST) {
            if let Some(v) = parse_bool(&raw) {
                return Ok(v);
            }
            tracing::warn!(raw_value = %raw, "环境变量 ALLOW_UNSAFE_DUPLICATE_INGEST 无法解析，忽略");
        }

        let raw = self.get_global_config_value(config_keys::ALLOW_UNSAFE_DUPLICATE_INGEST)?;
        Ok(raw.as_deref().and_then(parse_bool).unwrap_or(false))
    }

    /// 默认条数不超过 max_page_limit
    async fn default_page_limit(&self) -> ConfigResult<usize> {
        let limit = self.get_usize_or_default(config_keys::DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_LIMIT)?;
        let max = self.max_page_limit().await?;
        Ok(limit.min(max))
    }

    async fn max_page_limit(&self) -> ConfigResult<usize> {
        self.get_usize_or_default(config_keys::MAX_PAGE_LIMIT, MAX_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[tokio::test]
    async fn test_page_limit_defaults_and_overrides() {
        let config = setup();
        assert_eq!(config.default_page_limit().await.unwrap(), 200);
        assert_eq!(config.max_page_limit().await.unwrap(), 1000);

        config
            .set_global_config_value(config_keys::DEFAULT_PAGE_LIMIT, "50")
            .unwrap();
        config
            .set_global_config_value(config_keys::MAX_PAGE_LIMIT, "abc")
            .unwrap();
        assert_eq!(config.default_page_limit().await.unwrap(), 50);
        assert_eq!(config.max_page_limit().await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_default_page_limit_capped_by_max() {
        let config = setup();
        config
            .set_global_config_value(config_keys::DEFAULT_PAGE_LIMIT, &usize::MAX.to_string())
            .unwrap();
        assert_eq!(config.default_page_limit().await.unwrap(), MAX_PAGE_LIMIT);

        config
            .set_global_config_value(config_keys::MAX_PAGE_LIMIT, "20")
            .unwrap();
        assert_eq!(config.default_page_limit().await.unwrap(), 20);
    }

    #[test]
    fn test_global_value_round_trip() {
        let config = setup();
        assert_eq!(config.get_global_config_value("missing").unwrap(), None);

        config.set_global_config_value("k", "v1").unwrap();
        config.set_global_config_value("k", "v2").unwrap();
        assert_eq!(
            config.get_global_config_value("k").unwrap().as_deref(),
            Some("v2")
        );
    }
}
