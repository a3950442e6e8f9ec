// ==========================================
// 船舶遥测数据系统 - 分页游标
// ==========================================
// 格式: base64(STANDARD)( "{RFC3339}|{id}" )
// 空游标 → 零值（0001-01-01T00:00:00Z, 0），表示无下界
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub ts: DateTime<Utc>,
    pub id: i64,
}

impl Cursor {
    pub fn new(ts: DateTime<Utc>, id: i64) -> Self {
        Self { ts, id }
    }

    pub fn zero() -> Self {
        Self {
            ts: Utc
                .with_ymd_and_hms(1, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            id: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// 转为查询下界；零值游标不加条件
    pub fn as_lower_bound(&self) -> Option<(DateTime<Utc>, i64)> {
        if self.is_zero() {
            None
        } else {
            Some((self.ts, self.id))
        }
    }

    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.id
        );
        STANDARD.encode(raw)
    }

    /// 解码游标
    ///
    /// # 返回
    /// - 空串: 零值游标
    /// - Err(InvalidInput): base64 / 分隔符 / 时间 / id 任一不合法
    pub fn decode(raw: &str) -> ApiResult<Self> {
        if raw.is_empty() {
            return Ok(Self::zero());
        }

        let invalid = |what: &str| ApiError::InvalidInput(format!("游标格式错误: {}", what));

        let bytes = STANDARD.decode(raw).map_err(|_| invalid("base64"))?;
        let text = String::from_utf8(bytes).map_err(|_| invalid("utf-8"))?;

        let mut parts = text.split('|');
        let (Some(ts), Some(id), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid("分隔符"));
        };

        let ts = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| invalid("时间戳"))?
            .with_timezone(&Utc);
        let id = id.parse::<i64>().map_err(|_| invalid("id"))?;

        Ok(Self { ts, id })
    }
}
