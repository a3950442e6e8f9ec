// ==========================================
// 船舶遥测数据系统 - 内容指纹
// ==========================================
// file_hash: 文件级幂等键
// row_hash:  行级去重键（与 vessel_id + ts 组成唯一约束）
// ==========================================

use crate::domain::types::Stream;
use crate::importer::value_parser::format_rfc3339;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// 整个文件字节的 SHA-256（hex）
pub fn file_hash(bytes: &[u8]) -> String {
    sha256_hex(bytes)
}

/// 行指纹
///
/// `sha256(stream | vessel_id | ts(RFC3339) | sort(keys)...)`
///
/// keys 排序后拼接，因此与传入顺序无关；但序列化后的 extra_json
/// 作为单个不透明字符串参与排序，其内部键序仍会影响结果。
pub fn row_hash(vessel_id: i64, ts: &DateTime<Utc>, stream: Stream, keys: &[String]) -> String {
    let mut sorted: Vec<&str> = keys.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let vessel = vessel_id.to_string();
    let ts = format_rfc3339(ts);

    let mut parts: Vec<&str> = Vec::with_capacity(sorted.len() + 3);
    parts.push(stream.as_str());
    parts.push(&vessel);
    parts.push(&ts);
    parts.extend(sorted);

    sha256_hex(parts.join("|").as_bytes())
}
