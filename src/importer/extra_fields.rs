// ==========================================
// 船舶遥测数据系统 - 未映射列收集
// ==========================================
// 职责: 未被具名字段消费的非空列 → JSON 对象字符串
// 约束: 无剩余列时输出 "{}"（永不为 null）；键按字典序输出
// ==========================================

use crate::importer::error::ImportResult;
use std::collections::{BTreeMap, HashMap};

/// 构建 extra_json
///
/// # 参数
/// - row: 原始表头 → 单元格文本
/// - mapped: 已被具名字段消费的原始表头
pub fn build_extra_json(row: &HashMap<String, String>, mapped: &[&str]) -> ImportResult<String> {
    let extra: BTreeMap<&str, &str> = row
        .iter()
        .filter(|(col, val)| !val.is_empty() && !mapped.contains(&col.as_str()))
        .map(|(col, val)| (col.as_str(), val.as_str()))
        .collect();

    if extra.is_empty() {
        return Ok("{}".to_string());
    }

    Ok(serde_json::to_string(&extra)?)
}
