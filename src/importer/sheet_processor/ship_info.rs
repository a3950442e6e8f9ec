// ==========================================
// 工作表处理器 - Ship Info（船舶身份 + 船位）
// ==========================================
// 仅使用第一条数据行:
// - 船舶身份: IMO / 船名 / 船旗 / 船型
// - 船位读数: 至多一条；校验警告照常写入
// ==========================================

use super::common::{finish_reading, SheetRows, SheetTable};
use crate::domain::reading::{LocationValues, ReadingValues};
use crate::importer::error::ImportResult;
use crate::importer::field_validator::validate_location;
use chrono::{DateTime, Utc};

const IMO: [&str; 1] = ["imo"];
const NAME: [&str; 3] = ["name", "vessel_name", "ship_name"];
const FLAG: [&str; 1] = ["flag"];
const VESSEL_TYPE: [&str; 3] = ["type", "vessel_type", "ship_type"];

const LATITUDE: [&str; 2] = ["latitude", "lat"];
const LONGITUDE: [&str; 3] = ["longitude", "lon", "lng"];
const COURSE: [&str; 3] = ["course", "heading", "bearing"];
const SPEED: [&str; 3] = ["speed", "speed_knots", "speed(knots)"];
const STATUS: [&str; 3] = ["status", "vessel_status", "nav_status"];

/// 表头（小写）包含以下任一子串即视为已消费，不进入 extra_json
const LOCATION_MAPPED_MARKERS: [&str; 8] =
    ["lat", "lon", "course", "speed", "status", "time", "name", "imo"];

/// Ship Info 表中的船舶身份字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipInfo {
    pub imo: Option<String>,
    pub name: Option<String>,
    pub flag: Option<String>,
    pub vessel_type: Option<String>,
}

pub fn read_ship_info(table: &SheetTable<'_>) -> ShipInfo {
    let Some(row) = table.first_row() else {
        return ShipInfo::default();
    };
    let mapper = table.mapper();

    ShipInfo {
        imo: row.text(table.column(&mapper, &IMO).as_ref()),
        name: row.text(table.column(&mapper, &NAME).as_ref()),
        flag: row.text(table.column(&mapper, &FLAG).as_ref()),
        vessel_type: row.text(table.column(&mapper, &VESSEL_TYPE).as_ref()),
    }
}

/// 从 Ship Info 第一条数据行提取船位读数
///
/// 所有船位字段均缺失时不产出读数。
pub fn extract_location(
    table: &SheetTable<'_>,
    vessel_id: i64,
    reference_ts: DateTime<Utc>,
) -> ImportResult<SheetRows> {
    let mut out = SheetRows::default();
    let Some(row) = table.first_row() else {
        return Ok(out);
    };
    let mapper = table.mapper();

    let ts = row.timestamp(table.timestamp_column(&mapper).as_ref(), reference_ts);
    let values = LocationValues {
        latitude: row.float(table.column(&mapper, &LATITUDE).as_ref()),
        longitude: row.float(table.column(&mapper, &LONGITUDE).as_ref()),
        course_degrees: row.float(table.column(&mapper, &COURSE).as_ref()),
        speed_knots: row.float(table.column(&mapper, &SPEED).as_ref()),
        status: row.text(table.column(&mapper, &STATUS).as_ref()),
    };

    if values == LocationValues::default() {
        return Ok(out);
    }

    let warnings = validate_location(
        values.latitude,
        values.longitude,
        values.course_degrees,
        values.speed_knots,
    );
    if !warnings.is_empty() {
        out.warnings
            .push(format!("location data: {}", warnings.join(", ")));
    }

    let mapped: Vec<&str> = table
        .headers
        .iter()
        .filter(|h| {
            let lower = h.to_lowercase();
            LOCATION_MAPPED_MARKERS.iter().any(|m| lower.contains(*m))
        })
        .map(String::as_str)
        .collect();

    let tag = values.status.as_ref().map(|s| format!("status:{}", s));
    out.readings.push(finish_reading(
        &row,
        vessel_id,
        ts,
        tag,
        &mapped,
        ReadingValues::Location(values),
    )?);

    Ok(out)
}
