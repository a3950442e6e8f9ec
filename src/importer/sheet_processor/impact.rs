// ==========================================
// 工作表处理器 - 冲击/振动 (Impact / Vibration)
// ==========================================

use super::common::{finish_reading, mapped_headers, SheetRows, SheetTable};
use crate::domain::reading::{ImpactValues, ReadingValues};
use crate::domain::types::Stream;
use crate::importer::error::ImportResult;
use crate::importer::telemetry_importer_trait::SheetProcessor;
use chrono::{DateTime, Utc};

const SENSOR_ID: [&str; 3] = ["sensor_id", "sensor", "device_id"];
const ACCEL: [&str; 3] = ["accel", "acceleration", "accel_g"];
const SHOCK: [&str; 3] = ["shock", "shock_g", "impact"];
const NOTES: [&str; 3] = ["notes", "note", "comment"];

pub struct ImpactSheetProcessor;

impl SheetProcessor for ImpactSheetProcessor {
    fn stream(&self) -> Stream {
        Stream::Impact
    }

    fn process(
        &self,
        table: &SheetTable<'_>,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<SheetRows> {
        let mapper = table.mapper();
        let ts_col = table.timestamp_column(&mapper);
        let sensor_col = table.column(&mapper, &SENSOR_ID);
        let accel_col = table.column(&mapper, &ACCEL);
        let shock_col = table.column(&mapper, &SHOCK);
        let notes_col = table.column(&mapper, &NOTES);
        let mapped = mapped_headers(&[&ts_col, &sensor_col, &accel_col, &shock_col, &notes_col]);

        let mut out = SheetRows::default();
        for row in table.rows() {
            let ts = row.timestamp(ts_col.as_ref(), reference_ts);
            let values = ImpactValues {
                sensor_id: row.text(sensor_col.as_ref()),
                accel_g: row.float(accel_col.as_ref()),
                shock_g: row.float(shock_col.as_ref()),
                notes: row.text(notes_col.as_ref()),
            };

            let tag = values.sensor_id.as_ref().map(|id| format!("sensor_id:{}", id));
            out.readings.push(finish_reading(
                &row,
                vessel_id,
                ts,
                tag,
                &mapped,
                ReadingValues::Impact(values),
            )?);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_impact_rows() {
        let reference = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let headers = strings(&["Timestamp", "Sensor", "Accel (g)", "Shock (g)", "Comment"]);
        let data = vec![strings(&["2025-08-08T10:00:00Z", "VIB-07", "0.8", "bad", "Heavy swell"])];
        let table = SheetTable::new("Impact Vibration", &headers, &data);

        let out = ImpactSheetProcessor.process(&table, 3, reference).unwrap();
        assert_eq!(
            out.readings[0].values,
            ReadingValues::Impact(ImpactValues {
                sensor_id: Some("VIB-07".to_string()),
                accel_g: Some(0.8),
                shock_g: None,
                notes: Some("Heavy swell".to_string()),
            })
        );
        assert_eq!(out.readings[0].extra_json, "{}");
    }
}
