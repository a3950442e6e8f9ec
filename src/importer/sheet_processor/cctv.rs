// ==========================================
// 工作表处理器 - 监控摄像 (CCTV)
// ==========================================
// 无范围校验，所有行写入
// ==========================================

use super::common::{finish_reading, mapped_headers, Column, SheetRows, SheetTable};
use crate::domain::reading::{CctvValues, ReadingValues};
use crate::domain::types::Stream;
use crate::importer::error::ImportResult;
use crate::importer::telemetry_importer_trait::SheetProcessor;
use chrono::{DateTime, Utc};

const CAM_ID: [&str; 4] = ["cam_id", "camera", "camera_id", "cam"];
const STATUS: [&str; 2] = ["status", "state"];
const UPTIME: [&str; 3] = ["uptime", "uptime_percent", "availability"];

pub struct CctvSheetProcessor;

impl SheetProcessor for CctvSheetProcessor {
    fn stream(&self) -> Stream {
        Stream::Cctv
    }

    fn process(
        &self,
        table: &SheetTable<'_>,
        vessel_id: i64,
        reference_ts: DateTime<Utc>,
    ) -> ImportResult<SheetRows> {
        let mapper = table.mapper();
        let ts_col: Option<Column> = table.timestamp_column(&mapper);
        let cam_col = table.column(&mapper, &CAM_ID);
        let status_col = table.column(&mapper, &STATUS);
        let uptime_col = table.column(&mapper, &UPTIME);
        let mapped = mapped_headers(&[&ts_col, &cam_col, &status_col, &uptime_col]);

        let mut out = SheetRows::default();
        for row in table.rows() {
            let ts = row.timestamp(ts_col.as_ref(), reference_ts);
            let values = CctvValues {
                cam_id: row.text(cam_col.as_ref()),
                status: row.text(status_col.as_ref()),
                uptime_percent: row.float(uptime_col.as_ref()),
            };

            let tag = values.cam_id.as_ref().map(|id| format!("cam_id:{}", id));
            out.readings.push(finish_reading(
                &row,
                vessel_id,
                ts,
                tag,
                &mapped,
                ReadingValues::Cctv(values),
            )?);
        }

        Ok(out)
    }
}
