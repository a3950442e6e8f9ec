// ==========================================
// 船舶遥测数据系统 - 命令行入口
// ==========================================
// 用法:
//   vessel-telemetry ingest <file> [--imo X] [--vessel-name Y] [--period-start RFC3339]
//   vessel-telemetry readings <vessel_id> <stream> [cursor]
//   vessel-telemetry vessels
//   vessel-telemetry health
//
// 数据库: VESSEL_TELEMETRY_DB_PATH 或用户数据目录
// 日志: RUST_LOG 控制级别；LOG_FORMAT=json 输出结构化日志
// ==========================================

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use vessel_telemetry::api::ReadingListParams;
use vessel_telemetry::app::{get_default_db_path, AppState};
use vessel_telemetry::logging;

const USAGE: &str = "用法:
  vessel-telemetry ingest <file> [--imo X] [--vessel-name Y] [--period-start RFC3339]
  vessel-telemetry readings <vessel_id> <stream> [cursor]
  vessel-telemetry vessels
  vessel-telemetry health";

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

struct IngestArgs {
    file: String,
    imo: Option<String>,
    vessel_name: Option<String>,
    period_start: Option<DateTime<Utc>>,
}

fn parse_ingest_args(args: &[String]) -> anyhow::Result<IngestArgs> {
    let mut file = None;
    let mut imo = None;
    let mut vessel_name = None;
    let mut period_start = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} 缺少参数值", flag))
        };
        match arg.as_str() {
            "--imo" => imo = Some(value("--imo")?),
            "--vessel-name" => vessel_name = Some(value("--vessel-name")?),
            "--period-start" => {
                let raw = value("--period-start")?;
                let ts = DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("period_start 格式错误: {}", raw))?;
                period_start = Some(ts.with_timezone(&Utc));
            }
            other if other.starts_with("--") => bail!("未知参数: {}", other),
            other if file.is_none() => file = Some(other.to_string()),
            other => bail!("多余的参数: {}", other),
        }
    }

    Ok(IngestArgs {
        file: file.ok_or_else(|| anyhow!("缺少文件路径\n{}", USAGE))?,
        imo,
        vessel_name,
        period_start,
    })
}

async fn run(state: &AppState, command: &str, rest: &[String]) -> anyhow::Result<()> {
    match command {
        "ingest" => {
            let args = parse_ingest_args(rest)?;
            let bytes = std::fs::read(&args.file)
                .with_context(|| format!("无法读取文件: {}", args.file))?;
            let filename = Path::new(&args.file)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| args.file.clone());

            let response = state
                .ingest_api
                .ingest(
                    &bytes,
                    &filename,
                    args.imo.as_deref(),
                    args.vessel_name.as_deref(),
                    args.period_start,
                )
                .await?;
            print_json(&response)
        }
        "readings" => {
            let [vessel_id, stream, tail @ ..] = rest else {
                bail!("{}", USAGE);
            };
            let vessel_id: i64 = vessel_id
                .parse()
                .with_context(|| format!("vessel_id 必须为整数: {}", vessel_id))?;
            let params = ReadingListParams {
                cursor: tail.first().cloned(),
                ..Default::default()
            };

            let page = state
                .telemetry_api
                .list_readings(vessel_id, stream, &params)
                .await?;
            print_json(&page)
        }
        "vessels" => print_json(&state.telemetry_api.list_vessels()?),
        "health" => print_json(&state.telemetry_api.health()?),
        _ => bail!("{}", USAGE),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        logging::init_json();
    } else {
        logging::init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!("{}", USAGE);
    };

    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, version = vessel_telemetry::VERSION, "启动");

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    run(&state, command, rest).await
}
