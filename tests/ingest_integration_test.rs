// ==========================================
// 遥测导入集成测试
// ==========================================
// 目标: 验证 TelemetryImporterImpl → Repository → SQLite 的完整链路
// 工作簿多由内存读取器提供，CSV / XLSX 用例走真实读取器
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod ingest_integration_test {
    use crate::test_helpers::{
        create_test_db, create_test_importer, engines_sheet, reference_ts, rows, sample_workbook,
        ship_info_sheet, ts,
    };
    use rusqlite::Connection;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use vessel_telemetry::db::open_sqlite_connection;
    use vessel_telemetry::domain::reading::ReadingValues;
    use vessel_telemetry::domain::{IngestRequest, IngestStatus, Stream};
    use vessel_telemetry::importer::{
        ImportError, TelemetryImporter, TelemetryImporterImpl, UniversalWorkbookReader, Workbook,
    };
    use vessel_telemetry::repository::{
        ReadingQuery, ReadingRepository, StreamLatestRepository, TelemetryImportRepositoryImpl,
        UploadRepository, VesselRepository,
    };

    fn request<'a>(
        bytes: &'a [u8],
        imo: Option<&'a str>,
        vessel_name: Option<&'a str>,
    ) -> IngestRequest<'a> {
        IngestRequest {
            bytes,
            filename: "telemetry.xlsx",
            imo,
            vessel_name,
            reference_ts: reference_ts(),
        }
    }

    fn shared_conn(db_path: &str) -> Arc<Mutex<Connection>> {
        Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()))
    }

    // ==========================================
    // 文件级幂等
    // ==========================================

    #[tokio::test]
    async fn test_same_file_ingested_once() {
        vessel_telemetry::logging::init_test();
        let (_temp_file, db_path) = create_test_db().unwrap();
        let importer = create_test_importer(&db_path, sample_workbook("9876543", "Northern Star"));

        let first = importer
            .process_file(request(b"workbook-v1", None, None))
            .await
            .unwrap();
        assert_eq!(first.status, IngestStatus::Ingested);
        assert_eq!(first.inserted(Stream::Engines), 3);
        assert_eq!(first.inserted(Stream::Fuel), 1);
        assert_eq!(first.inserted(Stream::Generators), 1);
        assert_eq!(first.inserted(Stream::Location), 1);
        assert!(first.warnings.is_empty(), "warnings: {:?}", first.warnings);

        let second = importer
            .process_file(request(b"workbook-v1", None, None))
            .await
            .unwrap();
        assert_eq!(second.status, IngestStatus::AlreadyIngested);
        assert_eq!(second.upload_id, first.upload_id);
        assert_eq!(second.vessel_id, first.vessel_id);
        assert!(second.rows_inserted.is_empty());

        let readings = ReadingRepository::new(shared_conn(&db_path));
        let vessel_id = first.vessel_id.unwrap();
        assert_eq!(readings.count(vessel_id, Stream::Engines).unwrap(), 3);

        let upload = UploadRepository::new(shared_conn(&db_path))
            .find_by_id(first.upload_id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(upload.vessel_id, vessel_id);
        assert_eq!(upload.source_filename, "telemetry.xlsx");
        assert_eq!(upload.uploaded_at, reference_ts());
        assert_eq!(upload.file_hash.len(), 64);
    }

    #[tokio::test]
    async fn test_rows_deduplicated_across_files() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let importer = create_test_importer(&db_path, sample_workbook("9876543", "Northern Star"));

        let first = importer
            .process_file(request(b"export-monday", None, None))
            .await
            .unwrap();
        // 内容相同、字节不同：新上传记录，但读数全部去重
        let second = importer
            .process_file(request(b"export-tuesday", None, None))
            .await
            .unwrap();

        assert_eq!(second.status, IngestStatus::Ingested);
        assert_ne!(second.upload_id, first.upload_id);
        assert_eq!(second.vessel_id, first.vessel_id);
        assert_eq!(second.rows_inserted.get(&Stream::Engines), Some(&0));
        assert_eq!(second.rows_inserted.get(&Stream::Fuel), Some(&0));
        // 船位仅在写入 >0 时出现
        assert!(!second.rows_inserted.contains_key(&Stream::Location));

        let readings = ReadingRepository::new(shared_conn(&db_path));
        assert_eq!(
            readings
                .count(first.vessel_id.unwrap(), Stream::Engines)
                .unwrap(),
            3
        );
    }

    // ==========================================
    // 船舶身份
    // ==========================================

    #[tokio::test]
    async fn test_imo_param_overrides_ship_info() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let importer = create_test_importer(&db_path, sample_workbook("2222222", "Northern Star"));

        let response = importer
            .process_file(request(b"wb", Some(" 1111111 "), None))
            .await
            .unwrap();

        let vessels = VesselRepository::new(shared_conn(&db_path));
        let vessel = vessels
            .find_by_id(response.vessel_id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(vessel.imo.as_deref(), Some("1111111"));
        // 船名仍取 Ship Info 表
        assert_eq!(vessel.name, "Northern Star");
        assert_eq!(vessel.flag.as_deref(), Some("PA"));
        assert_eq!(vessel.vessel_type.as_deref(), Some("Bulk Carrier"));
        assert!(vessels.find_by_imo("2222222").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_known_imo_updates_profile() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let first = create_test_importer(&db_path, sample_workbook("9876543", "Northern Star"))
            .process_file(request(b"first", None, None))
            .await
            .unwrap();
        // 同一 IMO，船名与船旗均变更
        let reflagged = Workbook::new()
            .with_sheet("Ship Info", ship_info_sheet("9876543", "Southern Cross", "LR"))
            .with_sheet("Engines", engines_sheet());
        let second = create_test_importer(&db_path, reflagged)
            .process_file(request(b"second", None, None))
            .await
            .unwrap();

        assert_eq!(first.vessel_id, second.vessel_id);

        let vessels = VesselRepository::new(shared_conn(&db_path));
        assert_eq!(vessels.count().unwrap(), 1);
        let vessel = vessels.find_by_imo("9876543").unwrap().unwrap();
        assert_eq!(vessel.name, "Southern Cross");
        assert_eq!(vessel.flag.as_deref(), Some("LR"));
        assert_eq!(vessel.vessel_type.as_deref(), Some("Bulk Carrier"));
    }

    #[tokio::test]
    async fn test_name_only_vessel_created_per_ingest() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let workbook = Workbook::new().with_sheet("Engines", engines_sheet());
        let importer = create_test_importer(&db_path, workbook);

        let first = importer
            .process_file(request(b"a", None, Some("Sea Breeze")))
            .await
            .unwrap();
        let second = importer
            .process_file(request(b"b", None, Some("Sea Breeze")))
            .await
            .unwrap();

        assert_ne!(first.vessel_id, second.vessel_id);
        // 不同船舶：读数不互相去重
        assert_eq!(second.inserted(Stream::Engines), 3);

        let vessels = VesselRepository::new(shared_conn(&db_path));
        let vessel = vessels
            .find_by_id(first.vessel_id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(vessel.imo, None);
        assert_eq!(vessel.name, "Sea Breeze");
    }

    #[tokio::test]
    async fn test_imo_only_gets_placeholder_name() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let workbook = Workbook::new().with_sheet("Engines", engines_sheet());

        let response = create_test_importer(&db_path, workbook)
            .process_file(request(b"wb", Some("7654321"), None))
            .await
            .unwrap();

        let vessel = VesselRepository::new(shared_conn(&db_path))
            .find_by_id(response.vessel_id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(vessel.name, "Vessel-7654321");
    }

    #[tokio::test]
    async fn test_missing_identity_rejected() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let workbook = Workbook::new().with_sheet("Engines", engines_sheet());
        let importer = create_test_importer(&db_path, workbook);

        let result = importer.process_file(request(b"wb", None, Some("   "))).await;
        assert!(matches!(result, Err(ImportError::VesselIdentityMissing)));

        // 失败的导入不留上传记录
        let uploads = UploadRepository::new(shared_conn(&db_path));
        assert!(uploads
            .find_by_hash(&vessel_telemetry::importer::fingerprint::file_hash(b"wb"))
            .unwrap()
            .is_none());
    }

    // ==========================================
    // 表级处理
    // ==========================================

    #[tokio::test]
    async fn test_fuel_cubic_meters_converted() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let workbook = Workbook::new()
            .with_sheet("Ship Info", ship_info_sheet("9876543", "Northern Star", "PA"))
            .with_sheet(
                "Fuel",
                rows(&[
                    &["Timestamp", "Tank", "Volume (m3)"],
                    &["2025-08-08T10:00:00Z", "2", "10"],
                ]),
            );

        let response = create_test_importer(&db_path, workbook)
            .process_file(request(b"fuel", None, None))
            .await
            .unwrap();
        assert_eq!(response.inserted(Stream::Fuel), 1);

        let readings = ReadingRepository::new(shared_conn(&db_path));
        let query = ReadingQuery::new(response.vessel_id.unwrap(), Stream::Fuel);
        let stored = readings.find_latest(&query).unwrap().unwrap();
        match stored.values {
            ReadingValues::Fuel(values) => {
                assert_eq!(values.tank_no, Some(2));
                assert_eq!(values.volume_liters, Some(10000.0));
                assert_eq!(values.level_percent, Some(100.0));
            }
            other => panic!("unexpected values: {:?}", other),
        }
        assert_eq!(stored.ts, ts("2025-08-08T10:00:00Z"));
    }

    #[tokio::test]
    async fn test_unreadable_sheet_becomes_warning() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let workbook = sample_workbook("9876543", "Northern Star")
            .with_unreadable_sheet("Generators 2", "corrupt sheet xml")
            .with_sheet("Impact Sensors", rows(&[&["Timestamp", "Sensor", "Accel"]]));

        let response = create_test_importer(&db_path, workbook)
            .process_file(request(b"partial", None, None))
            .await
            .unwrap();

        assert_eq!(response.status, IngestStatus::Ingested);
        assert_eq!(
            response.warnings,
            vec![
                "error reading Generators 2 sheet".to_string(),
                "error reading Impact Sensors sheet".to_string(),
            ]
        );
        // 同流两张表：写入行数累加（1 + 0）
        assert_eq!(response.inserted(Stream::Generators), 1);
        assert_eq!(response.rows_inserted.get(&Stream::Impact), Some(&0));
        assert_eq!(response.inserted(Stream::Engines), 3);
    }

    #[tokio::test]
    async fn test_invalid_rows_skipped_with_warning() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let workbook = Workbook::new().with_sheet(
            "Main Engines",
            rows(&[
                &["Timestamp", "Engine", "RPM", "Oil Pressure", "Bay"],
                &["2025-08-08T10:00:00Z", "1", "-5", "4.0", ""],
                &["", "", "", "", ""],
                &["2025-08-08T10:05:00Z", "1", "700", "4.0", "A"],
            ]),
        );

        let response = create_test_importer(&db_path, workbook)
            .process_file(request(b"rows", Some("9876543"), None))
            .await
            .unwrap();

        assert_eq!(response.inserted(Stream::Engines), 1);
        assert_eq!(response.warnings, vec!["row 2 engines: negative rpm".to_string()]);

        let readings = ReadingRepository::new(shared_conn(&db_path));
        let query = ReadingQuery::new(response.vessel_id.unwrap(), Stream::Engines);
        let stored = readings.find_latest(&query).unwrap().unwrap();
        assert_eq!(stored.extra_json, serde_json::json!({ "Bay": "A" }));
    }

    #[tokio::test]
    async fn test_location_and_stream_latest() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let importer = create_test_importer(&db_path, sample_workbook("9876543", "Northern Star"));

        let response = importer
            .process_file(request(b"wb", None, None))
            .await
            .unwrap();
        let vessel_id = response.vessel_id.unwrap();

        let readings = ReadingRepository::new(shared_conn(&db_path));
        let location = readings
            .find_latest(&ReadingQuery::new(vessel_id, Stream::Location))
            .unwrap()
            .unwrap();
        // Ship Info 无时间列：船位取参考时间
        assert_eq!(location.ts, reference_ts());
        match location.values {
            ReadingValues::Location(values) => {
                assert_eq!(values.latitude, Some(1.25));
                assert_eq!(values.longitude, Some(103.8));
                assert_eq!(values.speed_knots, Some(12.5));
                assert_eq!(values.status.as_deref(), Some("Underway"));
            }
            other => panic!("unexpected values: {:?}", other),
        }

        let latest = StreamLatestRepository::new(shared_conn(&db_path))
            .list_for_vessel(vessel_id)
            .unwrap();
        assert_eq!(latest.len(), 4);
        assert!(latest.values().all(|ts| *ts == reference_ts()));
        assert!(!latest.contains_key(&Stream::Cctv));
    }

    // ==========================================
    // 真实读取器（CSV / XLSX）
    // ==========================================

    #[tokio::test]
    async fn test_csv_ingest_with_universal_reader() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = TelemetryImportRepositoryImpl::new(&db_path).unwrap();
        let importer = TelemetryImporterImpl::new(repo, Box::new(UniversalWorkbookReader));

        let csv = "Timestamp,Engine,RPM,Temp\n\
                   2025-08-08T10:00:00Z,1,720,85\n\
                   2025-08-08T10:10:00Z,1,725,86\n";
        let response = importer
            .process_file(IngestRequest {
                bytes: csv.as_bytes(),
                filename: "engines.csv",
                imo: Some("9876543"),
                vessel_name: None,
                reference_ts: reference_ts(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, IngestStatus::Ingested);
        assert_eq!(response.inserted(Stream::Engines), 2);
    }

    #[tokio::test]
    async fn test_xlsx_fixture_with_universal_reader() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = TelemetryImportRepositoryImpl::new(&db_path).unwrap();
        let importer = TelemetryImporterImpl::new(repo, Box::new(UniversalWorkbookReader));

        let bytes = std::fs::read(PathBuf::from("tests/fixtures/telemetry_sample.xlsx")).unwrap();
        let response = importer
            .process_file(request(&bytes, None, None))
            .await
            .unwrap();

        assert_eq!(response.status, IngestStatus::Ingested);
        assert_eq!(response.inserted(Stream::Engines), 1);
        // Generators 声明了但无表数据
        assert_eq!(
            response.warnings,
            vec!["error reading Generators sheet".to_string()]
        );

        // 数值单元格的 IMO 按整数文本入库
        let vessel = VesselRepository::new(shared_conn(&db_path))
            .find_by_imo("9876543")
            .unwrap()
            .unwrap();
        assert_eq!(Some(vessel.id), response.vessel_id);
        assert_eq!(vessel.imo.as_deref(), Some("9876543"));
        assert_eq!(vessel.name, "Northern Star");
        assert_eq!(vessel.flag.as_deref(), Some("PA"));

        let stored = ReadingRepository::new(shared_conn(&db_path))
            .find_latest(&ReadingQuery::new(vessel.id, Stream::Engines))
            .unwrap()
            .unwrap();
        assert_eq!(stored.ts, ts("2025-08-08T10:30:00Z"));
        match stored.values {
            ReadingValues::Engine(values) => {
                assert_eq!(values.engine_no, Some(2));
                assert_eq!(values.rpm, Some(1500.5));
            }
            other => panic!("unexpected values: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsupported_format_rejected() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let repo = TelemetryImportRepositoryImpl::new(&db_path).unwrap();
        let importer = TelemetryImporterImpl::new(repo, Box::new(UniversalWorkbookReader));

        let result = importer
            .process_file(IngestRequest {
                bytes: b"%PDF-1.4",
                filename: "report.pdf",
                imo: Some("9876543"),
                vessel_name: None,
                reference_ts: reference_ts(),
            })
            .await;
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
