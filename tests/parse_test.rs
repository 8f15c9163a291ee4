//! ローカルフォルダのファイル名解析テスト

use photo_sheet_common::ParseError;
use photo_sheet_rust::config::Config;
use photo_sheet_rust::pipeline::analyze_names;
use photo_sheet_rust::scanner;
use tempfile::tempdir;

fn touch(dir: &std::path::Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"dummy").unwrap();
    }
}

/// フォルダをスキャンして解析
#[test]
fn test_scan_and_analyze() {
    let dir = tempdir().expect("Failed to create temp dir");
    touch(
        dir.path(),
        &[
            "001_bolt_10.5_g_st01_pr01_P_1.jpg",
            "001_bolt_0_g_st01_pr01_M_0.JPG",
            "002_nut_3_kg_al02_pr02_P_0.png",
            "003_pipe_abc_g_st01_pr01_P_0.jpg",
            "memo.txt",
        ],
    );

    let photos = scanner::scan_folder(dir.path(), &Config::default().photo_extensions).unwrap();
    assert_eq!(photos.len(), 4);

    let report = analyze_names(&photos);
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.valid_count, 3);
    assert_eq!(report.summary.skipped_count, 1);
    assert_eq!(report.summary.success_rate_text(), "75.0");
    assert_eq!(report.paired, 1);

    let stats = &report.statistics;
    assert_eq!(stats.part_names, vec!["bolt", "nut"]);
    assert_eq!(stats.units, vec!["g", "kg"]);
    assert_eq!(stats.photo_types, vec!["m", "p"]);
    assert_eq!(stats.errors.len(), 1);
    assert_eq!(stats.errors[0].file_name, "003_pipe_abc_g_st01_pr01_P_0.jpg");
    assert_eq!(
        stats.errors[0].error,
        ParseError::BadWeight("abc".into()).to_string()
    );
}

/// 解析結果のJSON出力
#[test]
fn test_parse_report_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    touch(dir.path(), &["001_bolt_10.5_g_st01_pr01_P_1.jpg", "002_x_M_0.jpg"]);

    let photos = scanner::scan_folder(dir.path(), &Config::default().photo_extensions).unwrap();
    let report = analyze_names(&photos);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["invalidCount"], 1);
    assert_eq!(json["statistics"]["successRate"], "50.0");
}
