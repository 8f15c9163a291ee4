//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use photo_sheet_common::{ColumnError, ParseError};
use photo_sheet_rust::error::PhotoSheetError;
use photo_sheet_rust::scanner;
use std::path::Path;
use tempfile::tempdir;

fn extensions() -> Vec<String> {
    vec!["jpg".into(), "png".into()]
}

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), &extensions());
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, PhotoSheetError::FolderNotFound(_)));
}

/// 写真のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_photos() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    // 空の一覧はエラーではない
    let result = scanner::scan_folder(dir.path(), &extensions());
    assert!(result.unwrap().is_empty());
}

/// PhotoSheetErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PhotoSheetError::Config("テスト設定エラー".to_string()),
        PhotoSheetError::MissingCredentials,
        PhotoSheetError::FileNotFound("material.xlsx".to_string()),
        PhotoSheetError::FolderNotFound("/path/to/folder".to_string()),
        PhotoSheetError::LookupTable("壊れたファイル".to_string()),
        PhotoSheetError::HttpFailure {
            status: 404,
            message: "not found".to_string(),
        },
        PhotoSheetError::RateLimited("quota".to_string()),
        PhotoSheetError::ApiParse("unexpected".to_string()),
        PhotoSheetError::SheetNotFound("ss".to_string()),
        PhotoSheetError::NoTargetFiles("folder".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "Error display should not be empty");
    }
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let err: PhotoSheetError = ColumnError::RequiredColumnMissing("構成部品".into()).into();
    assert_eq!(
        err.to_string(),
        "列エラー: 必須列「構成部品」がスプレッドシートのヘッダーに見つかりません"
    );

    let err = PhotoSheetError::Common(ParseError::BadUnit("mg".into()).into());
    assert!(err.to_string().contains("mg"));
}

/// 再試行の対象になるエラー
#[test]
fn test_transient_classification() {
    assert!(PhotoSheetError::RateLimited("429".into()).is_transient());
    assert!(PhotoSheetError::HttpFailure {
        status: 503,
        message: String::new()
    }
    .is_transient());
    assert!(!PhotoSheetError::HttpFailure {
        status: 400,
        message: String::new()
    }
    .is_transient());
    assert!(!PhotoSheetError::MissingCredentials.is_transient());
}

/// IOエラーの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PhotoSheetError = io_err.into();
    assert!(matches!(err, PhotoSheetError::Io(_)));
}

/// JSONエラーの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
    let err: PhotoSheetError = json_err.into();
    assert!(matches!(err, PhotoSheetError::JsonParse(_)));
}
