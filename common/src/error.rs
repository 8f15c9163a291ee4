//! エラー型定義
//!
//! - ParseError: ファイル名の書式エラー（1ファイル単位で収集）
//! - MappingError: 対応表の構造エラー（対応表単位で致命的）
//! - ColumnError: 書き込み先シートの列構成エラー（書き込み前に中断）
//! - PairingWarning: P/M区分の対応付け警告（処理は継続）

use thiserror::Error;

/// ファイル名解析エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("必要な項目数が一致しません（8項目必要、現在{got}項目）")]
    WrongFieldCount { expected: usize, got: usize },

    #[error("番号は0以上の整数である必要があります（現在: {0}）")]
    BadSequenceNumber(String),

    #[error("写真区分は「P」または「M」である必要があります（現在: {0}）")]
    BadPhotoType(String),

    #[error("重量が数値として認識できません（現在: {0}）")]
    BadWeight(String),

    #[error("単位は「g」または「kg」である必要があります（現在: {0}）")]
    BadUnit(String),

    #[error("特記事項は「0」または「1」である必要があります（現在: {0:?}）")]
    MissingOrBadNotes(String),
}

/// 対応表エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("「{0}」列が見つかりません")]
    MissingColumn(String),

    #[error("有効なデータが見つかりませんでした")]
    NoValidRows,
}

/// 列マッピングエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    #[error("必須列「{0}」がスプレッドシートのヘッダーに見つかりません")]
    RequiredColumnMissing(String),
}

/// P/M対応付けの警告
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PairingWarning {
    #[error("対応するP区分が見つかりません: {file_name}（番号 {sequence_number}）")]
    UnpairedMRecord {
        file_name: String,
        sequence_number: u32,
    },

    #[error("P区分の番号 {sequence_number} が重複しています: {}", .file_names.join(", "))]
    DuplicateSequenceNumber {
        sequence_number: u32,
        file_names: Vec<String>,
    },
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("ファイル名エラー: {0}")]
    Parse(#[from] ParseError),

    #[error("対応表エラー: {0}")]
    Mapping(#[from] MappingError),

    #[error("列エラー: {0}")]
    Column(#[from] ColumnError),

    #[error("無効なセルアドレス形式です（例: A5, B10）: {0}")]
    InvalidCellAddress(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
