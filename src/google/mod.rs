//! Google Drive / Sheets との入出力
//!
//! 処理本体は `PhotoSource` と `SheetStore` だけに依存する。
//! HTTPの実装は `drive` / `sheets`、テストではメモリ上の実装に差し替える。

#![allow(async_fn_in_trait)]

pub mod auth;
pub mod drive;
pub mod sheets;

use crate::error::{PhotoSheetError, Result};
use photo_sheet_common::{hyperlink_formula, CellRef, CellWrite, PhotoFile};
use reqwest::{Response, StatusCode};

pub use auth::resolve_access_token;
pub use drive::DriveClient;
pub use sheets::SheetsClient;

/// 書き込み先のシート
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRef {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// タブのID（書式付き更新で使用）
    pub sheet_id: i64,
}

/// シートの1行目
#[derive(Debug, Clone)]
pub struct SheetHeader {
    pub sheet: SheetRef,
    pub header_row: Vec<Option<String>>,
}

/// 一括書き込みの結果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WriteResult {
    pub updated_cells: usize,
    pub updated_rows: usize,
    /// 最初の更新範囲の左上セル（APIが返した場合）
    pub first_cell: Option<CellRef>,
}

/// 写真の取得元
pub trait PhotoSource {
    /// フォルダ直下の写真一覧
    async fn list_photos(&self, folder_id: &str) -> Result<Vec<PhotoFile>>;

    /// リンクを知っていれば閲覧できるURL（必要なら共有設定を追加）
    async fn share_link(&self, file: &PhotoFile) -> Result<String>;
}

/// 書き込み先のスプレッドシート
pub trait SheetStore {
    /// 先頭シートの名前とヘッダー行
    async fn sheet_header(&self, spreadsheet_id: &str) -> Result<SheetHeader>;

    /// 列の値（1行目から。末尾の空セルは含まれないことがある）
    async fn column_values(&self, sheet: &SheetRef, column_letter: &str)
        -> Result<Vec<Option<String>>>;

    async fn batch_write(&self, sheet: &SheetRef, writes: &[CellWrite]) -> Result<WriteResult>;

    /// セルの現在の表示値
    async fn cell_text(&self, sheet: &SheetRef, cell: CellRef) -> Result<Option<String>>;

    /// セルに数式を設定
    async fn write_formula(&self, sheet: &SheetRef, cell: CellRef, formula: &str) -> Result<()>;

    /// セルにハイパーリンクを設定
    ///
    /// `display_text` が None の場合はセルの現在値を表示文字列にする。
    /// 空セルなら `fallback_text` を使う。
    async fn set_hyperlink(
        &self,
        sheet: &SheetRef,
        cell: CellRef,
        url: &str,
        display_text: Option<&str>,
        fallback_text: &str,
    ) -> Result<()> {
        let text = match display_text {
            Some(text) => text.to_string(),
            None => self
                .cell_text(sheet, cell)
                .await?
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| fallback_text.to_string()),
        };
        self.write_formula(sheet, cell, &hyperlink_formula(url, &text))
            .await
    }
}

/// 認証済みのHTTPクライアント
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    token: String,
}

impl GoogleClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    pub fn with_http(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
        }
    }

    pub async fn get_json(&self, url: reqwest::Url) -> Result<serde_json::Value> {
        log::debug!("GET {}", url);
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    pub async fn post_json(
        &self,
        url: reqwest::Url,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        log::debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

/// ステータスコードをエラーに変換
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PhotoSheetError::RateLimited(message));
    }
    Err(PhotoSheetError::HttpFailure {
        status: status.as_u16(),
        message,
    })
}

/// ベースURLにパス要素を追加（要素内の記号はエンコードされる）
pub(crate) fn api_url(base: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| PhotoSheetError::Config(format!("URLが不正です: {} ({})", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| PhotoSheetError::Config(format!("URLが不正です: {}", base)))?
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_encodes_range() {
        let url = api_url(
            "https://sheets.googleapis.com/v4/spreadsheets",
            &["abc", "values", "'シート1'!A5"],
        )
        .unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc/values/"));
        assert!(!s.contains("シート"));
        assert!(s.ends_with("!A5"));
    }

    #[test]
    fn test_api_url_keeps_method_suffix() {
        let url = api_url(
            "https://sheets.googleapis.com/v4/spreadsheets",
            &["abc:batchUpdate"],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc:batchUpdate"
        );
    }
}
