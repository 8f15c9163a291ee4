//! Google Drive API（写真一覧・共有リンク）

use super::{api_url, GoogleClient, PhotoSource};
use crate::error::{PhotoSheetError, Result};
use chrono::{DateTime, Utc};
use photo_sheet_common::PhotoFile;
use serde::Deserialize;
use serde_json::json;

pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

const LIST_FIELDS: &str = "nextPageToken,files(id,name,size,modifiedTime,webViewLink)";
const GET_FIELDS: &str = "id,name,webViewLink,permissions(id,type,role)";
const PAGE_SIZE: &str = "1000";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    /// Drive APIは文字列で返す
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    web_view_link: Option<String>,
    #[serde(default)]
    permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize)]
struct Permission {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl From<DriveFile> for PhotoFile {
    fn from(f: DriveFile) -> Self {
        PhotoFile {
            id: f.id,
            name: f.name,
            size: f.size.and_then(|s| s.parse().ok()).unwrap_or(0),
            modified_time: f.modified_time,
            web_view_link: f.web_view_link,
        }
    }
}

/// 閲覧リンクがない場合のURL
pub fn fallback_view_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

/// 拡張子が対象か（大文字小文字を区別しない）
fn has_extension(name: &str, extensions: &[String]) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn parse_value<T: serde::de::DeserializeOwned>(value: serde_json::Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| PhotoSheetError::ApiParse(format!("{}: {}", what, e)))
}

pub struct DriveClient {
    client: GoogleClient,
    extensions: Vec<String>,
}

impl DriveClient {
    pub fn new(client: GoogleClient, extensions: Vec<String>) -> Self {
        Self { client, extensions }
    }

    async fn get_file(&self, file_id: &str) -> Result<DriveFile> {
        let mut url = api_url(DRIVE_FILES_URL, &[file_id])?;
        url.query_pairs_mut().append_pair("fields", GET_FIELDS);
        parse_value(self.client.get_json(url).await?, "ファイル情報")
    }

    async fn grant_anyone_reader(&self, file_id: &str) -> Result<()> {
        let url = api_url(DRIVE_FILES_URL, &[file_id, "permissions"])?;
        self.client
            .post_json(url, &json!({ "role": "reader", "type": "anyone" }))
            .await?;
        log::info!("リンク共有を設定しました: {}", file_id);
        Ok(())
    }
}

impl PhotoSource for DriveClient {
    async fn list_photos(&self, folder_id: &str) -> Result<Vec<PhotoFile>> {
        let query = format!(
            "'{}' in parents and trashed=false",
            folder_id.replace('\'', "\\'")
        );
        let mut photos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = api_url(DRIVE_FILES_URL, &[])?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", &query)
                    .append_pair("fields", LIST_FIELDS)
                    .append_pair("orderBy", "name")
                    .append_pair("pageSize", PAGE_SIZE);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let list: FileList = parse_value(self.client.get_json(url).await?, "ファイル一覧")?;
            photos.extend(
                list.files
                    .into_iter()
                    .filter(|f| has_extension(&f.name, &self.extensions))
                    .map(PhotoFile::from),
            );

            match list.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        log::debug!("フォルダ {} の写真: {}件", folder_id, photos.len());
        Ok(photos)
    }

    async fn share_link(&self, file: &PhotoFile) -> Result<String> {
        let mut info = self.get_file(&file.id).await?;

        let shared = info
            .permissions
            .iter()
            .any(|p| p.kind == "anyone" && (p.role == "reader" || p.role == "writer"));
        if !shared {
            self.grant_anyone_reader(&file.id).await?;
            info = self.get_file(&file.id).await?;
        }

        Ok(info
            .web_view_link
            .unwrap_or_else(|| fallback_view_link(&file.id)))
    }
}
