use crate::error::{PhotoSheetError, Result};
use photo_sheet_common::FieldName;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 再試行の設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub factor: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            factor: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    /// 対象にする写真の拡張子（小文字）
    pub photo_extensions: Vec<String>,
    /// 書き込みに必須の列
    pub required_columns: Vec<FieldName>,
    /// ハイパーリンク設定の間隔（API制限対策）
    pub hyperlink_interval_ms: u64,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PhotoSheetError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-sheet").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            access_token: None,
            photo_extensions: ["jpg", "jpeg", "png", "heic"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            required_columns: vec![FieldName::PartName, FieldName::MaterialName],
            hyperlink_interval_ms: 500,
            retry: RetryConfig::default(),
        }
    }

    pub fn hyperlink_interval(&self) -> Duration {
        Duration::from_millis(self.hyperlink_interval_ms)
    }

    /// 拡張子が対象か（大文字小文字を区別しない）
    pub fn is_photo_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.photo_extensions.iter().any(|e| e.to_lowercase() == ext)
    }

    /// 環境変数を優先して値を取得
    fn env_or(name: &str, value: &Option<String>) -> Option<String> {
        std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| value.clone())
    }

    pub fn get_access_token(&self) -> Option<String> {
        Self::env_or("GOOGLE_ACCESS_TOKEN", &self.access_token)
    }

    pub fn get_client_id(&self) -> Option<String> {
        Self::env_or("GOOGLE_CLIENT_ID", &self.client_id)
    }

    pub fn get_client_secret(&self) -> Option<String> {
        Self::env_or("GOOGLE_CLIENT_SECRET", &self.client_secret)
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        Self::env_or("GOOGLE_REFRESH_TOKEN", &self.refresh_token)
    }

    pub fn set_refresh_token(&mut self, token: String) -> Result<()> {
        self.refresh_token = Some(token);
        self.save()
    }

    /// "ID:SECRET" 形式でクライアント情報を設定
    pub fn set_client(&mut self, pair: &str) -> Result<()> {
        let (id, secret) = pair.split_once(':').ok_or_else(|| {
            PhotoSheetError::Config("クライアント情報は ID:SECRET の形式で指定してください".into())
        })?;
        self.client_id = Some(id.trim().to_string());
        self.client_secret = Some(secret.trim().to_string());
        self.save()
    }

    pub fn set_hyperlink_interval(&mut self, ms: u64) -> Result<()> {
        self.hyperlink_interval_ms = ms;
        self.save()
    }
}
