//! アクセストークンの取得
//!
//! 対話的な認可フローは持たない。アクセストークンが指定されていればそれを使い、
//! なければリフレッシュトークンから1回だけ発行する。

use crate::config::Config;
use crate::error::{PhotoSheetError, Result};
use serde::Deserialize;

pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// アクセストークンを決定
pub async fn resolve_access_token(config: &Config, http: &reqwest::Client) -> Result<String> {
    if let Some(token) = config.get_access_token() {
        log::debug!("指定済みのアクセストークンを使用します");
        return Ok(token);
    }

    let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
        config.get_client_id(),
        config.get_client_secret(),
        config.get_refresh_token(),
    ) else {
        return Err(PhotoSheetError::MissingCredentials);
    };

    refresh_access_token(http, TOKEN_ENDPOINT, &client_id, &client_secret, &refresh_token).await
}

/// リフレッシュトークンからアクセストークンを発行
pub async fn refresh_access_token(
    http: &reqwest::Client,
    endpoint: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<String> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let response = http.post(endpoint).form(&params).send().await?;
    let response = super::check_status(response).await?;
    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| PhotoSheetError::ApiParse(format!("トークン応答: {}", e)))?;

    if let Some(secs) = token.expires_in {
        log::debug!("アクセストークンを発行しました（有効期限 {}秒）", secs);
    }
    Ok(token.access_token)
}
