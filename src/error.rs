use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoSheetError {
    #[error(transparent)]
    Common(#[from] photo_sheet_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("Google認証情報が設定されていません。`photo-sheet config --set-refresh-token TOKEN --set-client ID:SECRET` で設定するか、GOOGLE_ACCESS_TOKEN を指定してください")]
    MissingCredentials,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("対応表の読み込みに失敗: {0}")]
    LookupTable(String),

    #[error("通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API呼び出しエラー（HTTP {status}）: {message}")]
    HttpFailure { status: u16, message: String },

    #[error("APIのリクエスト制限に達しました: {0}")]
    RateLimited(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("書き込み対象のファイル（P区分）がありません: {0}")]
    NoTargetFiles(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl PhotoSheetError {
    /// 再試行で回復しうるエラーか
    pub fn is_transient(&self) -> bool {
        match self {
            PhotoSheetError::Http(e) => !e.is_decode(),
            PhotoSheetError::RateLimited(_) => true,
            PhotoSheetError::HttpFailure { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<photo_sheet_common::ColumnError> for PhotoSheetError {
    fn from(e: photo_sheet_common::ColumnError) -> Self {
        PhotoSheetError::Common(e.into())
    }
}

impl From<photo_sheet_common::MappingError> for PhotoSheetError {
    fn from(e: photo_sheet_common::MappingError) -> Self {
        PhotoSheetError::Common(e.into())
    }
}

pub type Result<T> = std::result::Result<T, PhotoSheetError>;
