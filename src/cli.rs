use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-sheet")]
#[command(about = "部品写真ファイル名解析・スプレッドシート書き込みツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ローカルフォルダの写真ファイル名を解析（書き込みなし）
    Parse {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 解析結果をJSONで保存
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// 対応表ファイルを読み込んで内容を確認
    Lookup {
        /// 素材ID対応表（xlsx/xls/csv）
        #[arg(long)]
        material: Option<PathBuf>,

        /// 加工ID対応表（xlsx/xls/csv）
        #[arg(long)]
        process: Option<PathBuf>,

        /// 表示件数
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Driveフォルダの写真をスプレッドシートへ書き込む
    Sync {
        /// DriveフォルダID
        #[arg(long, required = true)]
        folder: String,

        /// スプレッドシートID
        #[arg(long, required = true)]
        sheet: String,

        /// 素材ID対応表（xlsx/xls/csv）
        #[arg(long, required = true)]
        material: PathBuf,

        /// 加工ID対応表（xlsx/xls/csv）
        #[arg(long, required = true)]
        process: PathBuf,

        /// ハイパーリンクを設定しない
        #[arg(long)]
        no_hyperlinks: bool,

        /// 書き込まずに予定を表示
        #[arg(long)]
        dry_run: bool,

        /// 実行結果をJSONで保存
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// リフレッシュトークンを設定
        #[arg(long)]
        set_refresh_token: Option<String>,

        /// OAuthクライアントを設定（ID:SECRET）
        #[arg(long)]
        set_client: Option<String>,

        /// ハイパーリンク設定の間隔（ミリ秒）
        #[arg(long)]
        hyperlink_interval: Option<u64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
