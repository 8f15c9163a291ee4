use clap::Parser;
use env_logger::Env;
use photo_sheet_rust::{cli, config, error, google, lookup, pipeline, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use google::{DriveClient, GoogleClient, SheetsClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::init_from_env(Env::default().default_filter_or(level));

    let config = Config::load()?;

    match cli.command {
        Commands::Parse { folder, json } => {
            println!("📸 photo-sheet - ファイル名解析\n");

            println!("[1/2] 写真をスキャン中...");
            let photos = scanner::scan_folder(&folder, &config.photo_extensions)?;
            println!("✔ {}枚の写真を検出\n", photos.len());

            println!("[2/2] ファイル名を解析中...");
            let report = pipeline::analyze_names(&photos);
            let stats = &report.statistics;
            println!("✔ 解析完了\n");

            println!("結果:");
            println!("  総ファイル数: {}", stats.total_files);
            println!("  有効: {}", stats.valid_files);
            println!("  書式エラー: {}", stats.invalid_files);
            println!("  M区分（書き込み対象外）: {}", report.summary.skipped_count);
            println!("  成功率: {}%", stats.success_rate);
            println!("  P/M対応付け: {}組", report.paired);
            println!("  部品名: {}種類", stats.part_names.len());
            println!("  素材ID: {}", stats.material_ids.join(", "));
            println!("  加工ID: {}", stats.process_ids.join(", "));

            if !stats.errors.is_empty() {
                println!("\n書式エラーのファイル（{}）:", photo_sheet_common::file_name::REQUIRED_FORMAT);
                for e in &stats.errors {
                    println!("  ✗ {}: {}", e.file_name, e.error);
                }
            }

            if !report.lint.is_empty() {
                println!("\n内容チェック:");
                for entry in &report.lint {
                    for msg in &entry.errors {
                        println!("  ✗ {}: {}", entry.file_name, msg);
                    }
                    for msg in &entry.warnings {
                        println!("  ⚠ {}: {}", entry.file_name, msg);
                    }
                }
            }

            for warning in &report.pairing_warnings {
                println!("  ⚠ {}", warning);
            }

            if let Some(path) = json {
                let content = serde_json::to_string_pretty(&report)?;
                std::fs::write(&path, content)?;
                println!("\n✔ 結果を保存: {}", path.display());
            }

            println!("\n✅ 解析完了");
        }

        Commands::Lookup { material, process, limit } => {
            println!("📋 photo-sheet - 対応表確認\n");

            if material.is_none() && process.is_none() {
                return Err(error::PhotoSheetError::Config(
                    "--material または --process を指定してください".into(),
                ));
            }

            if let Some(path) = material {
                let table = lookup::load_material_table(&path)?;
                println!("素材ID対応表: {}件", table.len());
                for (id, entry) in table.iter().take(limit) {
                    println!("  {} → {}（{}）", id, entry.name, entry.category);
                }
                println!();
            }

            if let Some(path) = process {
                let table = lookup::load_process_table(&path)?;
                println!("加工ID対応表: {}件", table.len());
                for (id, name) in table.iter().take(limit) {
                    println!("  {} → {}", id, name);
                }
                println!();
            }

            println!("✅ 読み込み完了");
        }

        Commands::Sync { folder, sheet, material, process, no_hyperlinks, dry_run, report } => {
            println!("🚀 photo-sheet - スプレッドシート書き込み\n");

            println!("対応表を読み込み中...");
            let tables = lookup::load_tables(&material, &process)?;
            println!("✔ 対応表の読み込み完了\n");

            let http = reqwest::Client::new();
            let token = google::resolve_access_token(&config, &http).await?;
            let client = GoogleClient::with_http(http, token);
            let drive = DriveClient::new(client.clone(), config.photo_extensions.clone());
            let sheets = SheetsClient::new(client);

            let mut options = pipeline::SyncOptions::new(folder, sheet, &config);
            options.hyperlinks = !no_hyperlinks;
            options.dry_run = dry_run;

            let result = pipeline::run_sync(&drive, &sheets, &tables, &options).await?;
            result.print();

            if let Some(path) = report {
                let content = serde_json::to_string_pretty(&result)?;
                std::fs::write(&path, content)?;
                println!("\n✔ 結果を保存: {}", path.display());
            }

            if dry_run {
                println!("\n✅ ドライラン完了（書き込みなし）");
            } else if result.has_failures() {
                println!("\n⚠ 一部のファイルで失敗がありました");
            } else {
                println!("\n✅ 完了");
            }
        }

        Commands::Config { set_refresh_token, set_client, hyperlink_interval, show } => {
            let mut config = config;

            if let Some(token) = set_refresh_token {
                config.set_refresh_token(token)?;
                println!("✔ リフレッシュトークンを設定しました");
            }

            if let Some(pair) = set_client {
                config.set_client(&pair)?;
                println!("✔ クライアント情報を設定しました");
            }

            if let Some(ms) = hyperlink_interval {
                config.set_hyperlink_interval(ms)?;
                println!("✔ ハイパーリンク設定の間隔を{}msにしました", ms);
            }

            if show {
                let status = |v: Option<String>| if v.is_some() { "設定済み" } else { "未設定" };
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  クライアントID: {}", status(config.get_client_id()));
                println!("  クライアントシークレット: {}", status(config.get_client_secret()));
                println!("  リフレッシュトークン: {}", status(config.get_refresh_token()));
                println!("  アクセストークン: {}", status(config.get_access_token()));
                println!("  対象拡張子: {}", config.photo_extensions.join(", "));
                println!(
                    "  必須列: {}",
                    config
                        .required_columns
                        .iter()
                        .map(|f| f.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                println!("  ハイパーリンク間隔: {}ms", config.hyperlink_interval_ms);
                println!(
                    "  再試行: 最大{}回（{}ms × {}^n）",
                    config.retry.max_attempts, config.retry.base_delay_ms, config.retry.factor
                );
            }
        }
    }

    Ok(())
}
