//! 一括処理
//!
//! 写真一覧 → ファイル名解析 → P/M対応付け → 列解決 → 一括書き込み → ハイパーリンク設定

use crate::config::Config;
use crate::error::{PhotoSheetError, Result};
use crate::google::{PhotoSource, SheetRef, SheetStore};
use crate::report::{HyperlinkFailure, InvalidEntry, RunReport};
use crate::retry::RetryPolicy;
use indicatif::{ProgressBar, ProgressStyle};
use photo_sheet_common::placement::FIRST_DATA_ROW;
use photo_sheet_common::{
    classify, column_letter, generate_statistics, lint_record, next_free_row, pair,
    parse_multiple_files, plan_hyperlinks, plan_writes, resolve_columns, ColumnOccupancy,
    FieldCandidates, FieldName, HyperlinkTarget, LogicalRecord, LookupTables, PairingWarning,
    ParseStatistics, ParseSummary, PhotoFile, PhotoRecord, PhotoType,
};
use serde::Serialize;
use std::time::Duration;

/// 同期処理の設定
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub folder_id: String,
    pub spreadsheet_id: String,
    /// ハイパーリンクを設定するか
    pub hyperlinks: bool,
    /// 書き込まずに計画のみ表示
    pub dry_run: bool,
    pub required_columns: Vec<FieldName>,
    pub candidates: FieldCandidates,
    pub retry: RetryPolicy,
    pub hyperlink_interval: Duration,
    pub show_progress: bool,
}

impl SyncOptions {
    pub fn new(folder_id: impl Into<String>, spreadsheet_id: impl Into<String>, config: &Config) -> Self {
        Self {
            folder_id: folder_id.into(),
            spreadsheet_id: spreadsheet_id.into(),
            hyperlinks: true,
            dry_run: false,
            required_columns: config.required_columns.clone(),
            candidates: FieldCandidates::default(),
            retry: config.retry.into(),
            hyperlink_interval: config.hyperlink_interval(),
            show_progress: true,
        }
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// Driveフォルダの写真をスプレッドシートへ書き込む
pub async fn run_sync<P, S>(
    source: &P,
    store: &S,
    tables: &LookupTables,
    options: &SyncOptions,
) -> Result<RunReport>
where
    P: PhotoSource,
    S: SheetStore,
{
    let retry = &options.retry;
    let mut report = RunReport {
        dry_run: options.dry_run,
        ..Default::default()
    };

    // 1. 写真一覧
    println!("[1/5] 写真一覧を取得中...");
    let folder_id = options.folder_id.as_str();
    let photos = retry
        .run("写真一覧の取得", move || source.list_photos(folder_id))
        .await?;
    println!("✔ {}件のファイルを検出\n", photos.len());

    // 2. ファイル名解析
    println!("[2/5] ファイル名を解析中...");
    let outcome = parse_multiple_files(&photos);
    let summary = outcome.summary();
    report.total = summary.total;
    report.skipped = summary.skipped_count;
    report.invalid = outcome.invalid.iter().map(InvalidEntry::from).collect();
    println!(
        "✔ 有効 {}件 / 書式エラー {}件（成功率 {}%）\n",
        summary.valid_count,
        summary.invalid_count,
        summary.success_rate_text()
    );

    // 3. P/M対応付け
    let classified = classify(&outcome.valid);
    let pairing = pair(&classified);
    report.pairing_warnings = pairing.warnings.clone();

    if classified.p_type.is_empty() {
        return Err(PhotoSheetError::NoTargetFiles(options.folder_id.clone()));
    }

    // 4. 列の解決（書き込み前に必須列を確認）
    println!("[3/5] スプレッドシートの列を確認中...");
    let spreadsheet_id = options.spreadsheet_id.as_str();
    let header = retry
        .run("ヘッダーの取得", move || store.sheet_header(spreadsheet_id))
        .await?;
    let mapping = resolve_columns(&header.header_row, &options.candidates);
    mapping.require(&options.required_columns)?;
    log::debug!("列マッピング: {:?}", mapping);

    let sheet = &header.sheet;
    let mut occupancy = ColumnOccupancy::new();
    for (field, column) in mapping.iter() {
        let letter = column_letter(column);
        let letter_ref = letter.as_str();
        let next = match retry
            .run("列の読み取り", move || store.column_values(sheet, letter_ref))
            .await
        {
            Ok(values) => next_free_row(&values),
            Err(e) => {
                log::warn!("{}列の読み取りに失敗したため2行目から書き込みます: {}", letter, e);
                FIRST_DATA_ROW
            }
        };
        occupancy.insert(field, next);
    }
    println!(
        "✔ シート「{}」: {}列を認識\n",
        sheet.sheet_name,
        mapping.len()
    );

    // 5. データ書き込み
    println!("[4/5] データを書き込み中...");
    let records: Vec<LogicalRecord> = classified
        .p_type
        .iter()
        .map(|p| LogicalRecord::from_primary(p, tables))
        .collect();
    let plan = plan_writes(&mapping, &occupancy, &records);
    report.planned = records.len();
    report.actual_start_row = Some(plan.actual_start_row);

    if options.dry_run {
        println!("（ドライラン）書き込み予定: {}セル", plan.cell_writes.len());
        for write in &plan.cell_writes {
            println!("  {} ← {} ({})", write.cell, write.value, write.field);
        }
        println!();
    } else if plan.is_empty() {
        println!("書き込むセルがありません\n");
    } else {
        let writes = plan.cell_writes.as_slice();
        let result = retry
            .run("一括書き込み", move || store.batch_write(sheet, writes))
            .await?;
        report.written = records.len();
        report.updated_cells = result.updated_cells;
        report.updated_rows = result.updated_rows;

        if let (Some(landed), Some(first)) = (result.first_cell, plan.cell_writes.first()) {
            if landed != first.cell {
                let message = format!(
                    "書き込み位置が計画と異なります（計画 {} / 実際 {}）",
                    first.cell, landed
                );
                log::warn!("{}", message);
                report.placement_warnings.push(message);
            }
        }
        println!(
            "✔ {}行目から{}件を書き込み（{}セル）\n",
            plan.actual_start_row,
            records.len(),
            result.updated_cells
        );
    }

    // 6. ハイパーリンク
    if !options.hyperlinks {
        println!("[5/5] ハイパーリンク設定をスキップ");
        return Ok(report);
    }

    let (Some(part_column), Some(material_column)) = (
        mapping.index(FieldName::PartName),
        mapping.index(FieldName::MaterialName),
    ) else {
        log::warn!("部品名列または素材列がないため、ハイパーリンクを設定しません");
        println!("[5/5] ハイパーリンク設定をスキップ（対象列なし）");
        return Ok(report);
    };

    let anchored = [FieldName::PartName, FieldName::MaterialName];
    for (field, start) in plan.anchor_offsets(&anchored) {
        let message = format!(
            "{}列は{}行目から書き込まれましたが、ハイパーリンクは{}行目を基準に設定されます",
            field.label(),
            start,
            plan.actual_start_row
        );
        log::warn!("{}", message);
        report.placement_warnings.push(message);
    }

    println!("[5/5] ハイパーリンクを設定中...");
    let link_plan = plan_hyperlinks(
        &classified,
        &pairing,
        plan.actual_start_row,
        part_column,
        material_column,
    );

    for error in &link_plan.errors {
        if let PairingWarning::UnpairedMRecord { file_name, .. } = error {
            report.hyperlink_failures.push(HyperlinkFailure {
                file_name: file_name.clone(),
                kind: PhotoType::M,
                reason: error.to_string(),
            });
        }
    }

    if options.dry_run {
        for target in &link_plan.targets {
            println!(
                "  {} ← {} ({})",
                target.cell,
                target.file.name,
                target.display_text.as_deref().unwrap_or("既存の値")
            );
        }
        return Ok(report);
    }

    let bar = progress_bar(link_plan.targets.len(), options.show_progress);
    for (i, target) in link_plan.targets.iter().enumerate() {
        if i > 0 && !options.hyperlink_interval.is_zero() {
            tokio::time::sleep(options.hyperlink_interval).await;
        }
        bar.set_message(target.file.name.clone());

        match link_one(source, store, sheet, target, retry).await {
            Ok(()) => report.hyperlink_successes += 1,
            Err(e) => {
                log::warn!("ハイパーリンク設定に失敗: {}: {}", target.file.name, e);
                report.hyperlink_failures.push(HyperlinkFailure {
                    file_name: target.file.name.clone(),
                    kind: target.kind,
                    reason: e.to_string(),
                });
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    println!(
        "✔ ハイパーリンク: 成功 {}件 / 失敗 {}件\n",
        report.hyperlink_successes,
        report.hyperlink_failures.len()
    );

    Ok(report)
}

/// 1件分のリンク設定（共有リンク取得 → セル設定）
async fn link_one<P, S>(
    source: &P,
    store: &S,
    sheet: &SheetRef,
    target: &HyperlinkTarget,
    retry: &RetryPolicy,
) -> Result<()>
where
    P: PhotoSource,
    S: SheetStore,
{
    let file = &target.file;
    let url = retry
        .run("共有リンクの取得", move || source.share_link(file))
        .await?;

    let url_ref = url.as_str();
    let cell = target.cell;
    let display_text = target.display_text.as_deref();
    let fallback = file.name.as_str();
    retry
        .run("ハイパーリンクの設定", move || {
            store.set_hyperlink(sheet, cell, url_ref, display_text, fallback)
        })
        .await
}

// =============================================
// ローカル解析（parseコマンド）
// =============================================

/// 内容チェックで問題のあったファイル
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintEntry {
    pub file_name: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// ファイル名解析の結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub summary: ParseSummary,
    pub statistics: ParseStatistics,
    pub lint: Vec<LintEntry>,
    pub paired: usize,
    pub pairing_warnings: Vec<PairingWarning>,
}

/// ファイル一覧を解析して統計・内容チェック・対応付けをまとめる
pub fn analyze_names(photos: &[PhotoFile]) -> ParseReport {
    let outcome = parse_multiple_files(photos);

    let lint = outcome
        .valid
        .iter()
        .filter_map(|record| match record {
            PhotoRecord::P(p) => {
                let result = lint_record(p);
                (!result.is_clean()).then(|| LintEntry {
                    file_name: p.source.name.clone(),
                    errors: result.errors,
                    warnings: result.warnings,
                })
            }
            PhotoRecord::M(_) => None,
        })
        .collect();

    let classified = classify(&outcome.valid);
    let pairing = pair(&classified);

    ParseReport {
        summary: outcome.summary(),
        statistics: generate_statistics(&outcome),
        lint,
        paired: pairing.pairs.len(),
        pairing_warnings: pairing.warnings,
    }
}
