//! 実行結果の集計

use photo_sheet_common::{InvalidFileName, PairingWarning, PhotoType};
use serde::Serialize;

/// 書式エラーのファイル
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidEntry {
    pub file_name: String,
    pub reason: String,
}

impl From<&InvalidFileName> for InvalidEntry {
    fn from(inv: &InvalidFileName) -> Self {
        Self {
            file_name: inv.raw_name.clone(),
            reason: inv.reason.to_string(),
        }
    }
}

/// ハイパーリンク設定に失敗したファイル
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperlinkFailure {
    pub file_name: String,
    pub kind: PhotoType,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// 対象ファイル数
    pub total: usize,
    /// 書き込み予定のP区分の数
    pub planned: usize,
    /// データ行を書き込んだP区分の数（ドライランでは0）
    pub written: usize,
    /// 書き込み対象外（M区分）
    pub skipped: usize,
    pub invalid: Vec<InvalidEntry>,
    pub hyperlink_successes: usize,
    pub hyperlink_failures: Vec<HyperlinkFailure>,
    pub pairing_warnings: Vec<PairingWarning>,
    /// 書き込み位置に関する警告
    pub placement_warnings: Vec<String>,
    pub updated_cells: usize,
    pub updated_rows: usize,
    pub actual_start_row: Option<u32>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.invalid.is_empty() || !self.hyperlink_failures.is_empty()
    }

    /// 集計を表示（失敗したファイル名と理由を含む）
    pub fn print(&self) {
        println!("結果:");
        println!("  対象ファイル: {}件", self.total);
        if self.dry_run {
            println!("  書き込み予定: {}件", self.planned);
        } else {
            println!("  書き込み: {}件", self.written);
        }
        println!("  スキップ（M区分）: {}件", self.skipped);
        println!("  書式エラー: {}件", self.invalid.len());
        println!("  ハイパーリンク成功: {}件", self.hyperlink_successes);
        println!("  ハイパーリンク失敗: {}件", self.hyperlink_failures.len());
        if let Some(row) = self.actual_start_row {
            println!("  書き込み開始行: {}", row);
        }
        if self.updated_cells > 0 {
            println!("  更新セル数: {} / 更新行数: {}", self.updated_cells, self.updated_rows);
        }

        if !self.invalid.is_empty() {
            println!("\n書式エラーのファイル:");
            for entry in &self.invalid {
                println!("  ✗ {}: {}", entry.file_name, entry.reason);
            }
        }

        if !self.hyperlink_failures.is_empty() {
            println!("\nハイパーリンクの設定に失敗したファイル:");
            for failure in &self.hyperlink_failures {
                println!(
                    "  ✗ [{}] {}: {}",
                    failure.kind.to_string().to_uppercase(),
                    failure.file_name,
                    failure.reason
                );
            }
        }

        if !self.pairing_warnings.is_empty() || !self.placement_warnings.is_empty() {
            println!("\n警告:");
            for warning in &self.pairing_warnings {
                println!("  ⚠ {}", warning);
            }
            for warning in &self.placement_warnings {
                println!("  ⚠ {}", warning);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_camel_case() {
        let report = RunReport {
            total: 3,
            written: 2,
            hyperlink_failures: vec![HyperlinkFailure {
                file_name: "002_b_1_g_x_y_M_0.jpg".into(),
                kind: PhotoType::M,
                reason: "HTTP 500".into(),
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["hyperlinkSuccesses"], 0);
        assert_eq!(json["placementWarnings"], serde_json::json!([]));
        assert_eq!(json["hyperlinkFailures"][0]["kind"], "m");
        assert!(report.has_failures());
    }
}
