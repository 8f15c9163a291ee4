//! ファイル名パーサー
//!
//! 書式: `番号_部品名_重量_単位_素材ID_加工ID_写真区分_特記事項.拡張子`
//! 例: `001_ねじ_10.1_g_st01_pr01_P_0.jpg`
//!
//! - 番号はP/Mの対応付けにのみ使用
//! - 写真区分がMの場合は書き込み対象外（対応付け用の最小情報のみ保持）
//! - 特記事項は必須（"0" または "1"）

use crate::error::ParseError;
use crate::types::{
    IllustrationRecord, InvalidFileName, NoteFlag, PhotoFile, PhotoRecord, PhotoType,
    PrimaryRecord, WeightUnit,
};
use serde::Serialize;

/// ファイル名の区切り文字
pub const FIELD_DELIMITER: char = '_';

/// 必要な項目数
pub const FIELD_COUNT: usize = 8;

/// 書式の説明（エラー表示用）
pub const REQUIRED_FORMAT: &str = "番号_部品名_重量_単位_素材ID_加工ID_写真区分_特記事項.拡張子";

/// 拡張子を除いたファイル名
///
/// 最後の `.` 以降を拡張子とみなす。`.` がなければ全体を返す。
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) => &file_name[..pos],
        None => file_name,
    }
}

/// ファイル名を解析
///
/// # Arguments
/// * `file` - 解析対象の写真ファイル（名前以外はそのまま結果に保持）
///
/// # Returns
/// * `Ok(PhotoRecord::P)` - P区分として全項目が妥当
/// * `Ok(PhotoRecord::M)` - M区分（書き込み対象外、対応付け用）
/// * `Err(InvalidFileName)` - 書式エラー（部分的な結果は返さない）
///
/// # Examples
/// ```
/// use photo_sheet_common::{parse_file, PhotoFile, PhotoRecord};
///
/// let record = parse_file(&PhotoFile::named("001_bolt_10.5_g_st01_pr01_P_1.jpg")).unwrap();
/// match record {
///     PhotoRecord::P(p) => assert_eq!(p.part_name, "bolt"),
///     PhotoRecord::M(_) => unreachable!(),
/// }
/// ```
pub fn parse_file(file: &PhotoFile) -> Result<PhotoRecord, InvalidFileName> {
    let parts: Vec<&str> = strip_extension(&file.name).split(FIELD_DELIMITER).collect();

    parse_parts(&parts, file).map_err(|reason| InvalidFileName {
        reason,
        raw_name: file.name.clone(),
        raw_parts: parts.iter().map(|s| s.to_string()).collect(),
        source: file.clone(),
    })
}

/// 名前だけからファイル名を解析
pub fn parse(file_name: &str) -> Result<PhotoRecord, InvalidFileName> {
    parse_file(&PhotoFile::named(file_name))
}

fn parse_parts(parts: &[&str], file: &PhotoFile) -> Result<PhotoRecord, ParseError> {
    if parts.len() != FIELD_COUNT {
        return Err(ParseError::WrongFieldCount {
            expected: FIELD_COUNT,
            got: parts.len(),
        });
    }

    let (number, part_name, weight, unit, material_id, process_id, photo_type, notes) = (
        parts[0], parts[1], parts[2], parts[3], parts[4], parts[5], parts[6], parts[7],
    );

    let photo_type =
        PhotoType::parse(photo_type).ok_or_else(|| ParseError::BadPhotoType(photo_type.into()))?;

    let sequence_number: u32 = number
        .parse()
        .map_err(|_| ParseError::BadSequenceNumber(number.into()))?;

    if photo_type == PhotoType::M {
        return Ok(PhotoRecord::M(IllustrationRecord {
            sequence_number,
            part_name: part_name.to_string(),
            source: file.clone(),
        }));
    }

    // 特記事項は必須項目
    if notes.is_empty() {
        return Err(ParseError::MissingOrBadNotes(String::new()));
    }

    let weight_value: f64 = weight
        .parse()
        .ok()
        .filter(|w: &f64| w.is_finite() && *w >= 0.0)
        .ok_or_else(|| ParseError::BadWeight(weight.into()))?;

    let unit = WeightUnit::parse(unit).ok_or_else(|| ParseError::BadUnit(unit.into()))?;

    let note_flag =
        NoteFlag::parse(notes).ok_or_else(|| ParseError::MissingOrBadNotes(notes.into()))?;

    Ok(PhotoRecord::P(PrimaryRecord {
        sequence_number,
        part_name: part_name.to_string(),
        weight: weight_value,
        weight_text: weight.to_string(),
        unit,
        material_id: material_id.to_string(),
        process_id: process_id.to_string(),
        note_flag,
        source: file.clone(),
    }))
}

/// 一括解析の結果
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// 入力順の有効レコード（P/M両方）
    pub valid: Vec<PhotoRecord>,
    /// 入力順の書式エラー
    pub invalid: Vec<InvalidFileName>,
}

/// 一括解析の集計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseSummary {
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// 有効だが書き込み対象外（M区分）
    pub skipped_count: usize,
}

impl ParseSummary {
    /// 成功率（%）
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.valid_count as f64 / self.total as f64 * 100.0
    }

    /// 成功率（小数1桁の文字列）
    pub fn success_rate_text(&self) -> String {
        format!("{:.1}", self.success_rate())
    }
}

impl ParseOutcome {
    /// 集計（保持しているレコードから毎回導出）
    pub fn summary(&self) -> ParseSummary {
        ParseSummary {
            total: self.valid.len() + self.invalid.len(),
            valid_count: self.valid.len(),
            invalid_count: self.invalid.len(),
            skipped_count: self.valid.iter().filter(|r| r.should_skip()).count(),
        }
    }

    /// 書き込み対象のP区分
    pub fn primary_records(&self) -> impl Iterator<Item = &PrimaryRecord> {
        self.valid.iter().filter_map(|r| match r {
            PhotoRecord::P(p) => Some(p),
            PhotoRecord::M(_) => None,
        })
    }
}

/// 複数ファイルを一括解析
///
/// 入力順を保ったまま有効/無効に振り分ける。
/// 1件の書式エラーで全体を中断しない。
pub fn parse_multiple_files(files: &[PhotoFile]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for file in files {
        match parse_file(file) {
            Ok(record) => outcome.valid.push(record),
            Err(invalid) => outcome.invalid.push(invalid),
        }
    }

    outcome
}

/// エラーファイルの一覧項目
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileError {
    pub file_name: String,
    pub error: String,
}

/// 解析統計
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStatistics {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub success_rate: String,
    pub part_names: Vec<String>,
    pub units: Vec<String>,
    pub material_ids: Vec<String>,
    pub process_ids: Vec<String>,
    pub photo_types: Vec<String>,
    pub errors: Vec<FileError>,
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// 解析統計を生成（出現順を保持した重複なし一覧）
pub fn generate_statistics(outcome: &ParseOutcome) -> ParseStatistics {
    let summary = outcome.summary();
    let mut stats = ParseStatistics {
        total_files: summary.total,
        valid_files: summary.valid_count,
        invalid_files: summary.invalid_count,
        success_rate: summary.success_rate_text(),
        ..Default::default()
    };

    for record in &outcome.valid {
        push_unique(&mut stats.part_names, record.part_name());
        push_unique(&mut stats.photo_types, &record.photo_type().to_string());
        if let PhotoRecord::P(p) = record {
            push_unique(&mut stats.units, p.unit.as_str());
            push_unique(&mut stats.material_ids, &p.material_id);
            push_unique(&mut stats.process_ids, &p.process_id);
        }
    }

    stats.errors = outcome
        .invalid
        .iter()
        .map(|inv| FileError {
            file_name: inv.raw_name.clone(),
            error: inv.reason.to_string(),
        })
        .collect();

    stats
}

/// レコード内容のチェック結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordLint {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RecordLint {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// P区分レコードの内容チェック
///
/// 解析の成否は変えない。部品名の空欄・重量0以下をエラー、
/// IDの英数字・ハイフン以外の文字を警告として返す。
pub fn lint_record(record: &PrimaryRecord) -> RecordLint {
    let mut lint = RecordLint::default();

    if record.part_name.trim().is_empty() {
        lint.errors.push("部品名が空です".into());
    }
    if record.weight <= 0.0 {
        lint.errors.push("重量は正の数値である必要があります".into());
    }
    if !is_plain_id(&record.material_id) {
        lint.warnings.push(format!(
            "素材ID \"{}\" に特殊文字が含まれています",
            record.material_id
        ));
    }
    if !is_plain_id(&record.process_id) {
        lint.warnings.push(format!(
            "加工ID \"{}\" に特殊文字が含まれています",
            record.process_id
        ));
    }

    lint
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_p(name: &str) -> PrimaryRecord {
        match parse(name) {
            Ok(PhotoRecord::P(p)) => p,
            other => panic!("P区分として解析できない: {} -> {:?}", name, other),
        }
    }

    fn expect_err(name: &str) -> ParseError {
        match parse(name) {
            Err(inv) => inv.reason,
            Ok(r) => panic!("エラーになるべき: {} -> {:?}", name, r),
        }
    }

    // =============================================
    // parse テスト
    // =============================================

    #[test]
    fn test_parse_valid_p_record() {
        let p = expect_p("001_bolt_10.5_g_st01_pr01_P_1.jpg");
        assert_eq!(p.sequence_number, 1);
        assert_eq!(p.part_name, "bolt");
        assert_eq!(p.weight, 10.5);
        assert_eq!(p.weight_text, "10.5");
        assert_eq!(p.unit, WeightUnit::G);
        assert_eq!(p.material_id, "st01");
        assert_eq!(p.process_id, "pr01");
        assert_eq!(p.note_flag, NoteFlag::Present);
        assert_eq!(p.weight_in_grams(), 10.5);
        assert!((p.weight_in_kilograms() - 0.0105).abs() < 1e-12);
        assert_eq!(p.notes_text(), "あり");
    }

    #[test]
    fn test_parse_kilogram_conversion() {
        let p = expect_p("002_フレーム_1.25_KG_al02_pr03_p_0.png");
        assert_eq!(p.unit, WeightUnit::Kg);
        assert_eq!(p.weight_in_grams(), 1250.0);
        assert_eq!(p.weight_in_kilograms(), 1.25);
        assert_eq!(p.notes_text(), "-");
    }

    #[test]
    fn test_grams_equal_kilograms_times_1000() {
        for name in [
            "1_a_0_g_x_y_P_0.jpg",
            "2_a_7.25_g_x_y_P_0.jpg",
            "3_a_0.4_kg_x_y_P_1.jpg",
            "4_a_12000_kg_x_y_P_1.jpg",
        ] {
            let p = expect_p(name);
            let diff = p.weight_in_grams() - p.weight_in_kilograms() * 1000.0;
            assert!(diff.abs() < 1e-9 * p.weight_in_grams().max(1.0), "{}", name);
            if p.unit == WeightUnit::G {
                assert_eq!(p.weight_in_grams(), p.weight);
            }
        }
    }

    #[test]
    fn test_weight_text_kept_verbatim() {
        let p = expect_p("005_nut_10.50_g_st01_pr01_P_0.jpg");
        assert_eq!(p.weight, 10.5);
        assert_eq!(p.weight_text, "10.50");
    }

    #[test]
    fn test_parse_bad_photo_type() {
        assert!(matches!(
            expect_err("001_bolt_10.5_g_st01_pr01_X_1.jpg"),
            ParseError::BadPhotoType(t) if t == "X"
        ));
    }

    #[test]
    fn test_parse_wrong_field_count() {
        assert_eq!(
            expect_err("a_b_c.jpg"),
            ParseError::WrongFieldCount { expected: 8, got: 3 }
        );
    }

    #[test]
    fn test_parse_too_many_fields() {
        assert_eq!(
            expect_err("001_hex_bolt_10.5_g_st01_pr01_P_1.jpg"),
            ParseError::WrongFieldCount { expected: 8, got: 9 }
        );
    }

    #[test]
    fn test_parse_m_record_short_circuits() {
        // M区分は重量・単位・特記事項を検証しない
        match parse("003_washer_abc_lb_st01_pr01_M_.jpg") {
            Ok(PhotoRecord::M(m)) => {
                assert_eq!(m.sequence_number, 3);
                assert_eq!(m.part_name, "washer");
            }
            other => panic!("M区分になるべき: {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_notes() {
        assert_eq!(
            expect_err("001_bolt_10.5_g_st01_pr01_P_.jpg"),
            ParseError::MissingOrBadNotes(String::new())
        );
    }

    #[test]
    fn test_parse_bad_notes_value() {
        assert!(matches!(
            expect_err("001_bolt_10.5_g_st01_pr01_P_2.jpg"),
            ParseError::MissingOrBadNotes(n) if n == "2"
        ));
    }

    #[test]
    fn test_parse_bad_weight() {
        assert!(matches!(expect_err("001_bolt_abc_g_st01_pr01_P_0.jpg"), ParseError::BadWeight(_)));
        assert!(matches!(expect_err("001_bolt_-1_g_st01_pr01_P_0.jpg"), ParseError::BadWeight(_)));
        assert!(matches!(expect_err("001_bolt_NaN_g_st01_pr01_P_0.jpg"), ParseError::BadWeight(_)));
        assert!(matches!(expect_err("001_bolt_inf_g_st01_pr01_P_0.jpg"), ParseError::BadWeight(_)));
    }

    #[test]
    fn test_parse_bad_unit() {
        assert!(matches!(
            expect_err("001_bolt_10_lb_st01_pr01_P_0.jpg"),
            ParseError::BadUnit(u) if u == "lb"
        ));
    }

    #[test]
    fn test_parse_bad_sequence_number() {
        assert!(matches!(
            expect_err("A1_bolt_10_g_st01_pr01_P_0.jpg"),
            ParseError::BadSequenceNumber(_)
        ));
    }

    #[test]
    fn test_invalid_keeps_raw_parts() {
        let inv = parse("a_b_c.jpg").unwrap_err();
        assert_eq!(inv.raw_name, "a_b_c.jpg");
        assert_eq!(inv.raw_parts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("a.b.jpg"), "a.b");
        assert_eq!(strip_extension("noext"), "noext");
    }

    // =============================================
    // 一括解析テスト
    // =============================================

    #[test]
    fn test_parse_multiple_files_partition_in_order() {
        let files: Vec<PhotoFile> = [
            "001_a_1_g_s_p_P_0.jpg",
            "bad.jpg",
            "001_a_1_g_s_p_M_0.jpg",
            "002_b_2_kg_s_p_P_1.jpg",
            "x_y_z.jpg",
        ]
        .into_iter()
        .map(PhotoFile::named)
        .collect();

        let outcome = parse_multiple_files(&files);
        let summary = outcome.summary();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.valid_count, 3);
        assert_eq!(summary.invalid_count, 2);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.success_rate_text(), "60.0");

        assert_eq!(outcome.invalid[0].raw_name, "bad.jpg");
        assert_eq!(outcome.invalid[1].raw_name, "x_y_z.jpg");
        let parts: Vec<_> = outcome.primary_records().map(|p| p.part_name.as_str()).collect();
        assert_eq!(parts, vec!["a", "b"]);
    }

    #[test]
    fn test_success_rate_one_decimal() {
        let summary = ParseSummary {
            total: 3,
            valid_count: 2,
            invalid_count: 1,
            skipped_count: 0,
        };
        assert_eq!(summary.success_rate_text(), "66.7");
        assert_eq!(ParseSummary::default().success_rate_text(), "0.0");
    }

    #[test]
    fn test_generate_statistics() {
        let files: Vec<PhotoFile> = [
            "001_bolt_1_g_st01_pr01_P_0.jpg",
            "002_bolt_2_kg_st02_pr01_P_1.jpg",
            "002_bolt_2_kg_st02_pr01_M_1.jpg",
            "oops.jpg",
        ]
        .into_iter()
        .map(PhotoFile::named)
        .collect();

        let stats = generate_statistics(&parse_multiple_files(&files));
        assert_eq!(stats.part_names, vec!["bolt"]);
        assert_eq!(stats.units, vec!["g", "kg"]);
        assert_eq!(stats.material_ids, vec!["st01", "st02"]);
        assert_eq!(stats.process_ids, vec!["pr01"]);
        assert_eq!(stats.photo_types, vec!["p", "m"]);
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(stats.errors[0].file_name, "oops.jpg");
        assert_eq!(stats.success_rate, "75.0");
    }

    // =============================================
    // lint テスト
    // =============================================

    #[test]
    fn test_lint_clean_record() {
        assert!(lint_record(&expect_p("001_bolt_1_g_st-01_pr01_P_0.jpg")).is_clean());
    }

    #[test]
    fn test_lint_zero_weight_and_special_ids() {
        let lint = lint_record(&expect_p("001_bolt_0_g_st#01_pr 01_P_0.jpg"));
        assert_eq!(lint.errors.len(), 1);
        assert_eq!(lint.warnings.len(), 2);
        assert!(lint.warnings[0].contains("st#01"));
    }
}
