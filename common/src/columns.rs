//! 列マッピング
//!
//! スプレッドシートの1行目（列順・列の有無は任意）から、
//! 論理フィールド → 物理列番号 を解決する。

use crate::error::{ColumnError, Error, Result};
use crate::normalize::{header_contains, header_matches};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 書き込み対象の論理フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FileName,
    PartName,
    WeightInGrams,
    WeightInKilograms,
    MaterialId,
    ProcessId,
    MaterialName,
    MaterialCategory,
    ProcessName,
    NotesText,
    OriginalUnit,
}

impl FieldName {
    pub const ALL: [FieldName; 11] = [
        FieldName::FileName,
        FieldName::PartName,
        FieldName::WeightInGrams,
        FieldName::WeightInKilograms,
        FieldName::MaterialId,
        FieldName::ProcessId,
        FieldName::MaterialName,
        FieldName::MaterialCategory,
        FieldName::ProcessName,
        FieldName::NotesText,
        FieldName::OriginalUnit,
    ];

    /// 識別子（設定ファイル・ログ用）
    pub fn key(&self) -> &'static str {
        match self {
            FieldName::FileName => "fileName",
            FieldName::PartName => "partName",
            FieldName::WeightInGrams => "weightInGrams",
            FieldName::WeightInKilograms => "weightInKilograms",
            FieldName::MaterialId => "materialId",
            FieldName::ProcessId => "processId",
            FieldName::MaterialName => "materialName",
            FieldName::MaterialCategory => "materialCategory",
            FieldName::ProcessName => "processName",
            FieldName::NotesText => "notesText",
            FieldName::OriginalUnit => "originalUnit",
        }
    }

    /// 代表的な列名
    pub fn label(&self) -> &'static str {
        default_candidates(*self)[0]
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(s) || f.label() == s)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// 既定の列名候補
pub fn default_candidates(field: FieldName) -> &'static [&'static str] {
    match field {
        FieldName::FileName => &["ファイル名"],
        FieldName::PartName => &["構成部品", "部品名"],
        FieldName::WeightInGrams => &["重量[g]", "重量(g)"],
        FieldName::WeightInKilograms => &["重量[kg]", "重量(kg)"],
        FieldName::MaterialId => &["素材ID"],
        FieldName::ProcessId => &["加工ID"],
        FieldName::MaterialName => &["素材", "素材名"],
        FieldName::MaterialCategory => &["素材区分"],
        FieldName::ProcessName => &["加工方法", "加工方法名"],
        FieldName::NotesText => &["特記事項"],
        FieldName::OriginalUnit => &["元の単位"],
    }
}

/// フィールドごとの列名候補
#[derive(Debug, Clone)]
pub struct FieldCandidates {
    names: BTreeMap<FieldName, Vec<String>>,
    /// 部分一致を許すフィールド
    contains: Vec<FieldName>,
}

impl Default for FieldCandidates {
    fn default() -> Self {
        let names = FieldName::ALL
            .iter()
            .map(|&f| {
                let list = default_candidates(f).iter().map(|s| s.to_string()).collect();
                (f, list)
            })
            .collect();
        Self {
            names,
            contains: vec![FieldName::ProcessName],
        }
    }
}

impl FieldCandidates {
    /// 候補なし（個別に追加して使う）
    pub fn empty() -> Self {
        Self {
            names: BTreeMap::new(),
            contains: Vec::new(),
        }
    }

    pub fn with(mut self, field: FieldName, names: &[&str]) -> Self {
        self.names
            .insert(field, names.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn allow_contains(mut self, field: FieldName) -> Self {
        if !self.contains.contains(&field) {
            self.contains.push(field);
        }
        self
    }

    fn matches(&self, field: FieldName, cell: &str) -> bool {
        let Some(names) = self.names.get(&field) else {
            return false;
        };
        let partial = self.contains.contains(&field);
        names
            .iter()
            .any(|name| header_matches(cell, name) || (partial && header_contains(cell, name)))
    }
}

/// 論理フィールド → 列番号（0始まり）
///
/// 見つからないフィールドは含まない（`index` は None、`raw_index` は -1）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    columns: BTreeMap<FieldName, usize>,
}

impl ColumnMapping {
    pub fn index(&self, field: FieldName) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// -1 を「列なし」とする表現
    pub fn raw_index(&self, field: FieldName) -> i64 {
        self.index(field).map(|i| i as i64).unwrap_or(-1)
    }

    pub fn is_mapped(&self, field: FieldName) -> bool {
        self.columns.contains_key(&field)
    }

    /// 解決済みの (フィールド, 列番号)
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, usize)> + '_ {
        self.columns.iter().map(|(f, i)| (*f, *i))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 必須フィールドがすべて解決済みか確認
    pub fn require(&self, fields: &[FieldName]) -> std::result::Result<(), ColumnError> {
        match fields.iter().find(|f| !self.is_mapped(**f)) {
            Some(missing) => Err(ColumnError::RequiredColumnMissing(
                missing.label().to_string(),
            )),
            None => Ok(()),
        }
    }
}

/// ヘッダー行から列マッピングを解決
///
/// フィールドごとに、候補名と一致する最初のセルを採用する。
/// 同じ入力に対して常に同じ結果を返す。
///
/// # Examples
/// ```
/// use photo_sheet_common::{resolve_columns, FieldCandidates, FieldName};
///
/// let header = vec![Some("ファイル名".to_string()), Some("構成部品".to_string())];
/// let mapping = resolve_columns(&header, &FieldCandidates::default());
/// assert_eq!(mapping.index(FieldName::PartName), Some(1));
/// assert_eq!(mapping.raw_index(FieldName::MaterialId), -1);
/// ```
pub fn resolve_columns(header: &[Option<String>], candidates: &FieldCandidates) -> ColumnMapping {
    let mut columns = BTreeMap::new();

    for &field in candidates.names.keys() {
        let found = header.iter().position(|cell| {
            cell.as_deref()
                .map(|text| !text.trim().is_empty() && candidates.matches(field, text))
                .unwrap_or(false)
        });
        if let Some(index) = found {
            columns.insert(field, index);
        }
    }

    ColumnMapping { columns }
}

// =============================================
// セルアドレス
// =============================================

/// 0始まりの列番号 → 列文字（A=0, Z=25, AA=26）
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 列文字 → 0始まりの列番号
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let n = letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b - b'A' + 1) as usize);
    Some(n - 1)
}

/// セル位置（列は0始まり、行は1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellRef {
    pub column: usize,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: usize, row: u32) -> Self {
        Self { column, row }
    }

    /// A1形式
    pub fn a1(&self) -> String {
        format!("{}{}", column_letter(self.column), self.row)
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.a1())
    }
}

/// "AB12" 形式のアドレスを解析
pub fn parse_cell_address(address: &str) -> Result<CellRef> {
    lazy_static::lazy_static! {
        static ref CELL_RE: Regex = Regex::new(r"^([A-Z]+)([0-9]+)$").unwrap();
    }

    let invalid = || Error::InvalidCellAddress(address.to_string());
    let caps = CELL_RE.captures(address).ok_or_else(invalid)?;
    let column = column_index(&caps[1]).ok_or_else(invalid)?;
    let row: u32 = caps[2].parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok(CellRef { column, row })
}

/// 範囲表記の左上セル（'シート1'!B5:D7 → B5）
pub fn range_start(range: &str) -> Result<CellRef> {
    let cells = range.rsplit_once('!').map(|(_, r)| r).unwrap_or(range);
    let start = cells.split(':').next().unwrap_or(cells);
    parse_cell_address(start)
}

/// シート名付きの範囲表記（'シート1'!A5）
pub fn sheet_range(sheet_name: &str, range: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), range)
}
