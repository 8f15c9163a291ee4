//! ID対応表
//!
//! 素材ID → {素材名, 素材区分}、加工ID → 加工方法名 の対応表を
//! ヘッダー付きの表データから構築する。未登録IDは「該当なし」を返す。

use crate::error::MappingError;
use crate::normalize::{header_matches, normalize_header};
use crate::types::NOT_FOUND;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// 素材対応表の列名
pub const MATERIAL_ID_COLUMN: &str = "素材ID";
pub const MATERIAL_NAME_COLUMN: &str = "素材名";
pub const MATERIAL_CATEGORY_COLUMN: &str = "素材区分";

/// 加工対応表の列名
pub const PROCESS_ID_COLUMN: &str = "加工ID";
pub const PROCESS_NAME_COLUMN: &str = "加工方法名";

/// 素材エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub name: String,
    pub category: String,
}

impl MaterialEntry {
    pub fn not_found() -> Self {
        Self {
            name: NOT_FOUND.to_string(),
            category: NOT_FOUND.to_string(),
        }
    }
}

/// ID → 値 の対応表
///
/// 構築後は不変。重複IDは後勝ち。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingTable<V> {
    entries: HashMap<String, V>,
    /// 登録順のID（プレビュー表示用）
    order: Vec<String>,
}

impl<V> MappingTable<V> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id.trim())
    }

    /// 登録順に先頭から列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|v| (id.as_str(), v)))
    }

    fn insert(&mut self, id: String, value: V) {
        if self.entries.insert(id.clone(), value).is_none() {
            self.order.push(id);
        }
    }
}

pub type MaterialTable = MappingTable<MaterialEntry>;
pub type ProcessTable = MappingTable<String>;

impl MaterialTable {
    /// 素材データを取得（未登録は「該当なし」）
    pub fn get(&self, id: &str) -> MaterialEntry {
        self.entries
            .get(id.trim())
            .cloned()
            .unwrap_or_else(MaterialEntry::not_found)
    }
}

impl ProcessTable {
    /// 加工方法名を取得（未登録は「該当なし」）
    pub fn get(&self, id: &str) -> &str {
        self.entries
            .get(id.trim())
            .map(String::as_str)
            .unwrap_or(NOT_FOUND)
    }
}

/// ヘッダー行から列位置を探す
///
/// 完全一致を優先し、見つからなければ正規化比較で探す。
pub fn find_column(header: &[String], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.trim() == name)
        .or_else(|| {
            let wanted = normalize_header(name);
            header.iter().position(|cell| normalize_header(cell) == wanted)
        })
}

fn require_column(header: &[String], name: &str) -> Result<usize, MappingError> {
    find_column(header, name).ok_or_else(|| MappingError::MissingColumn(name.to_string()))
}

fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// 汎用の対応表構築
///
/// * `id_column` - ID列の名前
/// * `value_columns` - 値列の名前（すべて必須）
/// * `make` - 値列のセル（すべて空でない）から値を作る
///
/// ID・値のいずれかが空の行は読み飛ばす。
pub fn build_table<V>(
    header: &[String],
    rows: &[Vec<String>],
    id_column: &str,
    value_columns: &[&str],
    make: impl Fn(&[&str]) -> V,
) -> Result<MappingTable<V>, MappingError> {
    let id_index = require_column(header, id_column)?;
    let value_indices = value_columns
        .iter()
        .map(|name| require_column(header, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = MappingTable {
        entries: HashMap::new(),
        order: Vec::new(),
    };
    let mut skipped = 0usize;

    for row in rows {
        let Some(id) = cell(row, id_index) else {
            skipped += 1;
            continue;
        };
        let values: Option<Vec<&str>> = value_indices.iter().map(|&i| cell(row, i)).collect();
        match values {
            Some(values) => table.insert(id.to_string(), make(&values)),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("対応表({}): 空欄を含む{}行を読み飛ばしました", id_column, skipped);
    }

    if table.is_empty() {
        return Err(MappingError::NoValidRows);
    }

    Ok(table)
}

/// 素材ID対応表を構築（素材ID・素材名・素材区分）
pub fn build_material_table(
    header: &[String],
    rows: &[Vec<String>],
) -> Result<MaterialTable, MappingError> {
    build_table(
        header,
        rows,
        MATERIAL_ID_COLUMN,
        &[MATERIAL_NAME_COLUMN, MATERIAL_CATEGORY_COLUMN],
        |v| MaterialEntry {
            name: v[0].to_string(),
            category: v[1].to_string(),
        },
    )
}

/// 加工ID対応表を構築（加工ID・加工方法名）
pub fn build_process_table(
    header: &[String],
    rows: &[Vec<String>],
) -> Result<ProcessTable, MappingError> {
    build_table(header, rows, PROCESS_ID_COLUMN, &[PROCESS_NAME_COLUMN], |v| {
        v[0].to_string()
    })
}

/// 処理で参照する2つの対応表
///
/// 差し替えは構築済みの表をArcごと入れ替える。
/// 参照中の表が途中で書き換わることはない。
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    material: Option<Arc<MaterialTable>>,
    process: Option<Arc<ProcessTable>>,
}

impl LookupTables {
    pub fn new(material: MaterialTable, process: ProcessTable) -> Self {
        Self {
            material: Some(Arc::new(material)),
            process: Some(Arc::new(process)),
        }
    }

    pub fn replace_material(&mut self, table: MaterialTable) {
        self.material = Some(Arc::new(table));
    }

    pub fn replace_process(&mut self, table: ProcessTable) {
        self.process = Some(Arc::new(table));
    }

    /// 両方の対応表が読み込み済みか
    pub fn is_ready(&self) -> bool {
        self.material.is_some() && self.process.is_some()
    }

    pub fn reset(&mut self) {
        self.material = None;
        self.process = None;
    }

    pub fn material_table(&self) -> Option<Arc<MaterialTable>> {
        self.material.clone()
    }

    pub fn process_table(&self) -> Option<Arc<ProcessTable>> {
        self.process.clone()
    }

    /// 素材データ（対応表未読込も「該当なし」）
    pub fn material(&self, id: &str) -> MaterialEntry {
        self.material
            .as_ref()
            .map(|t| t.get(id))
            .unwrap_or_else(MaterialEntry::not_found)
    }

    /// 加工方法名（対応表未読込も「該当なし」）
    pub fn process_name(&self, id: &str) -> String {
        self.process
            .as_ref()
            .map(|t| t.get(id).to_string())
            .unwrap_or_else(|| NOT_FOUND.to_string())
    }
}
