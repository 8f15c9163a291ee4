//! 書き込み用の論理レコード
//!
//! P区分の解析結果に対応表の名称を付け加え、
//! 論理フィールド → セル値 の形にまとめる。

use crate::columns::FieldName;
use crate::mapping::LookupTables;
use crate::types::PrimaryRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// セルに書き込む値
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// JSON値（Sheets API送信用）
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// 1レコード分の値（値のないフィールドは持たない）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogicalRecord {
    values: BTreeMap<FieldName, CellValue>,
}

impl LogicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FieldName, value: CellValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: FieldName, value: CellValue) {
        self.values.insert(field, value);
    }

    pub fn remove(&mut self, field: FieldName) -> Option<CellValue> {
        self.values.remove(&field)
    }

    pub fn get(&self, field: FieldName) -> Option<&CellValue> {
        self.values.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// P区分の解析結果と対応表から構築
    pub fn from_primary(record: &PrimaryRecord, tables: &LookupTables) -> Self {
        let material = tables.material(&record.material_id);

        LogicalRecord::new()
            .with(FieldName::FileName, CellValue::text(&record.source.name))
            .with(FieldName::PartName, CellValue::text(&record.part_name))
            .with(
                FieldName::WeightInGrams,
                CellValue::Number(record.weight_in_grams()),
            )
            .with(
                FieldName::WeightInKilograms,
                CellValue::Number(record.weight_in_kilograms()),
            )
            .with(FieldName::MaterialId, CellValue::text(&record.material_id))
            .with(FieldName::ProcessId, CellValue::text(&record.process_id))
            .with(FieldName::MaterialName, CellValue::Text(material.name))
            .with(FieldName::MaterialCategory, CellValue::Text(material.category))
            .with(
                FieldName::ProcessName,
                CellValue::Text(tables.process_name(&record.process_id)),
            )
            .with(FieldName::NotesText, CellValue::text(record.notes_text()))
            .with(FieldName::OriginalUnit, CellValue::text(record.unit.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_name::parse;
    use crate::mapping::{build_material_table, build_process_table};
    use crate::types::PhotoRecord;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn tables() -> LookupTables {
        let material = build_material_table(
            &strings(&["素材ID", "素材名", "素材区分"]),
            &[strings(&["st01", "ステンレス", "金属"])],
        )
        .unwrap();
        let process = build_process_table(
            &strings(&["加工ID", "加工方法名"]),
            &[strings(&["pr01", "切削"])],
        )
        .unwrap();
        LookupTables::new(material, process)
    }

    fn primary(name: &str) -> PrimaryRecord {
        match parse(name).unwrap() {
            PhotoRecord::P(p) => p,
            PhotoRecord::M(_) => panic!("expected P record"),
        }
    }

    #[test]
    fn test_from_primary_enriches_names() {
        let record = LogicalRecord::from_primary(
            &primary("001_bolt_2.5_KG_st01_pr01_P_1.jpg"),
            &tables(),
        );
        assert_eq!(record.len(), 11);
        assert_eq!(
            record.get(FieldName::MaterialName),
            Some(&CellValue::text("ステンレス"))
        );
        assert_eq!(
            record.get(FieldName::MaterialCategory),
            Some(&CellValue::text("金属"))
        );
        assert_eq!(
            record.get(FieldName::ProcessName),
            Some(&CellValue::text("切削"))
        );
        assert_eq!(
            record.get(FieldName::WeightInGrams),
            Some(&CellValue::Number(2500.0))
        );
        assert_eq!(
            record.get(FieldName::OriginalUnit),
            Some(&CellValue::text("kg"))
        );
        assert_eq!(record.get(FieldName::NotesText), Some(&CellValue::text("あり")));
    }

    #[test]
    fn test_from_primary_unknown_ids() {
        let record = LogicalRecord::from_primary(
            &primary("001_bolt_1_g_zz_qq_P_0.jpg"),
            &tables(),
        );
        assert_eq!(
            record.get(FieldName::MaterialName),
            Some(&CellValue::text("該当なし"))
        );
        assert_eq!(
            record.get(FieldName::ProcessName),
            Some(&CellValue::text("該当なし"))
        );
        assert_eq!(record.get(FieldName::NotesText), Some(&CellValue::text("-")));
    }

    #[test]
    fn test_cell_value_json() {
        assert_eq!(CellValue::Number(10.5).to_json(), serde_json::json!(10.5));
        assert_eq!(CellValue::text("a").to_json(), serde_json::json!("a"));
        assert_eq!(CellValue::Number(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(CellValue::Number(0.0105).to_string(), "0.0105");
    }
}
