//! 対応表ファイルの読み込み（Excel / CSV）
//!
//! 1行目をヘッダーとして読み、以降の行をデータとして扱う。
//! Excelは先頭シートのみ。

use crate::error::{PhotoSheetError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use photo_sheet_common::{
    build_material_table, build_process_table, LookupTables, MaterialTable, ProcessTable,
};
use std::path::Path;

/// ヘッダー行とデータ行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tabular {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // 1.0 → "1"
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Excelの先頭シートを読み込む
pub fn read_excel(path: &Path) -> Result<Tabular> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PhotoSheetError::LookupTable(format!("{}: {}", path.display(), e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| PhotoSheetError::LookupTable(format!("シートがありません: {}", path.display())))?;
    let range = workbook
        .worksheet_range(first)
        .map_err(|e| PhotoSheetError::LookupTable(format!("{}: {}", path.display(), e)))?;
    if range.is_empty() {
        return Err(PhotoSheetError::LookupTable(format!(
            "シート「{}」にデータがありません: {}",
            first,
            path.display()
        )));
    }

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(data_to_string).collect::<Vec<_>>());
    let header = rows.next().unwrap_or_default();
    Ok(Tabular {
        header,
        rows: rows.collect(),
    })
}

/// CSV/TSVを読み込む
pub fn read_csv(path: &Path) -> Result<Tabular> {
    let delimiter = if extension(path) == "tsv" { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PhotoSheetError::LookupTable(format!("{}: {}", path.display(), e)))?;

    let header = reader
        .headers()
        .map_err(|e| PhotoSheetError::LookupTable(e.to_string()))?
        .iter()
        // Excel保存のCSVに付くBOMを除去
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| PhotoSheetError::LookupTable(e.to_string()))?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect());
    }

    Ok(Tabular { header, rows })
}

/// 拡張子で形式を判別して読み込む
pub fn read_tabular(path: &Path) -> Result<Tabular> {
    if !path.exists() {
        return Err(PhotoSheetError::FileNotFound(path.display().to_string()));
    }

    match extension(path).as_str() {
        "csv" | "tsv" | "txt" => read_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_excel(path),
        other => Err(PhotoSheetError::LookupTable(format!(
            "対応していない形式です: .{}（xlsx/xls/csvのみ）",
            other
        ))),
    }
}

pub fn load_material_table(path: &Path) -> Result<MaterialTable> {
    let data = read_tabular(path)?;
    let table = build_material_table(&data.header, &data.rows)?;
    log::info!("素材対応表: {}件 ({})", table.len(), path.display());
    Ok(table)
}

pub fn load_process_table(path: &Path) -> Result<ProcessTable> {
    let data = read_tabular(path)?;
    let table = build_process_table(&data.header, &data.rows)?;
    log::info!("加工対応表: {}件 ({})", table.len(), path.display());
    Ok(table)
}

/// 2つの対応表を読み込む
pub fn load_tables(material: &Path, process: &Path) -> Result<LookupTables> {
    Ok(LookupTables::new(
        load_material_table(material)?,
        load_process_table(process)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_to_string() {
        assert_eq!(data_to_string(&Data::Empty), "");
        assert_eq!(data_to_string(&Data::String(" st01 ".into())), "st01");
        assert_eq!(data_to_string(&Data::Float(1.0)), "1");
        assert_eq!(data_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(data_to_string(&Data::Int(7)), "7");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(
            read_tabular(&path),
            Err(PhotoSheetError::LookupTable(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_tabular(Path::new("/nonexistent/material.csv")),
            Err(PhotoSheetError::FileNotFound(_))
        ));
    }
}
