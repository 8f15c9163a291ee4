//! 書き込み位置の計算
//!
//! 列ごとに「既存データの次の行」からカーソルを持ち、
//! レコードのフィールドを列単位で独立に下へ積んでいく。
//! 一部のレコードだけ値が欠けると列間で行がずれる。

use crate::columns::{CellRef, ColumnMapping, FieldName};
use crate::record::{CellValue, LogicalRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// ヘッダー行の次（データの先頭行）
pub const FIRST_DATA_ROW: u32 = 2;

/// 列ごとの次の空き行（1始まり）
pub type ColumnOccupancy = BTreeMap<FieldName, u32>;

/// 列の値から次の空き行を求める
///
/// 最後の空でないセルの行番号 + 1。ヘッダー行より上にはならない。
pub fn next_free_row<S: AsRef<str>>(column_values: &[Option<S>]) -> u32 {
    let last = column_values.iter().rposition(|v| {
        v.as_ref()
            .map(|s| !s.as_ref().trim().is_empty())
            .unwrap_or(false)
    });
    match last {
        Some(index) => (index as u32 + 2).max(FIRST_DATA_ROW),
        None => FIRST_DATA_ROW,
    }
}

/// 1セル分の書き込み
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellWrite {
    pub field: FieldName,
    pub cell: CellRef,
    pub value: CellValue,
}

/// 書き込み計画
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WritePlan {
    pub cell_writes: Vec<CellWrite>,
    /// バッチの先頭行（各列の開始行の最小値）
    pub actual_start_row: u32,
    /// 列ごとの開始行
    pub start_rows: BTreeMap<FieldName, u32>,
    /// 列ごとの終了後カーソル
    pub end_rows: BTreeMap<FieldName, u32>,
}

impl WritePlan {
    pub fn is_empty(&self) -> bool {
        self.cell_writes.is_empty()
    }

    /// 書き込まれる行数（重複除く）
    pub fn row_count(&self) -> usize {
        let mut rows: Vec<u32> = self.cell_writes.iter().map(|w| w.cell.row).collect();
        rows.sort_unstable();
        rows.dedup();
        rows.len()
    }

    /// 開始行が `actual_start_row` と異なる列とその開始行
    ///
    /// ハイパーリンクは `actual_start_row` を基準に行を決めるため、
    /// ここに含まれる列ではデータとリンクの行が一致しない。
    pub fn anchor_offsets(&self, fields: &[FieldName]) -> Vec<(FieldName, u32)> {
        fields
            .iter()
            .filter_map(|f| self.start_rows.get(f).map(|start| (*f, *start)))
            .filter(|(_, start)| *start != self.actual_start_row)
            .collect()
    }

    /// 列ごとの書き込み件数がそろっていない場合の列
    pub fn misaligned_fields(&self) -> Vec<FieldName> {
        let counts: BTreeMap<FieldName, u32> = self
            .end_rows
            .iter()
            .map(|(f, end)| (*f, end - self.start_rows.get(f).copied().unwrap_or(*end)))
            .collect();
        let Some(max) = counts.values().copied().max() else {
            return Vec::new();
        };
        counts
            .into_iter()
            .filter(|(_, n)| *n != max)
            .map(|(f, _)| f)
            .collect()
    }
}

/// 書き込みセルを計算
///
/// * `mapping` - 解決済みの列マッピング
/// * `occupancy` - 列ごとの次の空き行（未指定の列は2行目から）
/// * `records` - 書き込むレコード（この順に下へ積む）
pub fn plan_writes(
    mapping: &ColumnMapping,
    occupancy: &ColumnOccupancy,
    records: &[LogicalRecord],
) -> WritePlan {
    let mut cursors: BTreeMap<FieldName, u32> = mapping
        .iter()
        .map(|(field, _)| {
            let start = occupancy
                .get(&field)
                .copied()
                .unwrap_or(FIRST_DATA_ROW)
                .max(FIRST_DATA_ROW);
            (field, start)
        })
        .collect();
    let start_rows = cursors.clone();

    let actual_start_row = start_rows
        .values()
        .copied()
        .min()
        .unwrap_or(FIRST_DATA_ROW);

    let mut cell_writes = Vec::new();
    for record in records {
        for (field, column) in mapping.iter() {
            let Some(value) = record.get(field) else {
                continue;
            };
            let Some(cursor) = cursors.get_mut(&field) else {
                continue;
            };
            cell_writes.push(CellWrite {
                field,
                cell: CellRef::new(column, *cursor),
                value: value.clone(),
            });
            *cursor += 1;
        }
    }

    let plan = WritePlan {
        cell_writes,
        actual_start_row,
        start_rows,
        end_rows: cursors,
    };

    let misaligned = plan.misaligned_fields();
    if !misaligned.is_empty() {
        log::warn!(
            "値が欠けたレコードがあり、列の行位置がずれます: {}",
            misaligned
                .iter()
                .map(|f| f.key())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    plan
}
