//! Google Sheets API（ヘッダー読み取り・一括書き込み・ハイパーリンク）

use super::{api_url, GoogleClient, SheetHeader, SheetRef, SheetStore, WriteResult};
use crate::error::{PhotoSheetError, Result};
use photo_sheet_common::{range_start, sheet_range, CellRef, CellWrite};
use serde_json::{json, Value};

pub const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// APIのセル値を文字列に
fn cell_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// `values` 配列の先頭行（または先頭列）
fn first_line(payload: &Value) -> Vec<Option<String>> {
    payload["values"]
        .get(0)
        .and_then(Value::as_array)
        .map(|cells| cells.iter().map(cell_to_string).collect())
        .unwrap_or_default()
}

/// 先頭シートのタイトルとID
fn first_sheet(payload: &Value, spreadsheet_id: &str) -> Result<(String, i64)> {
    let props = payload["sheets"]
        .get(0)
        .map(|s| &s["properties"])
        .ok_or_else(|| PhotoSheetError::SheetNotFound(spreadsheet_id.to_string()))?;

    let title = props["title"]
        .as_str()
        .ok_or_else(|| PhotoSheetError::ApiParse("シート名がありません".into()))?;
    let sheet_id = props["sheetId"].as_i64().unwrap_or(0);
    Ok((title.to_string(), sheet_id))
}

/// 一括書き込み応答の最初の更新セル
fn updated_start(response: &Value) -> Option<CellRef> {
    let range = response["responses"].get(0)?["updatedRange"].as_str()?;
    match range_start(range) {
        Ok(cell) => Some(cell),
        Err(e) => {
            log::warn!("更新範囲を解釈できません: {}", e);
            None
        }
    }
}

fn write_request_body(sheet: &SheetRef, writes: &[CellWrite]) -> Value {
    let data: Vec<Value> = writes
        .iter()
        .map(|w| {
            json!({
                "range": sheet_range(&sheet.sheet_name, &w.cell.a1()),
                "values": [[w.value.to_json()]],
            })
        })
        .collect();
    json!({ "valueInputOption": "RAW", "data": data })
}

fn formula_request_body(sheet: &SheetRef, cell: CellRef, formula: &str) -> Value {
    json!({
        "requests": [{
            "updateCells": {
                "rows": [{ "values": [{ "userEnteredValue": { "formulaValue": formula } }] }],
                "fields": "userEnteredValue",
                "start": {
                    "sheetId": sheet.sheet_id,
                    "rowIndex": cell.row.saturating_sub(1),
                    "columnIndex": cell.column,
                }
            }
        }]
    })
}

pub struct SheetsClient {
    client: GoogleClient,
}

impl SheetsClient {
    pub fn new(client: GoogleClient) -> Self {
        Self { client }
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str, by_column: bool) -> Result<Value> {
        let mut url = api_url(SHEETS_URL, &[spreadsheet_id, "values", range])?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("majorDimension", if by_column { "COLUMNS" } else { "ROWS" });
        self.client.get_json(url).await
    }
}

impl SheetStore for SheetsClient {
    async fn sheet_header(&self, spreadsheet_id: &str) -> Result<SheetHeader> {
        let mut url = api_url(SHEETS_URL, &[spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let meta = self.client.get_json(url).await?;
        let (sheet_name, sheet_id) = first_sheet(&meta, spreadsheet_id)?;

        let values = self
            .get_values(spreadsheet_id, &sheet_range(&sheet_name, "1:1"), false)
            .await?;

        Ok(SheetHeader {
            sheet: SheetRef {
                spreadsheet_id: spreadsheet_id.to_string(),
                sheet_name,
                sheet_id,
            },
            header_row: first_line(&values),
        })
    }

    async fn column_values(
        &self,
        sheet: &SheetRef,
        column_letter: &str,
    ) -> Result<Vec<Option<String>>> {
        let range = sheet_range(&sheet.sheet_name, &format!("{0}:{0}", column_letter));
        let values = self.get_values(&sheet.spreadsheet_id, &range, true).await?;
        Ok(first_line(&values))
    }

    async fn batch_write(&self, sheet: &SheetRef, writes: &[CellWrite]) -> Result<WriteResult> {
        let url = api_url(
            SHEETS_URL,
            &[sheet.spreadsheet_id.as_str(), "values:batchUpdate"],
        )?;
        let response = self
            .client
            .post_json(url, &write_request_body(sheet, writes))
            .await?;

        Ok(WriteResult {
            updated_cells: response["totalUpdatedCells"].as_u64().unwrap_or(0) as usize,
            updated_rows: response["totalUpdatedRows"].as_u64().unwrap_or(0) as usize,
            first_cell: updated_start(&response),
        })
    }

    async fn cell_text(&self, sheet: &SheetRef, cell: CellRef) -> Result<Option<String>> {
        let range = sheet_range(&sheet.sheet_name, &cell.a1());
        let values = self.get_values(&sheet.spreadsheet_id, &range, false).await?;
        Ok(first_line(&values).into_iter().next().flatten())
    }

    async fn write_formula(&self, sheet: &SheetRef, cell: CellRef, formula: &str) -> Result<()> {
        let method = format!("{}:batchUpdate", sheet.spreadsheet_id);
        let url = api_url(SHEETS_URL, &[method.as_str()])?;
        self.client
            .post_json(url, &formula_request_body(sheet, cell, formula))
            .await?;
        log::debug!("ハイパーリンクを設定: {}", cell);
        Ok(())
    }
}
