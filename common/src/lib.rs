//! Photo Sheet Common Library
//!
//! ファイル名解析・対応表・列マッピング・書き込み位置計算など、
//! ネットワークに依存しない処理をまとめる。

pub mod classifier;
pub mod columns;
pub mod error;
pub mod file_name;
pub mod hyperlink;
pub mod mapping;
pub mod normalize;
pub mod placement;
pub mod record;
pub mod types;

pub use classifier::{classify, pair, Classified, Pair, Pairing};
pub use columns::{
    column_index, column_letter, parse_cell_address, range_start, resolve_columns, sheet_range,
    CellRef, ColumnMapping, FieldCandidates, FieldName,
};
pub use error::{ColumnError, Error, MappingError, PairingWarning, ParseError, Result};
pub use file_name::{
    generate_statistics, lint_record, parse, parse_file, parse_multiple_files, FileError, ParseOutcome,
    ParseStatistics, ParseSummary, RecordLint,
};
pub use hyperlink::{hyperlink_formula, plan_hyperlinks, HyperlinkPlan, HyperlinkTarget};
pub use mapping::{
    build_material_table, build_process_table, LookupTables, MaterialEntry, MaterialTable,
    ProcessTable,
};
pub use placement::{next_free_row, plan_writes, CellWrite, ColumnOccupancy, WritePlan};
pub use record::{CellValue, LogicalRecord};
pub use types::{
    IllustrationRecord, InvalidFileName, NoteFlag, PhotoFile, PhotoRecord, PhotoType,
    PrimaryRecord, WeightUnit, NOT_FOUND,
};
