//! 写真ファイルと解析結果の型定義
//!
//! - PhotoFile: Driveなどから取得した写真ファイル（外部入力、不変）
//! - PrimaryRecord: P区分（部品の主写真）の解析結果
//! - IllustrationRecord: M区分（素材写真）の解析結果
//! - InvalidFileName: 書式エラーになったファイル名

use crate::error::ParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 未解決IDの代替表示
pub const NOT_FOUND: &str = "該当なし";

/// グラム/キログラムの換算係数
pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;

/// 写真ファイル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    /// Driveの閲覧リンク（一覧取得時に付いていれば保持）
    #[serde(default)]
    pub web_view_link: Option<String>,
}

impl PhotoFile {
    /// 名前だけを持つファイル（ローカル解析・テスト用）
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            ..Default::default()
        }
    }
}

/// 写真区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoType {
    /// 主写真（データ行を書き込む）
    P,
    /// 素材写真（対応するP行にリンクのみ設定）
    M,
}

impl PhotoType {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "p" => Some(PhotoType::P),
            "m" => Some(PhotoType::M),
            _ => None,
        }
    }
}

impl std::fmt::Display for PhotoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoType::P => write!(f, "p"),
            PhotoType::M => write!(f, "m"),
        }
    }
}

/// 重量の単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    G,
    Kg,
}

impl WeightUnit {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "g" => Some(WeightUnit::G),
            "kg" => Some(WeightUnit::Kg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::G => "g",
            WeightUnit::Kg => "kg",
        }
    }

    /// この単位の値をグラムに換算
    pub fn to_grams(&self, value: f64) -> f64 {
        match self {
            WeightUnit::G => value,
            WeightUnit::Kg => kilograms_to_grams(value),
        }
    }

    /// この単位の値をキログラムに換算
    pub fn to_kilograms(&self, value: f64) -> f64 {
        match self {
            WeightUnit::G => grams_to_kilograms(value),
            WeightUnit::Kg => value,
        }
    }
}

impl std::fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn grams_to_kilograms(grams: f64) -> f64 {
    grams / GRAMS_PER_KILOGRAM
}

pub fn kilograms_to_grams(kilograms: f64) -> f64 {
    kilograms * GRAMS_PER_KILOGRAM
}

/// 特記事項フラグ（"0" = なし, "1" = あり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteFlag {
    #[serde(rename = "0")]
    Absent,
    #[serde(rename = "1")]
    Present,
}

impl NoteFlag {
    /// 完全一致のみ受け付ける（前後空白も不可）
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "0" => Some(NoteFlag::Absent),
            "1" => Some(NoteFlag::Present),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteFlag::Absent => "0",
            NoteFlag::Present => "1",
        }
    }

    /// シート表示用の文字列
    pub fn display_text(&self) -> &'static str {
        match self {
            NoteFlag::Absent => "-",
            NoteFlag::Present => "あり",
        }
    }
}

/// P区分の解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryRecord {
    /// 番号（対応付けにのみ使用、シートには書き込まない）
    pub sequence_number: u32,
    pub part_name: String,
    pub weight: f64,
    /// ファイル名に書かれたままの重量文字列
    pub weight_text: String,
    pub unit: WeightUnit,
    pub material_id: String,
    pub process_id: String,
    pub note_flag: NoteFlag,
    pub source: PhotoFile,
}

impl PrimaryRecord {
    pub fn weight_in_grams(&self) -> f64 {
        self.unit.to_grams(self.weight)
    }

    pub fn weight_in_kilograms(&self) -> f64 {
        self.unit.to_kilograms(self.weight)
    }

    pub fn notes_text(&self) -> &'static str {
        self.note_flag.display_text()
    }
}

/// M区分の解析結果
///
/// データ行には書き込まないが、P区分との対応付けに使う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IllustrationRecord {
    pub sequence_number: u32,
    pub part_name: String,
    pub source: PhotoFile,
}

/// 書式が正しいファイル名の解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "photoType", rename_all = "lowercase")]
pub enum PhotoRecord {
    P(PrimaryRecord),
    M(IllustrationRecord),
}

impl PhotoRecord {
    pub fn photo_type(&self) -> PhotoType {
        match self {
            PhotoRecord::P(_) => PhotoType::P,
            PhotoRecord::M(_) => PhotoType::M,
        }
    }

    pub fn sequence_number(&self) -> u32 {
        match self {
            PhotoRecord::P(r) => r.sequence_number,
            PhotoRecord::M(r) => r.sequence_number,
        }
    }

    pub fn part_name(&self) -> &str {
        match self {
            PhotoRecord::P(r) => &r.part_name,
            PhotoRecord::M(r) => &r.part_name,
        }
    }

    pub fn source(&self) -> &PhotoFile {
        match self {
            PhotoRecord::P(r) => &r.source,
            PhotoRecord::M(r) => &r.source,
        }
    }

    /// データ行の書き込み対象外か（M区分）
    pub fn should_skip(&self) -> bool {
        matches!(self, PhotoRecord::M(_))
    }
}

/// 書式エラーになったファイル名
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidFileName {
    pub reason: ParseError,
    pub raw_name: String,
    pub raw_parts: Vec<String>,
    pub source: PhotoFile,
}

impl std::fmt::Display for InvalidFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.raw_name, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_parse_case_insensitive() {
        assert_eq!(WeightUnit::parse("G"), Some(WeightUnit::G));
        assert_eq!(WeightUnit::parse("Kg"), Some(WeightUnit::Kg));
        assert_eq!(WeightUnit::parse("mg"), None);
    }

    #[test]
    fn test_unit_conversion_inverse() {
        for x in [0.001, 1.0, 10.5, 2500.0, 123456.789] {
            let back = grams_to_kilograms(kilograms_to_grams(x));
            assert!((back - x).abs() < 1e-9 * x.max(1.0), "x = {}", x);
        }
    }

    #[test]
    fn test_note_flag_exact_only() {
        assert_eq!(NoteFlag::parse("0"), Some(NoteFlag::Absent));
        assert_eq!(NoteFlag::parse("1"), Some(NoteFlag::Present));
        assert_eq!(NoteFlag::parse(" 1"), None);
        assert_eq!(NoteFlag::parse("01"), None);
        assert_eq!(NoteFlag::Present.display_text(), "あり");
        assert_eq!(NoteFlag::Absent.display_text(), "-");
    }

    #[test]
    fn test_photo_type_parse() {
        assert_eq!(PhotoType::parse("P"), Some(PhotoType::P));
        assert_eq!(PhotoType::parse("m"), Some(PhotoType::M));
        assert_eq!(PhotoType::parse("X"), None);
    }

    #[test]
    fn test_photo_record_serializes_with_type_tag() {
        let record = PhotoRecord::M(IllustrationRecord {
            sequence_number: 2,
            part_name: "bolt".into(),
            source: PhotoFile::named("002_bolt_1_g_a_b_M_0.jpg"),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["photoType"], "m");
        assert_eq!(json["sequenceNumber"], 2);
    }
}
