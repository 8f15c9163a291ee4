//! ハイパーリンクの設定位置
//!
//! 書き込み直後の先頭行（actual_start_row）から、
//! シートを読み直さずにリンク先セルを求める。
//! - P区分: 番号順の位置 i → (部品名列, 先頭行 + i)、表示文字列は部品名
//! - M区分: 対応するP区分の位置 j → (素材列, 先頭行 + j)、表示文字列は既存セルの値

use crate::classifier::{Classified, Pairing};
use crate::columns::CellRef;
use crate::error::PairingWarning;
use crate::types::{PhotoFile, PhotoType};
use serde::Serialize;

/// リンクの設定先
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperlinkTarget {
    pub cell: CellRef,
    pub file: PhotoFile,
    /// None の場合はセルの現在値をそのまま表示文字列にする
    pub display_text: Option<String>,
    pub kind: PhotoType,
}

/// リンク設定の計画
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HyperlinkPlan {
    pub targets: Vec<HyperlinkTarget>,
    /// 対応するP区分がないM区分
    pub errors: Vec<PairingWarning>,
}

/// リンク設定先を計算
///
/// * `classified` - 番号順に並んだP/M区分
/// * `pairing` - M区分とP区分の対応
/// * `actual_start_row` - 書き込みバッチの先頭行
/// * `part_column` - 部品名列（0始まり）
/// * `material_column` - 素材列（0始まり）
pub fn plan_hyperlinks(
    classified: &Classified<'_>,
    pairing: &Pairing<'_>,
    actual_start_row: u32,
    part_column: usize,
    material_column: usize,
) -> HyperlinkPlan {
    let mut plan = HyperlinkPlan::default();

    for (i, p) in classified.p_type.iter().enumerate() {
        plan.targets.push(HyperlinkTarget {
            cell: CellRef::new(part_column, actual_start_row + i as u32),
            file: p.source.clone(),
            display_text: Some(p.part_name.clone()),
            kind: PhotoType::P,
        });
    }

    for m in &classified.m_type {
        match pairing.pair_for(m) {
            Some(pair) => plan.targets.push(HyperlinkTarget {
                cell: CellRef::new(material_column, actual_start_row + pair.p_position as u32),
                file: m.source.clone(),
                display_text: None,
                kind: PhotoType::M,
            }),
            None => plan.errors.push(PairingWarning::UnpairedMRecord {
                file_name: m.source.name.clone(),
                sequence_number: m.sequence_number,
            }),
        }
    }

    plan
}

/// HYPERLINK関数の数式（"は二重化）
pub fn hyperlink_formula(url: &str, text: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\", \"{}\")",
        url.replace('"', "\"\""),
        text.replace('"', "\"\"")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, pair};
    use crate::file_name::parse;
    use crate::types::PhotoRecord;

    fn records(names: &[&str]) -> Vec<PhotoRecord> {
        names.iter().map(|n| parse(n).unwrap()).collect()
    }

    #[test]
    fn test_p_records_link_part_column() {
        let recs = records(&["002_nut_1_g_x_y_P_0.jpg", "001_bolt_1_g_x_y_P_0.jpg"]);
        let c = classify(&recs);
        let plan = plan_hyperlinks(&c, &pair(&c), 5, 1, 2);

        assert_eq!(plan.targets.len(), 2);
        assert_eq!(plan.targets[0].cell.a1(), "B5");
        assert_eq!(plan.targets[0].display_text.as_deref(), Some("bolt"));
        assert_eq!(plan.targets[1].cell.a1(), "B6");
        assert_eq!(plan.targets[1].display_text.as_deref(), Some("nut"));
    }

    #[test]
    fn test_m_record_links_paired_row() {
        let recs = records(&[
            "001_a_1_g_x_y_P_0.jpg",
            "002_b_1_g_x_y_P_0.jpg",
            "003_c_1_g_x_y_P_0.jpg",
            "003_c_1_g_x_y_M_0.jpg",
        ]);
        let c = classify(&recs);
        let plan = plan_hyperlinks(&c, &pair(&c), 10, 0, 3);

        let m = plan
            .targets
            .iter()
            .find(|t| t.kind == PhotoType::M)
            .unwrap();
        assert_eq!(m.cell, CellRef::new(3, 12));
        assert_eq!(m.display_text, None);
        assert_eq!(m.file.name, "003_c_1_g_x_y_M_0.jpg");
        assert!(plan.errors.is_empty());
    }

    #[test]
    fn test_unpaired_m_is_reported() {
        let recs = records(&["001_a_1_g_x_y_P_0.jpg", "099_z_1_g_x_y_M_0.jpg"]);
        let c = classify(&recs);
        let plan = plan_hyperlinks(&c, &pair(&c), 2, 0, 1);

        assert_eq!(plan.targets.len(), 1);
        assert_eq!(
            plan.errors,
            vec![PairingWarning::UnpairedMRecord {
                file_name: "099_z_1_g_x_y_M_0.jpg".into(),
                sequence_number: 99,
            }]
        );
    }

    #[test]
    fn test_hyperlink_formula_escapes_quotes() {
        assert_eq!(
            hyperlink_formula("https://x/y", "bolt"),
            "=HYPERLINK(\"https://x/y\", \"bolt\")"
        );
        assert_eq!(
            hyperlink_formula("u", "3\" pipe"),
            "=HYPERLINK(\"u\", \"3\"\" pipe\")"
        );
    }
}
