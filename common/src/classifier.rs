//! P/M区分の振り分けと対応付け
//!
//! M区分（素材写真）は同じ番号のP区分（主写真）と1対1で対応付ける。
//! 番号が一致しない場合は推測せず「未対応」として報告する。

use crate::error::PairingWarning;
use crate::types::{IllustrationRecord, PhotoRecord, PrimaryRecord};
use std::collections::BTreeMap;

/// 区分別・番号順のレコード
#[derive(Debug, Clone, Default)]
pub struct Classified<'a> {
    pub p_type: Vec<&'a PrimaryRecord>,
    pub m_type: Vec<&'a IllustrationRecord>,
}

/// 対応付けの1組
#[derive(Debug, Clone, Copy)]
pub struct Pair<'a> {
    pub m: &'a IllustrationRecord,
    pub p: &'a PrimaryRecord,
    /// p_type内（番号順）での位置
    pub p_position: usize,
}

/// 対応付けの結果
#[derive(Debug, Clone, Default)]
pub struct Pairing<'a> {
    pub pairs: Vec<Pair<'a>>,
    pub unmatched: Vec<&'a IllustrationRecord>,
    pub warnings: Vec<PairingWarning>,
}

impl<'a> Pairing<'a> {
    pub fn pair_for(&self, m: &IllustrationRecord) -> Option<&Pair<'a>> {
        self.pairs.iter().find(|pair| std::ptr::eq(pair.m, m))
    }
}

/// 区分ごとに振り分けて番号順に並べる（同番号は入力順を保つ）
pub fn classify(records: &[PhotoRecord]) -> Classified<'_> {
    let mut classified = Classified::default();

    for record in records {
        match record {
            PhotoRecord::P(p) => classified.p_type.push(p),
            PhotoRecord::M(m) => classified.m_type.push(m),
        }
    }

    // sort_by_key は安定ソート
    classified.p_type.sort_by_key(|r| r.sequence_number);
    classified.m_type.sort_by_key(|r| r.sequence_number);

    classified
}

/// M区分を同じ番号のP区分に対応付け
///
/// 同じ番号のP区分が複数ある場合は番号順で最初のものを採用し、
/// 重複として警告する。
pub fn pair<'a>(classified: &Classified<'a>) -> Pairing<'a> {
    let mut pairing = Pairing::default();

    // 番号 → p_type内の位置
    let mut positions: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, p) in classified.p_type.iter().enumerate() {
        positions.entry(p.sequence_number).or_default().push(i);
    }

    for (&sequence_number, found) in &positions {
        if found.len() > 1 {
            let file_names: Vec<String> = found
                .iter()
                .map(|&i| classified.p_type[i].source.name.clone())
                .collect();
            log::warn!(
                "P区分の番号 {} が重複しています: {}",
                sequence_number,
                file_names.join(", ")
            );
            pairing.warnings.push(PairingWarning::DuplicateSequenceNumber {
                sequence_number,
                file_names,
            });
        }
    }

    for &m in &classified.m_type {
        match positions.get(&m.sequence_number).and_then(|v| v.first()) {
            Some(&p_position) => pairing.pairs.push(Pair {
                m,
                p: classified.p_type[p_position],
                p_position,
            }),
            None => {
                log::warn!(
                    "対応するP区分がありません: {}（番号 {}）",
                    m.source.name,
                    m.sequence_number
                );
                pairing.unmatched.push(m);
                pairing.warnings.push(PairingWarning::UnpairedMRecord {
                    file_name: m.source.name.clone(),
                    sequence_number: m.sequence_number,
                });
            }
        }
    }

    pairing
}
