//! ヘッダー名の表記ゆれ吸収
//!
//! 対応表・スプレッドシートの列名を比較する前に、
//! 前後空白の除去、全角英数の半角化（NFKC）、大文字小文字の統一、
//! 連続空白の1文字化を行う。

use unicode_normalization::UnicodeNormalization;

/// 比較用に列名を正規化
pub fn normalize_header(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 完全一致 → 正規化一致の順で比較
pub fn header_matches(cell: &str, candidate: &str) -> bool {
    cell.trim() == candidate || normalize_header(cell) == normalize_header(candidate)
}

/// 正規化後の部分一致
pub fn header_contains(cell: &str, candidate: &str) -> bool {
    let candidate = normalize_header(candidate);
    !candidate.is_empty() && normalize_header(cell).contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_collapse() {
        assert_eq!(normalize_header("  加工   方法 "), "加工 方法");
    }

    #[test]
    fn test_full_width_folding() {
        assert_eq!(normalize_header("素材ＩＤ"), "素材id");
        assert_eq!(normalize_header("重量［ｇ］"), "重量[g]");
        assert_eq!(normalize_header("重量（kg）"), "重量(kg)");
    }

    #[test]
    fn test_ideographic_space_collapses() {
        // U+3000 はNFKCで通常の空白になる
        assert_eq!(normalize_header("素材\u{3000}\u{3000}区分"), "素材 区分");
    }

    #[test]
    fn test_header_matches() {
        assert!(header_matches(" 素材ID ", "素材ID"));
        assert!(header_matches("素材ｉｄ", "素材ID"));
        assert!(!header_matches("素材", "素材ID"));
    }

    #[test]
    fn test_header_contains() {
        assert!(header_contains("加工方法（主）", "加工方法"));
        assert!(!header_contains("加工ID", "加工方法"));
        assert!(!header_contains("anything", "  "));
    }
}
