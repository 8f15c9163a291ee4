use crate::error::{PhotoSheetError, Result};
use chrono::{DateTime, Utc};
use photo_sheet_common::PhotoFile;
use std::path::Path;
use walkdir::WalkDir;

/// ローカルフォルダ直下の写真を列挙
///
/// IDにはファイルパスを入れる。ファイル名順に並べて返す。
pub fn scan_folder(folder: &Path, extensions: &[String]) -> Result<Vec<PhotoFile>> {
    if !folder.is_dir() {
        return Err(PhotoSheetError::FolderNotFound(folder.display().to_string()));
    }

    let mut photos = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(ext) = path.extension() else {
            continue;
        };
        let ext_str = ext.to_string_lossy();
        if !is_photo_extension(&ext_str, extensions) {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let metadata = entry.metadata().ok();

        photos.push(PhotoFile {
            id: path.display().to_string(),
            name,
            size: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
            modified_time: metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            web_view_link: None,
        });
    }

    // ファイル名でソート
    photos.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(photos)
}

fn is_photo_extension(ext: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
}
