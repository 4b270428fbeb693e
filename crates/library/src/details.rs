use std::fs;
use std::path::Path;

use common::MediaItem;
use tracing::debug;

use crate::classify::disc_kind_of;
use crate::grouper::part_marker_start;

pub trait DetailLoader: Send + Sync {
    fn load_from_disk(&self, item: &mut MediaItem);
    fn load_from_store(&self, item: &mut MediaItem);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FileDetails;

impl DetailLoader for FileDetails {
    fn load_from_disk(&self, item: &mut MediaItem) {
        let (name, year) = split_title_year(&display_name(item));
        item.name = name;
        item.year = year;
        item.disc = item.first_file().and_then(disc_kind_of);

        let mut size_bytes = 0u64;
        for file in &item.files {
            match fs::metadata(file) {
                Ok(meta) => size_bytes = size_bytes.saturating_add(meta.len()),
                Err(err) => debug!("Failed to stat {:?}: {}", file, err),
            }
        }
        item.size_bytes = size_bytes;
    }

    fn load_from_store(&self, item: &mut MediaItem) {
        if item.name.is_empty() {
            let (name, year) = split_title_year(&display_name(item));
            item.name = name;
            if item.year.is_none() {
                item.year = year;
            }
        }
    }
}

/// Disc images are named after the folder holding the disc layout, items in
/// their own folder after that folder, everything else after the first
/// file with its part marker removed.
fn display_name(item: &MediaItem) -> String {
    let Some(first) = item.first_file() else {
        return String::new();
    };
    if disc_kind_of(first).is_some() {
        return ancestor_name(first, 2).unwrap_or_else(|| file_stem(first));
    }
    if item.in_separate_folder {
        return ancestor_name(first, 1).unwrap_or_else(|| file_stem(first));
    }

    let stem = file_stem(first);
    match part_marker_start(&stem) {
        Some(start) => {
            let name = stem[..start].trim_end_matches(|c: char| {
                c.is_whitespace() || matches!(c, '-' | '_' | '.' | '(' | '[')
            });
            if name.is_empty() {
                stem
            } else {
                name.to_string()
            }
        }
        None => stem,
    }
}

fn ancestor_name(path: &Path, levels: usize) -> Option<String> {
    let mut current = path;
    for _ in 0..levels {
        current = current.parent()?;
    }
    current.file_name().map(|s| s.to_string_lossy().to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn split_title_year(input: &str) -> (String, Option<i32>) {
    let trimmed = input.trim();
    if let Some((title, year)) = split_year_suffix(trimmed, '(', ')') {
        return (title.to_string(), Some(year));
    }
    if let Some((title, year)) = split_year_suffix(trimmed, '[', ']') {
        return (title.to_string(), Some(year));
    }
    (trimmed.to_string(), None)
}

fn split_year_suffix(input: &str, open: char, close: char) -> Option<(&str, i32)> {
    let trimmed = input.trim_end();
    if !trimmed.ends_with(close) {
        return None;
    }
    let open_idx = trimmed.rfind(open)?;
    let year_str = trimmed
        .get(open_idx + open.len_utf8()..trimmed.len() - close.len_utf8())?
        .trim();
    if year_str.len() != 4 || !year_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = year_str.parse::<i32>().ok()?;
    let title = trimmed[..open_idx].trim_end();
    if title.is_empty() {
        return None;
    }
    Some((title, year))
}
