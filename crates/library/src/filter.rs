use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::warn;
use walkdir::WalkDir;

pub const DEFAULT_VIDEO_PATTERNS: &[&str] = &[
    "*.mkv",
    "*.mk3d",
    "*.avi",
    "*.mpg",
    "*.mpeg",
    "*.mp4",
    "*.m2ts",
    "*.disc",
    "*.m4v",
    "*.strm",
    "*.dat",
    "*.flv",
    "*.vob",
    "*.ts",
    "*.iso",
    "*.ogg",
    "*.ogm",
    "*.rmvb",
    "*.img",
    "*.wmv",
    "*.mov",
    "*.divx",
    "VIDEO_TS.IFO",
    "index.bdmv",
    "*.wtv",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Clone, Debug)]
pub struct FileFilter {
    patterns: Vec<Pattern>,
}

impl FileFilter {
    /// Invalid patterns are logged and left out.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|glob| {
                let glob = glob.as_ref().trim();
                if glob.is_empty() {
                    return None;
                }
                match Pattern::new(glob) {
                    Ok(pattern) => Some(pattern),
                    Err(err) => {
                        warn!("Invalid file filter '{}': {}", glob, err);
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn video() -> Self {
        Self::new(DEFAULT_VIDEO_PATTERNS)
    }

    pub fn patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|pattern| pattern.as_str().to_string())
            .collect()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(name, MATCH_OPTIONS))
    }

    /// An unreadable directory lists as empty.
    pub fn files(&self, dir: &Path) -> Vec<String> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .follow_links(false)
            .min_depth(1)
            .max_depth(1)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Failed to list files in {:?}: {}", dir, err);
                    continue;
                }
            };
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if self.matches(&name) {
                files.push(name);
            }
        }
        files.sort();
        files
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::video()
    }
}
