use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    TvShow,
    Concert,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Movie, MediaKind::TvShow, MediaKind::Concert];

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Movie => "Movies",
            MediaKind::TvShow => "TV Shows",
            MediaKind::Concert => "Concerts",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::TvShow => "tvshow",
            MediaKind::Concert => "concert",
        }
    }

    pub fn progress_id(self) -> u32 {
        match self {
            MediaKind::Movie => 10_001,
            MediaKind::TvShow => 10_002,
            MediaKind::Concert => 10_003,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscKind {
    Dvd,
    BluRay,
}

/// One configured directory to search for media.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRoot {
    pub path: PathBuf,
    #[serde(default)]
    pub auto_reload: bool,
    #[serde(default)]
    pub separate_folders: bool,
}

impl ScanRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            auto_reload: false,
            separate_folders: false,
        }
    }

    pub fn auto_reload(mut self, value: bool) -> Self {
        self.auto_reload = value;
        self
    }

    pub fn separate_folders(mut self, value: bool) -> Self {
        self.separate_folders = value;
        self
    }

    pub fn key(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileGroup {
    files: Vec<PathBuf>,
}

impl FileGroup {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn single(file: PathBuf) -> Self {
        Self { files: vec![file] }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn first(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub files: Vec<String>,
    pub in_separate_folder: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub disc: Option<DiscKind>,
    #[serde(default)]
    pub size_bytes: u64,
}

impl MediaItem {
    pub fn from_group(kind: MediaKind, group: &FileGroup) -> Self {
        let files: Vec<String> = group
            .files()
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect();
        let id = stable_id(files.first().map(String::as_str).unwrap_or_default());
        Self {
            id,
            kind,
            files,
            in_separate_folder: false,
            name: String::new(),
            year: None,
            disc: None,
            size_bytes: 0,
        }
    }

    pub fn first_file(&self) -> Option<&Path> {
        self.files.first().map(Path::new)
    }
}

pub fn stable_id(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

pub fn relpath_from(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(path_to_slash_string(rel))
}

fn path_to_slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_id_is_deterministic() {
        let first = stable_id("/media/Movie/Movie.mkv");
        let second = stable_id("/media/Movie/Movie.mkv");
        assert_eq!(first, second);
        assert_ne!(first, stable_id("/media/Movie/Movie2.mkv"));
    }

    #[test]
    fn item_from_group_keeps_file_order() {
        let group = FileGroup::new(vec![
            PathBuf::from("/media/Movie CD1.avi"),
            PathBuf::from("/media/Movie CD2.avi"),
        ]);
        let item = MediaItem::from_group(MediaKind::Movie, &group);
        assert_eq!(item.files, vec!["/media/Movie CD1.avi", "/media/Movie CD2.avi"]);
        assert_eq!(item.id, stable_id("/media/Movie CD1.avi"));
        assert_eq!(item.first_file(), Some(Path::new("/media/Movie CD1.avi")));
        assert!(!item.in_separate_folder);
    }

    #[test]
    fn relpath_uses_forward_slashes() {
        let root = Path::new("/media");
        assert_eq!(
            relpath_from(root, Path::new("/media/a/b")).as_deref(),
            Some("a/b")
        );
        assert_eq!(relpath_from(root, root).as_deref(), Some(""));
        assert_eq!(relpath_from(root, Path::new("/other")), None);
    }
}
