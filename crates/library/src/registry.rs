use std::fs;
use std::path::Path;

use common::ScanRoot;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct DirectoryRegistry {
    roots: Vec<ScanRoot>,
}

impl DirectoryRegistry {
    pub fn new(directories: Vec<ScanRoot>) -> Self {
        let mut registry = Self::default();
        registry.set_directories(directories);
        registry
    }

    pub fn set_directories(&mut self, directories: Vec<ScanRoot>) {
        self.roots.clear();
        for dir in directories {
            if is_readable(&dir.path) {
                debug!("Adding directory {:?}", dir.path);
                self.roots.push(dir);
            } else {
                debug!("Directory is not readable, skipping: {:?}", dir.path);
            }
        }
    }

    pub fn roots(&self) -> &[ScanRoot] {
        &self.roots
    }

    /// Longest string prefix wins, so `/media/movies2/x.mkv` belongs to a
    /// root at `/media/movies` when nothing longer matches.
    pub fn owning_root(&self, file: &Path) -> Option<&ScanRoot> {
        let file = file.to_string_lossy();
        let mut best: Option<(&ScanRoot, usize)> = None;
        for root in &self.roots {
            let key = root.key();
            if !file.starts_with(key.as_str()) {
                continue;
            }
            match best {
                Some((_, len)) if len >= key.len() => {}
                _ => best = Some((root, key.len())),
            }
        }
        best.map(|(root, _)| root)
    }
}

fn is_readable(path: &Path) -> bool {
    fs::read_dir(path).is_ok()
}
