use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use common::{relpath_from, FileGroup};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::abort::AbortHandle;
use crate::classify::{classify, is_excluded_dir, is_skipped_file, DirClass};
use crate::events::SearchEvents;
use crate::filter::FileFilter;
use crate::grouper::group_parts;

pub struct DirectoryWalker<'a> {
    filter: &'a FileFilter,
    abort: &'a AbortHandle,
    events: &'a dyn SearchEvents,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(
        filter: &'a FileFilter,
        abort: &'a AbortHandle,
        events: &'a dyn SearchEvents,
    ) -> Self {
        Self {
            filter,
            abort,
            events,
        }
    }

    pub fn walk(&self, root: &Path, separate_folders: bool) -> Vec<FileGroup> {
        let mut groups = Vec::new();
        let mut visited = HashSet::new();
        if let Ok(canonical) = fs::canonicalize(root) {
            visited.insert(canonical);
        }
        self.scan_dir(root, root, &mut groups, &mut visited, separate_folders, true);
        groups
    }

    // `first_scan` lets separate-folder roots enter their first level only.
    fn scan_dir(
        &self,
        root: &Path,
        path: &Path,
        groups: &mut Vec<FileGroup>,
        visited: &mut HashSet<PathBuf>,
        separate_folders: bool,
        first_scan: bool,
    ) {
        let relpath = relpath_from(root, path).unwrap_or_default();
        self.events.on_entered_directory(&relpath);

        for dir in subdirectories(path) {
            if self.abort.is_aborted() {
                return;
            }
            let excluded = dir
                .file_name()
                .map(|name| is_excluded_dir(&name.to_string_lossy()))
                .unwrap_or(true);
            if excluded {
                continue;
            }

            if let DirClass::DiscImage { index_file, .. } = classify(&dir) {
                groups.push(FileGroup::single(index_file));
                continue;
            }

            if separate_folders && !first_scan {
                continue;
            }
            match fs::canonicalize(&dir) {
                Ok(canonical) => {
                    if !visited.insert(canonical) {
                        debug!("Already scanned {:?}; skipping", dir);
                        continue;
                    }
                }
                Err(err) => {
                    warn!("Failed to resolve {:?}: {}", dir, err);
                    continue;
                }
            }
            self.scan_dir(root, &dir, groups, visited, separate_folders, false);
        }

        let mut files = Vec::new();
        for name in self.filter.files(path) {
            if self.abort.is_aborted() {
                return;
            }
            if is_skipped_file(&name) {
                continue;
            }
            files.push(name);
        }
        files.sort();

        if separate_folders {
            if !files.is_empty() {
                groups.push(FileGroup::new(
                    files.iter().map(|name| path.join(name)).collect(),
                ));
            }
            return;
        }

        for parts in group_parts(&files) {
            if self.abort.is_aborted() {
                return;
            }
            groups.push(FileGroup::new(
                parts.iter().map(|name| path.join(name)).collect(),
            ));
        }
    }
}

fn subdirectories(path: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => {
                // Symlinked directories count; dangling links do not.
                if entry.file_type().is_dir() || entry.path().is_dir() {
                    dirs.push(entry.into_path());
                }
            }
            Err(err) => warn!("Failed to list directories in {:?}: {}", path, err),
        }
    }
    dirs
}
