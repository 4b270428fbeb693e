use std::sync::Arc;

use common::{FileGroup, MediaItem, MediaKind, ScanRoot};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::abort::AbortHandle;
use crate::details::{DetailLoader, FileDetails};
use crate::events::{SearchEvents, SilentEvents};
use crate::filter::FileFilter;
use crate::index::MediaIndex;
use crate::model::MediaModel;
use crate::registry::DirectoryRegistry;
use crate::walker::DirectoryWalker;
use crate::LibraryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Clearing,
    Scanning,
    Storing,
    Loading,
    Presenting,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadStats {
    pub groups: usize,
    pub stored: usize,
    pub loaded: usize,
    pub aborted: bool,
}

pub struct FileSearcher {
    kind: MediaKind,
    registry: DirectoryRegistry,
    filter: FileFilter,
    index: MediaIndex,
    model: MediaModel,
    loader: Arc<dyn DetailLoader>,
    events: Arc<dyn SearchEvents>,
    abort: AbortHandle,
    phase: Mutex<SearchPhase>,
}

impl FileSearcher {
    pub fn new(kind: MediaKind, index: MediaIndex, model: MediaModel) -> Self {
        Self {
            kind,
            registry: DirectoryRegistry::default(),
            filter: FileFilter::video(),
            index,
            model,
            loader: Arc::new(FileDetails),
            events: Arc::new(SilentEvents),
            abort: AbortHandle::new(),
            phase: Mutex::new(SearchPhase::Idle),
        }
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn DetailLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn SearchEvents>) -> Self {
        self.events = events;
        self
    }

    pub fn set_directories(&mut self, directories: Vec<ScanRoot>) {
        self.registry.set_directories(directories);
    }

    pub fn directories(&self) -> &[ScanRoot] {
        self.registry.roots()
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn model(&self) -> &MediaModel {
        &self.model
    }

    pub fn phase(&self) -> SearchPhase {
        *self.phase.lock()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn reload(&self, force: bool) -> Result<ReloadStats, LibraryError> {
        let result = self.run_reload(force);
        self.set_phase(SearchPhase::Idle);
        result
    }

    fn run_reload(&self, force: bool) -> Result<ReloadStats, LibraryError> {
        self.abort.reset();
        let mut stats = ReloadStats::default();
        let label = self.kind.label();

        self.set_phase(SearchPhase::Clearing);
        self.clear_old_items(force)?;

        self.set_phase(SearchPhase::Scanning);
        self.events.on_search_started(&format!("Searching for {}...", label));
        let groups = self.scan_directories(force)?;
        stats.groups = groups.len();
        if self.abort.is_aborted() {
            return Ok(self.aborted(stats));
        }

        self.set_phase(SearchPhase::Storing);
        match self.store_groups(&groups)? {
            Some(stored) => stats.stored = stored,
            None => return Ok(self.aborted(stats)),
        }

        self.events.on_entered_directory("");
        self.events.on_search_started(&format!("Loading {}...", label));
        self.set_phase(SearchPhase::Loading);
        let items = self.load_stored_items()?;
        stats.loaded = items.len();
        if self.abort.is_aborted() {
            return Ok(self.aborted(stats));
        }

        self.set_phase(SearchPhase::Presenting);
        for item in items {
            self.model.add_item(item);
        }

        info!(
            "Searching for {} done: {} found, {} stored, {} loaded",
            label, stats.groups, stats.stored, stats.loaded
        );
        self.events.on_search_complete(self.kind, stats.loaded);
        Ok(stats)
    }

    fn clear_old_items(&self, force: bool) -> Result<(), LibraryError> {
        if force {
            self.index.clear_all(self.kind)?;
        }

        self.model.clear();

        for root in self.registry.roots() {
            if root.auto_reload || force {
                self.index.clear(self.kind, &root.key())?;
            }
        }
        Ok(())
    }

    fn scan_directories(&self, force: bool) -> Result<Vec<FileGroup>, LibraryError> {
        let walker = DirectoryWalker::new(&self.filter, &self.abort, self.events.as_ref());
        let mut groups = Vec::new();
        for root in self.registry.roots() {
            let stored = self.index.items(self.kind, &root.key())?;
            if root.auto_reload || force || stored.is_empty() {
                info!("Scanning {:?} for {}", root.path, self.kind.label());
                groups.extend(walker.walk(&root.path, root.separate_folders));
            } else {
                debug!(
                    "Reusing {} stored {} from {:?}",
                    stored.len(),
                    self.kind.label(),
                    root.path
                );
            }
        }
        Ok(groups)
    }

    fn store_groups(&self, groups: &[FileGroup]) -> Result<Option<usize>, LibraryError> {
        let mut batch = self.index.begin()?;
        for group in groups {
            if self.abort.is_aborted() {
                info!("Aborted; discarding {} unsaved {}", batch.len(), self.kind.label());
                batch.discard()?;
                return Ok(None);
            }

            let Some(first) = group.first() else {
                continue;
            };
            let Some(root) = self.registry.owning_root(first) else {
                warn!("No configured directory contains {:?}; skipping", first);
                continue;
            };

            let mut item = MediaItem::from_group(self.kind, group);
            item.in_separate_folder = root.separate_folders;
            self.loader.load_from_disk(&mut item);
            self.events.on_current_item(&item.name);
            batch.add(&item, &root.key())?;
        }
        let stored = batch.commit()?;
        Ok(Some(stored))
    }

    fn load_stored_items(&self) -> Result<Vec<MediaItem>, LibraryError> {
        let mut items = Vec::new();
        for root in self.registry.roots() {
            if self.abort.is_aborted() {
                break;
            }
            items.extend(self.index.items(self.kind, &root.key())?);
        }

        let total = items.len();
        for (i, item) in items.iter_mut().enumerate() {
            if self.abort.is_aborted() {
                break;
            }
            self.loader.load_from_store(item);
            self.events.on_current_item(&item.name);
            self.events.on_progress(i + 1, total, self.kind.progress_id());
        }
        Ok(items)
    }

    fn aborted(&self, mut stats: ReloadStats) -> ReloadStats {
        info!("Searching for {} aborted", self.kind.label());
        stats.aborted = true;
        stats
    }

    fn set_phase(&self, phase: SearchPhase) {
        let mut current = self.phase.lock();
        if *current != phase {
            debug!("{} search phase: {:?} -> {:?}", self.kind.label(), *current, phase);
            *current = phase;
        }
    }
}
