use common::MediaKind;

pub trait SearchEvents: Send + Sync {
    fn on_search_started(&self, _message: &str) {}
    /// The walker entered a directory; the path is relative to its root.
    fn on_entered_directory(&self, _path: &str) {}
    fn on_current_item(&self, _name: &str) {}
    fn on_progress(&self, _current: usize, _total: usize, _operation_id: u32) {}
    fn on_search_complete(&self, _kind: MediaKind, _count: usize) {}
}

pub struct SilentEvents;

impl SearchEvents for SilentEvents {}
