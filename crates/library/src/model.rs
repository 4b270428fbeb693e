use std::sync::Arc;

use common::MediaItem;
use parking_lot::RwLock;

#[derive(Clone, Default)]
pub struct MediaModel {
    items: Arc<RwLock<Vec<MediaItem>>>,
}

impl MediaModel {
    pub fn clear(&self) {
        self.items.write().clear();
    }

    pub fn add_item(&self, item: MediaItem) {
        self.items.write().push(item);
    }

    pub fn items(&self) -> Vec<MediaItem> {
        self.items.read().clone()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
