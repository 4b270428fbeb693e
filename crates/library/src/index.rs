use std::fs;
use std::path::Path;
use std::sync::Arc;

use common::{MediaItem, MediaKind};
use redb::{Database, ReadableTable, TableDefinition, TableError, WriteTransaction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::LibraryError;

const INDEX_VERSION: u32 = 1;
const KEY_SEP: char = '\x1f';

const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");
const ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("items");

const META_VERSION_KEY: &str = "version";

#[derive(Clone)]
pub struct MediaIndex {
    db: Arc<Database>,
}

impl MediaIndex {
    pub fn open(path: &Path) -> Result<Self, LibraryError> {
        let db = open_or_create_db(path)?;
        let index = Self { db: Arc::new(db) };

        match read_version(&index.db)? {
            Some(version) if version == INDEX_VERSION => {
                info!("Loaded media index from {:?}", path);
            }
            Some(version) => {
                warn!("Index version mismatch ({}); dropping stored items", version);
                index.reset()?;
            }
            None => {
                info!("Index missing; creating {:?}", path);
                index.reset()?;
            }
        }

        Ok(index)
    }

    pub fn items(&self, kind: MediaKind, root: &str) -> Result<Vec<MediaItem>, LibraryError> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(ITEMS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let prefix = root_prefix(kind, root);
        let mut end = prefix.clone();
        end.push('\u{10ffff}');

        let mut items = Vec::new();
        for entry in table.range(prefix.as_str()..end.as_str())? {
            let entry = entry?;
            let item: MediaItem = decode_value(entry.1.value())?;
            items.push(item);
        }
        Ok(items)
    }

    pub fn count(&self, kind: MediaKind) -> Result<usize, LibraryError> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(ITEMS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        let prefix = kind_prefix(kind);
        let mut end = prefix.clone();
        end.push('\u{10ffff}');

        let mut total = 0usize;
        for entry in table.range(prefix.as_str()..end.as_str())? {
            entry?;
            total += 1;
        }
        Ok(total)
    }

    pub fn clear_all(&self, kind: MediaKind) -> Result<usize, LibraryError> {
        let removed = self.remove_prefix(&kind_prefix(kind))?;
        debug!("Cleared {} stored {}", removed, kind.label());
        Ok(removed)
    }

    pub fn clear(&self, kind: MediaKind, root: &str) -> Result<usize, LibraryError> {
        let removed = self.remove_prefix(&root_prefix(kind, root))?;
        debug!("Cleared {} stored {} under {:?}", removed, kind.label(), root);
        Ok(removed)
    }

    /// Nothing added to the batch is visible until it is committed. Dropping
    /// it discards it.
    pub fn begin(&self) -> Result<IndexBatch<'_>, LibraryError> {
        let txn = self.db.begin_write()?;
        Ok(IndexBatch { txn, added: 0 })
    }

    fn remove_prefix(&self, prefix: &str) -> Result<usize, LibraryError> {
        let mut end = prefix.to_string();
        end.push('\u{10ffff}');

        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ITEMS_TABLE)?;
            let mut keys = Vec::new();
            for entry in table.range(prefix..end.as_str())? {
                let entry = entry?;
                keys.push(entry.0.value().to_string());
            }
            for key in &keys {
                table.remove(key.as_str())?;
            }
            keys.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn reset(&self) -> Result<(), LibraryError> {
        let write_txn = self.db.begin_write()?;
        clear_table(&write_txn, META_TABLE)?;
        clear_table(&write_txn, ITEMS_TABLE)?;
        {
            let mut meta_table = write_txn.open_table(META_TABLE)?;
            let version_bytes = encode_value(&INDEX_VERSION)?;
            meta_table.insert(META_VERSION_KEY, version_bytes.as_slice())?;
            write_txn.open_table(ITEMS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

pub struct IndexBatch<'db> {
    txn: WriteTransaction<'db>,
    added: usize,
}

impl IndexBatch<'_> {
    pub fn add(&mut self, item: &MediaItem, root: &str) -> Result<(), LibraryError> {
        let Some(first) = item.files.first() else {
            return Ok(());
        };
        let key = item_key(item.kind, root, first);
        let bytes = encode_value(item)?;
        let mut table = self.txn.open_table(ITEMS_TABLE)?;
        table.insert(key.as_str(), bytes.as_slice())?;
        self.added += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.added
    }

    pub fn is_empty(&self) -> bool {
        self.added == 0
    }

    pub fn commit(self) -> Result<usize, LibraryError> {
        self.txn.commit()?;
        Ok(self.added)
    }

    pub fn discard(self) -> Result<(), LibraryError> {
        self.txn.abort()?;
        Ok(())
    }
}

fn open_or_create_db(path: &Path) -> Result<Database, LibraryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    if path.exists() {
        Ok(Database::open(path)?)
    } else {
        Ok(Database::create(path)?)
    }
}

fn read_version(db: &Database) -> Result<Option<u32>, LibraryError> {
    let read_txn = db.begin_read()?;
    let table = match read_txn.open_table(META_TABLE) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let version = match table.get(META_VERSION_KEY)? {
        Some(value) => Some(decode_value(value.value())?),
        None => None,
    };
    Ok(version)
}

fn clear_table(
    txn: &WriteTransaction<'_>,
    table: TableDefinition<&str, &[u8]>,
) -> Result<(), LibraryError> {
    match txn.delete_table(table) {
        Ok(_) => Ok(()),
        Err(TableError::TableDoesNotExist(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn kind_prefix(kind: MediaKind) -> String {
    let mut key = String::with_capacity(kind.key().len() + 1);
    key.push_str(kind.key());
    key.push(KEY_SEP);
    key
}

fn root_prefix(kind: MediaKind, root: &str) -> String {
    let mut key = kind_prefix(kind);
    key.push_str(root);
    key.push(KEY_SEP);
    key
}

fn item_key(kind: MediaKind, root: &str, first_file: &str) -> String {
    let mut key = root_prefix(kind, root);
    key.push_str(first_file);
    key
}

fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, LibraryError> {
    Ok(bincode::serialize(value)?)
}

fn decode_value<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, LibraryError> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::FileGroup;
    use std::path::PathBuf;

    fn item(kind: MediaKind, file: &str) -> MediaItem {
        let mut item = MediaItem::from_group(kind, &FileGroup::single(PathBuf::from(file)));
        item.name = file.to_string();
        item
    }

    fn open(temp: &tempfile::TempDir) -> MediaIndex {
        MediaIndex::open(&temp.path().join("db").join("media.redb")).unwrap()
    }

    #[test]
    fn items_are_scoped_by_kind_and_root() {
        let temp = tempfile::tempdir().unwrap();
        let index = open(&temp);

        let mut batch = index.begin().unwrap();
        batch.add(&item(MediaKind::Concert, "/media/b.mkv"), "/media").unwrap();
        batch.add(&item(MediaKind::Concert, "/media/a.mkv"), "/media").unwrap();
        batch
            .add(&item(MediaKind::Concert, "/media/movies/c.mkv"), "/media/movies")
            .unwrap();
        batch.add(&item(MediaKind::Movie, "/media/d.mkv"), "/media").unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.commit().unwrap(), 4);

        let concerts = index.items(MediaKind::Concert, "/media").unwrap();
        let files: Vec<&str> = concerts.iter().map(|i| i.files[0].as_str()).collect();
        assert_eq!(files, vec!["/media/a.mkv", "/media/b.mkv"]);
        assert_eq!(index.items(MediaKind::Concert, "/media/movies").unwrap().len(), 1);
        assert_eq!(index.items(MediaKind::Movie, "/media").unwrap().len(), 1);
        assert_eq!(index.count(MediaKind::Concert).unwrap(), 3);
        assert!(index.items(MediaKind::TvShow, "/media").unwrap().is_empty());
    }

    #[test]
    fn clear_removes_only_the_given_scope() {
        let temp = tempfile::tempdir().unwrap();
        let index = open(&temp);

        let mut batch = index.begin().unwrap();
        batch.add(&item(MediaKind::Concert, "/a/1.mkv"), "/a").unwrap();
        batch.add(&item(MediaKind::Concert, "/b/2.mkv"), "/b").unwrap();
        batch.add(&item(MediaKind::Movie, "/a/3.mkv"), "/a").unwrap();
        batch.commit().unwrap();

        assert_eq!(index.clear(MediaKind::Concert, "/a").unwrap(), 1);
        assert!(index.items(MediaKind::Concert, "/a").unwrap().is_empty());
        assert_eq!(index.items(MediaKind::Concert, "/b").unwrap().len(), 1);
        assert_eq!(index.items(MediaKind::Movie, "/a").unwrap().len(), 1);

        assert_eq!(index.clear_all(MediaKind::Concert).unwrap(), 1);
        assert_eq!(index.count(MediaKind::Concert).unwrap(), 0);
        assert_eq!(index.count(MediaKind::Movie).unwrap(), 1);
    }

    #[test]
    fn uncommitted_batches_leave_no_trace() {
        let temp = tempfile::tempdir().unwrap();
        let index = open(&temp);

        let mut batch = index.begin().unwrap();
        batch.add(&item(MediaKind::Concert, "/a/1.mkv"), "/a").unwrap();
        batch.discard().unwrap();
        assert_eq!(index.count(MediaKind::Concert).unwrap(), 0);

        {
            let mut batch = index.begin().unwrap();
            batch.add(&item(MediaKind::Concert, "/a/2.mkv"), "/a").unwrap();
        }
        assert_eq!(index.count(MediaKind::Concert).unwrap(), 0);
    }

    #[test]
    fn same_first_file_replaces_the_item() {
        let temp = tempfile::tempdir().unwrap();
        let index = open(&temp);

        let mut first = item(MediaKind::Movie, "/a/1.mkv");
        let mut batch = index.begin().unwrap();
        batch.add(&first, "/a").unwrap();
        first.name = "Renamed".to_string();
        batch.add(&first, "/a").unwrap();
        batch.commit().unwrap();

        let items = index.items(MediaKind::Movie, "/a").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Renamed");
    }

    #[test]
    fn reopening_keeps_items() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("media.redb");
        {
            let index = MediaIndex::open(&path).unwrap();
            let mut batch = index.begin().unwrap();
            batch.add(&item(MediaKind::TvShow, "/tv/x.mkv"), "/tv").unwrap();
            batch.commit().unwrap();
        }
        let index = MediaIndex::open(&path).unwrap();
        assert_eq!(index.items(MediaKind::TvShow, "/tv").unwrap().len(), 1);
    }
}
