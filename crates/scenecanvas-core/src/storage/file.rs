//! One JSON file per drawing, for native hosts.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::DrawingDocument;
use std::fs;
use std::future::ready;
use std::io;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// Directory-backed storage: the drawing for key `k` lives in `<dir>/<k>.json`,
/// with characters outside `[A-Za-z0-9_-]` in the key replaced by `_`.
pub struct FileStorage {
    dir: PathBuf,
}

fn io_error(action: &str, path: &Path, err: io::Error) -> StorageError {
    StorageError::Io(format!("{} {}: {}", action, path.display(), err))
}

/// File stem for a storage key.
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            c if c.is_alphanumeric() => c,
            '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

impl FileStorage {
    /// Storage rooted at `dir`, which is created when missing.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error("creating", &dir, e))?;
        Ok(Self { dir })
    }

    /// Storage under the platform data directory, e.g.
    /// `~/.local/share/scenecanvas/drawings` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Other("no data or home directory".to_string()))?;
        Self::new(data_dir.join("scenecanvas").join("drawings"))
    }

    pub fn base_path(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", file_stem(key), EXTENSION))
    }

    fn write(&self, key: &str, document: &DrawingDocument) -> StorageResult<()> {
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let path = self.path_for(key);
        fs::write(&path, json).map_err(|e| io_error("writing", &path, e))?;
        log::info!("Saved drawing to {}", path.display());
        Ok(())
    }

    fn read(&self, key: &str) -> StorageResult<DrawingDocument> {
        let path = self.path_for(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(io_error("reading", &path, e)),
        };
        DrawingDocument::from_json(&json)
            .map_err(|e| StorageError::Serialization(format!("{}: {}", path.display(), e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_error("removing", &path, e)),
            _ => Ok(()),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("listing", &self.dir, e)),
        };
        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_owned))
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }
}

impl Storage for FileStorage {
    fn save(&self, key: &str, document: &DrawingDocument) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(ready(self.write(key, document)))
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<DrawingDocument>> {
        Box::pin(ready(self.read(key)))
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(ready(self.remove(key)))
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(ready(self.keys()))
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        Box::pin(ready(Ok(self.path_for(key).is_file())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ViewportSnapshot;
    use crate::elements::Label;
    use kurbo::Point;
    use tempfile::tempdir;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker { dummy_raw_waker() }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let doc = DrawingDocument::new(
            ViewportSnapshot {
                offset_x: 12.0,
                offset_y: 0.0,
                scale: 1.5,
            },
            vec![Label::new(Point::new(3.0, 4.0), "Wardrobe").into()],
        );

        block_on(storage.save("bedroom", &doc)).unwrap();
        let loaded = block_on(storage.load("bedroom")).unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_only_json() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let doc = DrawingDocument::default();
        block_on(storage.save("doc2", &doc)).unwrap();
        block_on(storage.save("doc1", &doc)).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list, vec!["doc1".to_string(), "doc2".to_string()]);
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        block_on(storage.save("test", &DrawingDocument::default())).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());

        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_key() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        block_on(storage.save("room/1:a*b", &DrawingDocument::default())).unwrap();
        assert!(dir.path().join("room_1_a_b.json").exists());
        assert!(block_on(storage.load("room/1:a*b")).is_ok());
    }

    #[test]
    fn test_file_stem_keeps_safe_characters() {
        assert_eq!(file_stem("living-room_2"), "living-room_2");
        assert_eq!(file_stem("a.b c"), "a_b_c");
    }

    #[test]
    fn test_delete_missing_key_succeeds() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(block_on(storage.delete("never-saved")).is_ok());
    }

    #[test]
    fn test_file_storage_tolerates_partial_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(
            dir.path().join("old.json"),
            r#"{"elements": [{"type": "line", "x2": 10}]}"#,
        )
        .unwrap();

        let doc = block_on(storage.load("old")).unwrap();
        assert_eq!(doc.elements.len(), 1);
        assert_eq!(doc.viewport, ViewportSnapshot::default());
    }
}
