//! Asset Slots: the model and image the user picked.
//!
//! The image slot owns a preview handle obtained from a `PreviewStore`.
//! Handles are wrapped in a `PreviewLease` whose `Drop` releases them, so the
//! acquire/release pair lives at a single ownership site:
//! - replacing the file drops the old lease before acquiring a new one
//! - clearing the slot drops the lease
//! - dropping the slot (session teardown) drops the lease
//!
//! A lease is not `Clone`, which makes a double release unrepresentable.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AssetError;

/// Identifier of a preview resource inside a `PreviewStore`.
pub type PreviewId = u64;

/// Backing store for previewable resources (GPU textures in the UI).
///
/// Handles are a finite resource and must be released explicitly.
pub trait PreviewStore: Send + Sync {
    /// Create a previewable resource for `file`.
    fn acquire(&self, file: &SelectedFile) -> Result<PreviewId, String>;

    /// Destroy a resource previously returned by `acquire`.
    fn release(&self, id: PreviewId);
}

/// Owned preview handle. Releasing happens exactly once, on drop.
pub struct PreviewLease {
    id: PreviewId,
    store: Arc<dyn PreviewStore>,
}

impl PreviewLease {
    pub fn acquire(store: &Arc<dyn PreviewStore>, file: &SelectedFile) -> Result<Self, String> {
        let id = store.acquire(file)?;
        Ok(PreviewLease {
            id,
            store: Arc::clone(store),
        })
    }

    pub fn id(&self) -> PreviewId {
        self.id
    }
}

impl Drop for PreviewLease {
    fn drop(&mut self) {
        log::debug!("[Asset] Releasing preview {}", self.id);
        self.store.release(self.id);
    }
}

impl fmt::Debug for PreviewLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewLease").field("id", &self.id).finish()
    }
}

/// A user-selected file, read into memory at selection time.
#[derive(Clone)]
pub struct SelectedFile {
    /// File name sent as the multipart part's filename
    pub name: String,
    /// Where the file came from (empty for in-memory fixtures)
    pub path: PathBuf,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    /// Read a file chosen through the OS picker.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| AssetError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.bin".to_string());
        Ok(SelectedFile {
            name,
            path: path.to_path_buf(),
            bytes: bytes.into(),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        SelectedFile {
            name: name.into(),
            path: PathBuf::new(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Marker trait for the two asset kinds.
pub trait AssetKind {
    const NAME: &'static str;
}

/// Trained model weights (`.pt`).
#[derive(Debug)]
pub struct ModelAsset;

/// Image to analyze.
#[derive(Debug)]
pub struct ImageAsset;

impl AssetKind for ModelAsset {
    const NAME: &'static str = "model";
}

impl AssetKind for ImageAsset {
    const NAME: &'static str = "image";
}

/// One selected asset plus, for images, its preview lease.
pub struct AssetSlot<K: AssetKind> {
    file: Option<SelectedFile>,
    preview: Option<PreviewLease>,
    previews: Option<Arc<dyn PreviewStore>>,
    _kind: PhantomData<K>,
}

impl<K: AssetKind> fmt::Debug for AssetSlot<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetSlot")
            .field("kind", &K::NAME)
            .field("file", &self.file)
            .field("preview", &self.preview)
            .finish()
    }
}

impl AssetSlot<ModelAsset> {
    pub fn new() -> Self {
        AssetSlot {
            file: None,
            preview: None,
            previews: None,
            _kind: PhantomData,
        }
    }
}

impl Default for AssetSlot<ModelAsset> {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSlot<ImageAsset> {
    pub fn with_previews(previews: Arc<dyn PreviewStore>) -> Self {
        AssetSlot {
            file: None,
            preview: None,
            previews: Some(previews),
            _kind: PhantomData,
        }
    }

    /// Preview handle of the current image, if one could be created.
    pub fn preview(&self) -> Option<PreviewId> {
        self.preview.as_ref().map(PreviewLease::id)
    }
}

impl<K: AssetKind> AssetSlot<K> {
    /// Store a new selection. `None` (cancelled picker) is a no-op.
    ///
    /// Returns whether the slot changed.
    pub fn select(&mut self, file: Option<SelectedFile>) -> bool {
        let Some(file) = file else {
            log::debug!("[Asset] {} selection cancelled", K::NAME);
            return false;
        };

        // Old lease must go before the new one is acquired.
        self.preview = None;

        if let Some(store) = &self.previews {
            match PreviewLease::acquire(store, &file) {
                Ok(lease) => self.preview = Some(lease),
                Err(e) => log::warn!("[Asset] No preview for '{}': {}", file.name, e),
            }
        }

        log::info!("[Asset] Selected {} '{}' ({} bytes)", K::NAME, file.name, file.len());
        self.file = Some(file);
        true
    }

    /// Drop the file and release its preview.
    pub fn clear(&mut self) {
        self.preview = None;
        self.file = None;
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.file.is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Preview store that records every acquire/release.
    #[derive(Default)]
    pub(crate) struct RecordingStore {
        pub next: Mutex<PreviewId>,
        pub live: Mutex<HashSet<PreviewId>>,
        pub released: Mutex<Vec<PreviewId>>,
        pub fail_names: Mutex<HashSet<String>>,
    }

    impl PreviewStore for RecordingStore {
        fn acquire(&self, file: &SelectedFile) -> Result<PreviewId, String> {
            if self.fail_names.lock().unwrap().contains(&file.name) {
                return Err("undecodable".to_string());
            }
            let mut next = self.next.lock().unwrap();
            *next += 1;
            self.live.lock().unwrap().insert(*next);
            Ok(*next)
        }

        fn release(&self, id: PreviewId) {
            assert!(self.live.lock().unwrap().remove(&id), "double release of {}", id);
            self.released.lock().unwrap().push(id);
        }
    }

    fn image(name: &str) -> Option<SelectedFile> {
        Some(SelectedFile::from_bytes(name, vec![1u8, 2, 3]))
    }

    #[test]
    fn test_model_slot_has_no_preview() {
        let mut slot = AssetSlot::<ModelAsset>::new();
        assert!(slot.select(Some(SelectedFile::from_bytes("m.pt", vec![0u8; 4]))));
        assert!(slot.is_selected());
        assert_eq!(slot.file().unwrap().name, "m.pt");
    }

    #[test]
    fn test_cancelled_selection_is_noop() {
        let store = Arc::new(RecordingStore::default());
        let mut slot = AssetSlot::with_previews(store.clone());
        assert!(slot.select(image("a.png")));
        let before = slot.preview();

        assert!(!slot.select(None));
        assert_eq!(slot.preview(), before);
        assert_eq!(slot.file().unwrap().name, "a.png");
        assert!(store.released.lock().unwrap().is_empty());
    }

    #[test]
    fn test_replacing_image_releases_exactly_one() {
        let store = Arc::new(RecordingStore::default());
        let mut slot = AssetSlot::with_previews(store.clone());

        slot.select(image("a.png"));
        assert_eq!(store.released.lock().unwrap().len(), 0);
        let first = slot.preview().unwrap();

        slot.select(image("b.png"));
        assert_eq!(*store.released.lock().unwrap(), vec![first]);
        assert_eq!(store.live.lock().unwrap().len(), 1);
        assert_ne!(slot.preview().unwrap(), first);
    }

    #[test]
    fn test_clear_and_drop_release_once() {
        let store = Arc::new(RecordingStore::default());
        {
            let mut slot = AssetSlot::with_previews(store.clone());
            slot.select(image("a.png"));
            slot.clear();
            assert!(slot.preview().is_none());
            assert!(!slot.is_selected());
            slot.clear();

            slot.select(image("b.png"));
        }
        assert_eq!(store.released.lock().unwrap().len(), 2);
        assert!(store.live.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_preview_still_selects_file() {
        let store = Arc::new(RecordingStore::default());
        store.fail_names.lock().unwrap().insert("broken.png".to_string());
        let mut slot = AssetSlot::with_previews(store.clone());

        slot.select(image("a.png"));
        slot.select(image("broken.png"));

        assert!(slot.preview().is_none());
        assert_eq!(slot.file().unwrap().name, "broken.png");
        assert_eq!(store.released.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.pt");
        std::fs::write(&path, b"fake weights").unwrap();

        let file = SelectedFile::read(&path).unwrap();
        assert_eq!(file.name, "weights.pt");
        assert_eq!(&*file.bytes, b"fake weights");
    }

    #[test]
    fn test_read_missing_file() {
        let err = SelectedFile::read("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
    }
}
