use anyhow::{Context, anyhow};
use imagecap_core::types::{PreviewHandle, PreviewId, SelectedFile};
use imagecap_engine::traits::PreviewResources;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Preview registry backed by a private temp directory.
///
/// Each handle points at a copy of the image that an external viewer can
/// open. Releasing a handle deletes its copy; dropping the registry removes
/// the whole directory.
#[derive(Debug)]
pub struct TempFilePreviews {
    dir: tempfile::TempDir,
    live: Mutex<HashMap<PreviewId, PathBuf>>,
}

impl TempFilePreviews {
    pub fn new() -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("imagecap-preview-")
            .tempdir()
            .context("create preview directory")?;
        Ok(Self {
            dir,
            live: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn live_count(&self) -> usize {
        self.live().len()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<PreviewId, PathBuf>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreviewResources for TempFilePreviews {
    fn create(&self, file: &SelectedFile) -> anyhow::Result<PreviewHandle> {
        let id = PreviewId::new();

        // Only the extension survives; user filenames may contain anything.
        let ext = Path::new(&file.filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("img");
        let path = self.dir.path().join(format!("preview-{}.{}", id.0, ext));

        std::fs::write(&path, &file.bytes)
            .with_context(|| format!("write preview: {}", path.display()))?;

        debug!("created preview {}", path.display());
        let location = path.display().to_string();
        self.live().insert(id, path);
        Ok(PreviewHandle { id, location })
    }

    fn release(&self, handle: &PreviewHandle) -> anyhow::Result<()> {
        let path = self
            .live()
            .remove(&handle.id)
            .ok_or_else(|| anyhow!("unknown or already released preview: {}", handle.location))?;

        std::fs::remove_file(&path)
            .with_context(|| format!("remove preview: {}", path.display()))?;
        debug!("released preview {}", path.display());
        Ok(())
    }
}
