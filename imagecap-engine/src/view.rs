use crate::state::{ViewSnapshot, ViewState, ms};
use crate::traits::{CaptionProvider, CaptionReply, Clipboard, PreviewResources};
use imagecap_core::error::{ValidationError, ViewError};
use imagecap_core::status::RequestStatus;
use imagecap_core::text::{
    DEFAULT_FALLBACK_CAPTION, MSG_COPY_FAILED, MSG_NO_FILE, MSG_NOT_AN_IMAGE, MSG_PREVIEW_FAILED,
    backend_error_message, normalize_caption,
};
use imagecap_core::types::{FileInput, PreviewHandle, SelectedFile};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    // Shown when the caption request cannot complete.
    pub fallback_caption: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fallback_caption: DEFAULT_FALLBACK_CAPTION.into(),
        }
    }
}

/// The upload-and-caption screen: one selected image, one preview, at most
/// one outstanding caption request.
///
/// State sits behind a mutex that is never held across an `.await`, so the
/// other operations stay usable while a request is pending.
pub struct CaptionView {
    cfg: ViewConfig,
    previews: Arc<dyn PreviewResources>,
    clipboard: Arc<dyn Clipboard>,
    provider: Arc<dyn CaptionProvider>,
    state: Mutex<ViewState>,
    in_flight: AtomicBool,
    cancel: CancellationToken,
}

impl CaptionView {
    pub fn new(
        cfg: ViewConfig,
        previews: Arc<dyn PreviewResources>,
        clipboard: Arc<dyn Clipboard>,
        provider: Arc<dyn CaptionProvider>,
    ) -> Self {
        Self {
            cfg,
            previews,
            clipboard,
            provider,
            state: Mutex::new(ViewState::default()),
            in_flight: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state().snapshot()
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Handles a picker change. `None` means the picker was dismissed.
    pub fn select_file(&self, input: Option<FileInput>) -> Result<(), ViewError> {
        self.ensure_live()?;

        let mut st = self.state();
        st.error = None;

        let Some(input) = input else {
            return Ok(());
        };

        let filename = input.filename.clone();
        let Some(file) = SelectedFile::from_input(input) else {
            debug!("rejected non-image selection: {filename}");
            st.error = Some(MSG_NOT_AN_IMAGE.into());
            return Err(ValidationError::NotAnImage.into());
        };

        // Release first: never two live previews.
        if let Some(old) = st.preview.take() {
            self.release_preview(&old);
        }

        let handle = match self.previews.create(&file) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("preview creation failed for {}: {e:#}", file.filename);
                st.selected = None;
                st.picker_value = None;
                st.caption = None;
                st.error = Some(MSG_PREVIEW_FAILED.into());
                return Err(ViewError::Preview(e.to_string()));
            }
        };

        debug!(
            "selected {} ({}, {} bytes)",
            file.filename,
            file.media_type.as_str(),
            file.bytes.len()
        );
        st.preview = Some(handle);
        st.picker_value = Some(file.filename.clone());
        st.selected = Some(file);
        st.caption = None;
        if !st.status.is_in_flight() {
            st.status = RequestStatus::Idle;
        }
        Ok(())
    }

    /// Uploads the selected image and records the outcome.
    ///
    /// Returns the terminal status on success or fallback. Server rejections
    /// come back as `ViewError::Server` after the error slot has been set.
    pub async fn generate_caption(&self) -> Result<RequestStatus, ViewError> {
        self.ensure_live()?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("caption request already in flight");
            return Err(ViewError::Busy);
        }
        let _guard = InFlightGuard { view: self };

        let file = {
            let mut st = self.state();
            st.error = None;
            let Some(file) = st.selected.clone() else {
                st.error = Some(MSG_NO_FILE.into());
                return Err(ValidationError::NoFile.into());
            };
            st.status = RequestStatus::InFlight;
            st.caption = None;
            file
        };

        info!(
            "requesting caption for {} ({} bytes)",
            file.filename,
            file.bytes.len()
        );
        let t0 = Instant::now();

        let reply = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("view torn down; dropping caption request");
                return Err(ViewError::Cancelled);
            }
            reply = self.provider.caption(&file) => reply,
        };

        if self.cancel.is_cancelled() {
            return Err(ViewError::Cancelled);
        }

        let elapsed_ms = ms(t0.elapsed());
        let mut st = self.state();
        st.last_request_ms = Some(elapsed_ms);

        match reply {
            Ok(CaptionReply::Caption {
                caption,
                backend_error,
            }) => {
                if let Some(e) = backend_error {
                    warn!("captioning backend reported an error: {e}");
                }
                let caption = normalize_caption(caption.as_deref());
                info!("caption received in {elapsed_ms}ms");
                st.caption = Some(caption);
                st.status = RequestStatus::Succeeded;
                Ok(RequestStatus::Succeeded)
            }
            Ok(CaptionReply::Rejected { status, reason }) => {
                let message = backend_error_message(status, reason.as_deref());
                warn!("caption request rejected: status={status}");
                st.caption = None;
                st.error = Some(message.clone());
                st.status = RequestStatus::Failed;
                Err(ViewError::Server { status, message })
            }
            Err(e) => {
                // Transport failures are masked by the placeholder caption.
                warn!("caption request failed, showing fallback caption: {e:#}");
                st.caption = Some(self.cfg.fallback_caption.clone());
                st.error = None;
                st.status = RequestStatus::DegradedFallback;
                Ok(RequestStatus::DegradedFallback)
            }
        }
    }

    pub fn clear_all(&self) -> Result<(), ViewError> {
        self.ensure_live()?;

        let mut st = self.state();
        if let Some(old) = st.preview.take() {
            self.release_preview(&old);
        }
        st.selected = None;
        st.caption = None;
        st.error = None;
        st.picker_value = None;
        st.status = RequestStatus::Idle;
        debug!("view cleared");
        Ok(())
    }

    /// Copies the caption to the clipboard. Returns `false` when there is nothing to copy.
    pub async fn copy_caption(&self) -> Result<bool, ViewError> {
        self.ensure_live()?;

        let caption = match self.state().caption.clone() {
            Some(c) if !c.is_empty() => c,
            _ => return Ok(false),
        };

        if let Err(e) = self.clipboard.write_text(&caption).await {
            warn!("clipboard write failed: {e:#}");
            self.state().error = Some(MSG_COPY_FAILED.into());
            return Err(ViewError::Clipboard(e.to_string()));
        }
        Ok(true)
    }

    /// Cancels any pending request and releases the preview. Idempotent.
    pub fn teardown(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();

        let mut st = self.state();
        if let Some(old) = st.preview.take() {
            self.release_preview(&old);
        }
        debug!("view torn down");
    }

    fn ensure_live(&self) -> Result<(), ViewError> {
        if self.cancel.is_cancelled() {
            Err(ViewError::TornDown)
        } else {
            Ok(())
        }
    }

    fn release_preview(&self, handle: &PreviewHandle) {
        // A failed release is logged but never blocks the state change.
        if let Err(e) = self.previews.release(handle) {
            warn!("failed to release preview {}: {e:#}", handle.location);
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CaptionView {
    fn drop(&mut self) {
        self.teardown();
    }
}

// Releases the in-flight token on every exit path, including a dropped future.
struct InFlightGuard<'a> {
    view: &'a CaptionView,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        {
            let mut st = self.view.state();
            if st.status.is_in_flight() {
                st.status = RequestStatus::Idle;
            }
        }
        self.view.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct CountingPreviews {
        live: Mutex<HashSet<imagecap_core::types::PreviewId>>,
        created: Mutex<u32>,
        released: Mutex<Vec<imagecap_core::types::PreviewId>>,
        fail_create: AtomicBool,
    }

    impl CountingPreviews {
        fn live(&self) -> usize {
            self.live.lock().unwrap().len()
        }
    }

    impl PreviewResources for CountingPreviews {
        fn create(&self, file: &SelectedFile) -> anyhow::Result<PreviewHandle> {
            if self.fail_create.load(Ordering::SeqCst) {
                anyhow::bail!("disk full");
            }
            let h = PreviewHandle::new(format!("mem://{}", file.filename));
            *self.created.lock().unwrap() += 1;
            self.live.lock().unwrap().insert(h.id);
            Ok(h)
        }

        fn release(&self, handle: &PreviewHandle) -> anyhow::Result<()> {
            assert!(
                self.live.lock().unwrap().remove(&handle.id),
                "preview released twice or never created"
            );
            self.released.lock().unwrap().push(handle.id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        fail: bool,
        writes: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Clipboard for RecordingClipboard {
        async fn write_text(&self, text: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("clipboard locked");
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    enum Script {
        Reply(CaptionReply),
        Transport,
    }

    struct ScriptedProvider {
        script: Script,
        started: Arc<Notify>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        fn new(script: Script) -> Self {
            Self {
                script,
                started: Arc::new(Notify::new()),
                gate: None,
            }
        }

        fn gated(script: Script, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(script)
            }
        }
    }

    #[async_trait::async_trait]
    impl CaptionProvider for ScriptedProvider {
        async fn caption(&self, _image: &SelectedFile) -> anyhow::Result<CaptionReply> {
            self.started.notify_one();
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.script {
                Script::Reply(r) => Ok(r.clone()),
                Script::Transport => Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    fn caption(text: &str) -> Script {
        Script::Reply(CaptionReply::Caption {
            caption: Some(text.into()),
            backend_error: None,
        })
    }

    struct Fixture {
        view: Arc<CaptionView>,
        previews: Arc<CountingPreviews>,
        clipboard: Arc<RecordingClipboard>,
        started: Arc<Notify>,
    }

    fn fixture_with(provider: ScriptedProvider, clipboard: RecordingClipboard) -> Fixture {
        let previews = Arc::new(CountingPreviews::default());
        let clipboard = Arc::new(clipboard);
        let started = provider.started.clone();
        let view = Arc::new(CaptionView::new(
            ViewConfig::default(),
            previews.clone(),
            clipboard.clone(),
            Arc::new(provider),
        ));
        Fixture {
            view,
            previews,
            clipboard,
            started,
        }
    }

    fn fixture(script: Script) -> Fixture {
        fixture_with(ScriptedProvider::new(script), RecordingClipboard::default())
    }

    fn png(name: &str) -> Option<FileInput> {
        Some(FileInput::new(name, Some("image/png"), vec![0x89, b'P', b'N', b'G']))
    }

    #[test]
    fn non_image_selection_only_sets_error() {
        let f = fixture(caption("A cat."));
        f.view.select_file(png("cat.png")).unwrap();
        let before = f.view.snapshot();

        let err = f
            .view
            .select_file(Some(FileInput::new("notes.txt", Some("text/plain"), vec![1])))
            .unwrap_err();
        assert_eq!(err, ViewError::Validation(ValidationError::NotAnImage));

        let after = f.view.snapshot();
        assert_eq!(after.error.as_deref(), Some(MSG_NOT_AN_IMAGE));
        assert_eq!(after.file, before.file);
        assert_eq!(after.preview, before.preview);
        assert_eq!(after.picker_value, before.picker_value);
        assert_eq!(f.previews.live(), 1);
    }

    #[test]
    fn missing_media_type_is_not_an_image() {
        let f = fixture(caption("A cat."));
        let err = f
            .view
            .select_file(Some(FileInput::new("blob", None, vec![1])))
            .unwrap_err();
        assert_eq!(err, ViewError::Validation(ValidationError::NotAnImage));
        assert_eq!(f.previews.live(), 0);
    }

    #[test]
    fn dismissed_picker_clears_error_only() {
        let f = fixture(caption("A cat."));
        let _ = f.view.select_file(Some(FileInput::new("a.txt", Some("text/plain"), vec![])));
        assert!(f.view.snapshot().error.is_some());

        f.view.select_file(None).unwrap();
        let snap = f.view.snapshot();
        assert!(snap.error.is_none());
        assert!(snap.file.is_none());
    }

    #[test]
    fn reselection_keeps_exactly_one_live_preview() {
        let f = fixture(caption("A cat."));
        f.view.select_file(png("a.png")).unwrap();
        let first = f.view.snapshot().preview.unwrap();

        f.view.select_file(png("b.png")).unwrap();
        let second = f.view.snapshot().preview.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(f.previews.live(), 1);
        assert_eq!(*f.previews.released.lock().unwrap(), vec![first.id]);
        assert_eq!(f.view.snapshot().picker_value.as_deref(), Some("b.png"));
    }

    #[test]
    fn failed_preview_drops_selection() {
        let f = fixture(caption("A cat."));
        f.view.select_file(png("a.png")).unwrap();
        f.previews.fail_create.store(true, Ordering::SeqCst);

        let err = f.view.select_file(png("b.png")).unwrap_err();
        assert!(matches!(err, ViewError::Preview(_)));

        let snap = f.view.snapshot();
        assert!(snap.file.is_none());
        assert!(snap.preview.is_none());
        assert_eq!(snap.error.as_deref(), Some(MSG_PREVIEW_FAILED));
        assert_eq!(f.previews.live(), 0);
    }

    #[tokio::test]
    async fn generate_without_file_fails_validation() {
        let f = fixture(caption("A cat."));
        let err = f.view.generate_caption().await.unwrap_err();
        assert_eq!(err, ViewError::Validation(ValidationError::NoFile));

        let snap = f.view.snapshot();
        assert!(snap.caption.is_none());
        assert_eq!(snap.error.as_deref(), Some(MSG_NO_FILE));
        assert_eq!(snap.status, RequestStatus::Idle);
        assert!(!f.view.is_request_in_flight());
    }

    #[tokio::test]
    async fn successful_reply_sets_caption() {
        let f = fixture(caption("A cat."));
        f.view.select_file(png("cat.png")).unwrap();

        let status = f.view.generate_caption().await.unwrap();
        assert_eq!(status, RequestStatus::Succeeded);

        let snap = f.view.snapshot();
        assert_eq!(snap.caption.as_deref(), Some("A cat."));
        assert!(snap.error.is_none());
        assert!(snap.last_request_ms.is_some());
        assert!(!f.view.is_request_in_flight());
    }

    #[tokio::test]
    async fn empty_reply_uses_placeholder() {
        let f = fixture(Script::Reply(CaptionReply::Caption {
            caption: None,
            backend_error: Some("cannot identify image file".into()),
        }));
        f.view.select_file(png("cat.png")).unwrap();

        f.view.generate_caption().await.unwrap();
        assert_eq!(
            f.view.snapshot().caption.as_deref(),
            Some(imagecap_core::text::NO_CAPTION_PLACEHOLDER)
        );
    }

    #[tokio::test]
    async fn rejected_reply_sets_error() {
        let f = fixture(Script::Reply(CaptionReply::Rejected {
            status: 500,
            reason: Some("Internal Server Error".into()),
        }));
        f.view.select_file(png("cat.png")).unwrap();

        let err = f.view.generate_caption().await.unwrap_err();
        assert!(matches!(err, ViewError::Server { status: 500, .. }));

        let snap = f.view.snapshot();
        assert!(snap.caption.is_none());
        assert_eq!(
            snap.error.as_deref(),
            Some("Backend error: Internal Server Error")
        );
        assert_eq!(snap.status, RequestStatus::Failed);
    }

    #[tokio::test]
    async fn transport_failure_shows_fallback_caption() {
        let f = fixture(Script::Transport);
        f.view.select_file(png("cat.png")).unwrap();

        let status = f.view.generate_caption().await.unwrap();
        assert_eq!(status, RequestStatus::DegradedFallback);

        let snap = f.view.snapshot();
        assert_eq!(snap.caption.as_deref(), Some(DEFAULT_FALLBACK_CAPTION));
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn overlapping_generate_is_busy() {
        let gate = Arc::new(Notify::new());
        let f = fixture_with(
            ScriptedProvider::gated(caption("A cat."), gate.clone()),
            RecordingClipboard::default(),
        );
        f.view.select_file(png("cat.png")).unwrap();

        let view = f.view.clone();
        let first = tokio::spawn(async move { view.generate_caption().await });
        f.started.notified().await;

        assert_eq!(f.view.snapshot().status, RequestStatus::InFlight);
        assert_eq!(f.view.generate_caption().await, Err(ViewError::Busy));

        gate.notify_one();
        assert_eq!(first.await.unwrap(), Ok(RequestStatus::Succeeded));
        assert!(!f.view.is_request_in_flight());
    }

    #[tokio::test]
    async fn clear_during_request_still_applies_result() {
        let gate = Arc::new(Notify::new());
        let f = fixture_with(
            ScriptedProvider::gated(caption("A cat."), gate.clone()),
            RecordingClipboard::default(),
        );
        f.view.select_file(png("cat.png")).unwrap();

        let view = f.view.clone();
        let pending = tokio::spawn(async move { view.generate_caption().await });
        f.started.notified().await;

        f.view.clear_all().unwrap();
        assert_eq!(f.previews.live(), 0);

        gate.notify_one();
        pending.await.unwrap().unwrap();
        assert_eq!(f.view.snapshot().caption.as_deref(), Some("A cat."));
    }

    #[tokio::test]
    async fn teardown_discards_pending_result() {
        let gate = Arc::new(Notify::new());
        let f = fixture_with(
            ScriptedProvider::gated(caption("A cat."), gate.clone()),
            RecordingClipboard::default(),
        );
        f.view.select_file(png("cat.png")).unwrap();

        let view = f.view.clone();
        let pending = tokio::spawn(async move { view.generate_caption().await });
        f.started.notified().await;

        f.view.teardown();
        assert_eq!(pending.await.unwrap(), Err(ViewError::Cancelled));
        assert!(f.view.snapshot().caption.is_none());
        assert_eq!(f.previews.live(), 0);
        assert_eq!(f.view.clear_all(), Err(ViewError::TornDown));

        // Second teardown must not release anything again.
        f.view.teardown();
        assert_eq!(f.previews.released.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropped_request_future_releases_token() {
        let gate = Arc::new(Notify::new());
        let f = fixture_with(
            ScriptedProvider::gated(caption("A cat."), gate.clone()),
            RecordingClipboard::default(),
        );
        f.view.select_file(png("cat.png")).unwrap();

        let res =
            tokio::time::timeout(Duration::from_millis(20), f.view.generate_caption()).await;
        assert!(res.is_err());
        assert!(!f.view.is_request_in_flight());
        assert_eq!(f.view.snapshot().status, RequestStatus::Idle);

        gate.notify_one();
        assert_eq!(
            f.view.generate_caption().await,
            Ok(RequestStatus::Succeeded)
        );
    }

    #[tokio::test]
    async fn copy_writes_caption_or_noops() {
        let f = fixture(caption("A cat."));
        assert_eq!(f.view.copy_caption().await, Ok(false));

        f.view.select_file(png("cat.png")).unwrap();
        f.view.generate_caption().await.unwrap();
        assert_eq!(f.view.copy_caption().await, Ok(true));
        assert_eq!(*f.clipboard.writes.lock().unwrap(), vec!["A cat.".to_string()]);
    }

    #[tokio::test]
    async fn copy_failure_sets_error() {
        let f = fixture_with(
            ScriptedProvider::new(caption("A cat.")),
            RecordingClipboard {
                fail: true,
                ..Default::default()
            },
        );
        f.view.select_file(png("cat.png")).unwrap();
        f.view.generate_caption().await.unwrap();

        let err = f.view.copy_caption().await.unwrap_err();
        assert!(matches!(err, ViewError::Clipboard(_)));
        assert_eq!(f.view.snapshot().error.as_deref(), Some(MSG_COPY_FAILED));
    }

    #[tokio::test]
    async fn clear_all_resets_every_slot() {
        let f = fixture(Script::Reply(CaptionReply::Rejected {
            status: 502,
            reason: None,
        }));
        f.view.select_file(png("cat.png")).unwrap();
        let _ = f.view.generate_caption().await;
        assert!(!f.view.snapshot().is_pristine());

        f.view.clear_all().unwrap();
        assert!(f.view.snapshot().is_pristine());
        assert_eq!(f.previews.live(), 0);
        assert_eq!(*f.previews.created.lock().unwrap(), 1);
    }

    #[test]
    fn drop_releases_preview() {
        let f = fixture(caption("A cat."));
        f.view.select_file(png("cat.png")).unwrap();
        let previews = f.previews.clone();
        drop(f);
        assert_eq!(previews.live(), 0);
    }
}
