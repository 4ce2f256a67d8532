use crate::codec::{self, MediaPayload};
use crate::handle::{HandleRegistry, TransientHandle};
use crate::processor::{PixelationLevel, ProcessRequest, Processor};
use crate::{utils, PixelClipError, Result};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Lifecycle states of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No video loaded
    Empty,
    /// A video is loaded and ready to process
    Loaded,
    /// A processing call is in flight
    Processing,
    /// A processed clip is available for preview and download
    Ready,
}

/// How a processing call ended from the session's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The result was applied; the session is `Ready`
    Completed,
    /// A new upload arrived while the call was in flight; the late result
    /// was discarded
    Superseded,
}

/// Single point of orchestration for one user session.
///
/// Owns both transient handle slots (`original` and `processed`), invokes the
/// injected [`Processor`], and guarantees that every handle it creates is
/// revoked on every exit path, error paths included. The processor is passed
/// in at construction; nothing here reaches for process-wide state.
#[derive(Clone)]
pub struct SessionController {
    processor: Arc<dyn Processor>,
    registry: HandleRegistry,
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    state: SessionState,
    /// Bumped on every upload; a processing call whose captured generation
    /// no longer matches must not apply its result.
    generation: u64,
    file_name: Option<String>,
    payload: Option<MediaPayload>,
    original: Option<TransientHandle>,
    processed: Option<TransientHandle>,
    last_level: Option<PixelationLevel>,
}

impl SessionController {
    /// Create a controller around an injected processing backend and
    /// handle registry
    pub fn new(processor: Arc<dyn Processor>, registry: HandleRegistry) -> Self {
        Self {
            processor,
            registry,
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Empty,
                generation: 0,
                file_name: None,
                payload: None,
                original: None,
                processed: None,
                last_level: None,
            })),
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Name of the loaded file, if any
    pub fn file_name(&self) -> Option<String> {
        self.lock().file_name.clone()
    }

    /// URL of the handle for the original upload, if live
    pub fn original_url(&self) -> Option<String> {
        self.lock().original.as_ref().map(|h| h.url().to_string())
    }

    /// URL of the handle for the processed clip, if live
    pub fn processed_url(&self) -> Option<String> {
        self.lock().processed.as_ref().map(|h| h.url().to_string())
    }

    /// Payload behind the processed handle, if the session is `Ready`
    pub fn processed_payload(&self) -> Option<Arc<MediaPayload>> {
        self.lock().processed.as_ref().and_then(|h| h.resolve())
    }

    /// Download name for the processed clip
    /// (`pixelated_<stem>_p<level>.<ext>`), once one exists
    pub fn download_filename(&self) -> Option<String> {
        let inner = self.lock();
        match (&inner.file_name, inner.last_level) {
            (Some(name), Some(level)) if inner.processed.is_some() => {
                Some(utils::download_filename(name, level.get()))
            }
            _ => None,
        }
    }

    /// Load a newly selected file into the session.
    ///
    /// The declared MIME type must start with `video/`; anything else is
    /// rejected with `InvalidFileType` and the session is left exactly as it
    /// was. On success any prior handles are revoked, the processed state is
    /// cleared, and a fresh handle is issued for the upload.
    pub fn load_file(&self, name: &str, payload: MediaPayload) -> Result<()> {
        if !payload.is_video() {
            warn!("Rejected upload '{}': MIME type '{}'", name, payload.mime());
            return Err(PixelClipError::InvalidFileType(payload.mime().to_string()));
        }

        let mut inner = self.lock();
        // Dropping the old handles revokes them.
        inner.original = None;
        inner.processed = None;
        inner.last_level = None;
        inner.generation += 1;

        info!(
            "Loaded '{}' ({} bytes, {})",
            name,
            payload.len(),
            payload.mime()
        );
        inner.original = Some(self.registry.create(payload.clone()));
        inner.payload = Some(payload);
        inner.file_name = Some(name.to_string());
        inner.state = SessionState::Loaded;
        Ok(())
    }

    /// Run the loaded video through the processing backend.
    ///
    /// Only one call may be in flight per session; a second request while
    /// `Processing` is rejected with `Busy`. Failures surface as
    /// `ProcessingFailed` and return the session to `Loaded`, re-triable.
    /// If a new file is loaded while the call is suspended, the late result
    /// is discarded and `Superseded` is returned.
    pub async fn process(&self, level: PixelationLevel) -> Result<ProcessOutcome> {
        let (request, input_category, generation) = {
            let mut inner = self.lock();
            match inner.state {
                SessionState::Empty => return Err(PixelClipError::NoMedia),
                SessionState::Processing => return Err(PixelClipError::Busy),
                SessionState::Loaded | SessionState::Ready => {}
            }

            let payload = inner.payload.as_ref().ok_or(PixelClipError::NoMedia)?;
            let request = ProcessRequest {
                video_data_uri: codec::encode(payload),
                pixelation_level: level.get() as i64,
            };
            let category = codec::mime_category(payload.mime()).to_string();

            // The previous result disappears as soon as a new run starts.
            inner.processed = None;
            inner.state = SessionState::Processing;
            debug!("Dispatching processing call at level {}", level);
            (request, category, inner.generation)
        };

        // No lock is held across the suspension point.
        let result = self.processor.process(request).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            info!("Discarding late processing result for a superseded upload");
            return Ok(ProcessOutcome::Superseded);
        }

        let applied = result.and_then(|response| {
            let processed = codec::decode(&response.processed_video_data_uri)?;
            let output_category = codec::mime_category(processed.mime());
            if output_category != input_category {
                return Err(PixelClipError::ProcessingFailed(format!(
                    "backend returned '{}' for a '{}' input",
                    processed.mime(),
                    input_category
                )));
            }
            Ok(processed)
        });

        match applied {
            Ok(processed) => {
                inner.processed = Some(self.registry.create(processed));
                inner.last_level = Some(level);
                inner.state = SessionState::Ready;
                info!("Processing complete at level {}", level);
                Ok(ProcessOutcome::Completed)
            }
            Err(e) => {
                inner.processed = None;
                inner.state = SessionState::Loaded;
                warn!("Processing failed: {}", e);
                Err(match e {
                    e @ PixelClipError::ProcessingFailed(_) => e,
                    other => PixelClipError::ProcessingFailed(other.to_string()),
                })
            }
        }
    }

    /// End the session: revoke all outstanding handles and return to `Empty`.
    /// Dropping the last clone of the controller has the same effect.
    pub fn teardown(&self) {
        let mut inner = self.lock();
        // An in-flight processing call must see the session as superseded,
        // not resurrect it with a late result.
        inner.generation += 1;
        inner.original = None;
        inner.processed = None;
        inner.payload = None;
        inner.file_name = None;
        inner.last_level = None;
        inner.state = SessionState::Empty;
        debug!("Session torn down");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("session state poisoned")
    }
}
