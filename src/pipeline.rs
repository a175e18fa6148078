//! Upload pipeline: validates a batch of raw files and drives each accepted
//! file through its state machine.
//!
//! ```text
//! Validating -> Simulating -> Decoding -> Committing -> Done
//!      |             |            |            |
//!      +-------------+------------+------------+------> Rejected
//! ```
//!
//! Type checks run per file. The remaining files are weighed against the
//! limit policy as one batch. Files that pass get a placeholder and their own
//! tokio task; simulate and decode interleave freely, commits are serialized
//! by the manager's async mutex.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{GalleryError, Result};
use crate::image_ops::{is_supported_media_type, media_type_for_path};
use crate::limits::{Candidate, LimitPolicy, Verdict};
use crate::notify::Notifier;
use crate::record::ImageRecord;
use crate::state::ImageStateManager;
use crate::storage::KeyValueStore;
use crate::view::{GalleryView, PendingUpload, RejectTarget};

/// Where a raw file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A user-selected file, before any validation.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    /// Declared media type, as reported by the source.
    pub media_type: String,
    /// Raw size in bytes.
    pub size: u64,
    pub source: FileSource,
}

impl RawFile {
    /// Describe a file on disk. The media type comes from its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            name,
            media_type: media_type_for_path(&path).to_string(),
            size: metadata.len(),
            source: FileSource::Path(path),
        })
    }

    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(bytes),
        }
    }

    async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

impl Candidate for RawFile {
    fn size(&self) -> u64 {
        self.size
    }
}

/// Per-file stage. `Done` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Validating,
    Simulating,
    Decoding,
    Committing,
    Done,
    Rejected,
}

impl UploadState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Rejected)
    }

    const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Validating, Self::Simulating)
                | (Self::Simulating, Self::Decoding)
                | (Self::Decoding, Self::Committing)
                | (Self::Committing, Self::Done)
        ) || (!self.is_terminal() && matches!(next, Self::Rejected))
    }
}

/// Terminal state of one file in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub name: String,
    /// Set once a placeholder was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<Uuid>,
    pub state: UploadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadOutcome {
    fn done(upload: &PendingUpload, record: &ImageRecord) -> Self {
        Self {
            name: upload.name.clone(),
            upload_id: Some(upload.id),
            state: UploadState::Done,
            record_id: Some(record.id()),
            reason: None,
            message: None,
        }
    }

    fn rejected(name: &str, upload_id: Option<Uuid>, err: &GalleryError) -> Self {
        Self {
            name: name.to_string(),
            upload_id,
            state: UploadState::Rejected,
            record_id: None,
            reason: Some(err.code()),
            message: Some(err.user_message()),
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == UploadState::Done
    }
}

/// Result of one `submit` call, in submission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchReport {
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_done()).count()
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.accepted()
    }

    #[must_use]
    pub fn all_accepted(&self) -> bool {
        self.outcomes.iter().all(UploadOutcome::is_done)
    }
}

/// Cosmetic progress simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub simulate_progress: bool,
    pub progress_tick_ms: u64,
    pub progress_step: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            simulate_progress: true,
            progress_tick_ms: 200,
            progress_step: 20,
        }
    }
}

impl ProgressConfig {
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            simulate_progress: false,
            progress_tick_ms: 0,
            progress_step: 100,
        }
    }

    #[must_use]
    pub const fn tick(&self) -> Duration {
        Duration::from_millis(self.progress_tick_ms)
    }
}

/// Shared handle to the state manager.
pub type SharedManager<S> = Arc<Mutex<ImageStateManager<S>>>;

/// Everything a per-file task needs, cheap to clone.
struct TaskContext<S> {
    manager: SharedManager<S>,
    view: Arc<dyn GalleryView>,
    notifier: Arc<Notifier>,
    progress: ProgressConfig,
}

impl<S> Clone for TaskContext<S> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            view: Arc::clone(&self.view),
            notifier: Arc::clone(&self.notifier),
            progress: self.progress,
        }
    }
}

impl<S> TaskContext<S> {
    /// Report a rejection: one view callback and one notice.
    fn reject(&self, target: &RejectTarget, err: &GalleryError) {
        self.view.on_rejected(target, err);
        self.notifier.show(&err.user_message());
    }
}

/// One file's walk through the state machine.
struct Upload {
    pending: PendingUpload,
    file: RawFile,
    state: UploadState,
}

impl Upload {
    fn new(file: RawFile) -> Self {
        Self {
            pending: PendingUpload::new(&file.name, &file.media_type, file.size),
            file,
            state: UploadState::Validating,
        }
    }

    fn advance(&mut self, next: UploadState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal upload transition {:?} -> {next:?}",
            self.state
        );
        trace!(upload = %self.pending.id, from = ?self.state, to = ?next, "Upload transition");
        self.state = next;
    }

    async fn run<S: KeyValueStore>(mut self, ctx: TaskContext<S>) -> UploadOutcome {
        self.advance(UploadState::Simulating);
        simulate_progress(&ctx, &self.pending).await;

        self.advance(UploadState::Decoding);
        let record = match self.file.read().await {
            Ok(bytes) => ImageRecord::from_bytes(&self.file.media_type, &bytes),
            Err(e) => {
                warn!(name = %self.file.name, error = %e, "Failed to read file");
                let err = GalleryError::DecodeFailure {
                    name: self.file.name.clone(),
                    reason: e.to_string(),
                };
                return self.fail(&ctx, &err);
            }
        };

        self.advance(UploadState::Committing);
        let committed = ctx.manager.lock().await.add(record.clone());
        match committed {
            Ok(()) => {
                self.advance(UploadState::Done);
                ctx.view.on_accepted(&self.pending, &record);
                UploadOutcome::done(&self.pending, &record)
            }
            Err(err) => self.fail(&ctx, &err),
        }
    }

    fn fail<S>(mut self, ctx: &TaskContext<S>, err: &GalleryError) -> UploadOutcome {
        self.advance(UploadState::Rejected);
        ctx.view.on_placeholder_removed(&self.pending);
        let outcome = UploadOutcome::rejected(&self.pending.name, Some(self.pending.id), err);
        ctx.reject(
            &RejectTarget::Upload {
                upload: self.pending,
            },
            err,
        );
        outcome
    }
}

async fn simulate_progress<S>(ctx: &TaskContext<S>, upload: &PendingUpload) {
    let config = ctx.progress;
    if !config.simulate_progress || config.progress_step == 0 {
        ctx.view.on_progress(upload, 100);
        return;
    }
    let mut percent: u8 = 0;
    while percent < 100 {
        tokio::time::sleep(config.tick()).await;
        percent = percent.saturating_add(config.progress_step).min(100);
        ctx.view.on_progress(upload, percent);
    }
}

/// Turns raw file selections into committed records.
pub struct UploadPipeline<S> {
    ctx: TaskContext<S>,
    policy: LimitPolicy,
}

impl<S> std::fmt::Debug for UploadPipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("policy", &self.policy)
            .field("progress", &self.ctx.progress)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore + Send + 'static> UploadPipeline<S> {
    pub fn new(
        manager: SharedManager<S>,
        view: Arc<dyn GalleryView>,
        notifier: Arc<Notifier>,
        policy: LimitPolicy,
        progress: ProgressConfig,
    ) -> Self {
        Self {
            ctx: TaskContext {
                manager,
                view,
                notifier,
                progress,
            },
            policy,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    /// Validate `files` and upload the ones that pass.
    ///
    /// Every file ends in exactly one terminal state; the report lists them
    /// in the order they were given.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn submit(&self, files: Vec<RawFile>) -> BatchReport {
        let mut outcomes: Vec<Option<UploadOutcome>> = vec![None; files.len()];

        let mut supported = Vec::with_capacity(files.len());
        for (idx, file) in files.into_iter().enumerate() {
            if is_supported_media_type(&file.media_type) {
                supported.push((idx, file));
            } else {
                debug!(name = %file.name, media_type = %file.media_type, "Unsupported media type");
                let err = GalleryError::UnsupportedMediaType {
                    name: file.name.clone(),
                    media_type: file.media_type.clone(),
                };
                self.ctx
                    .reject(&RejectTarget::File { name: file.name.clone() }, &err);
                outcomes[idx] = Some(UploadOutcome::rejected(&file.name, None, &err));
            }
        }

        if !supported.is_empty() {
            let verdict = {
                let manager = self.ctx.manager.lock().await;
                let candidates: Vec<&RawFile> = supported.iter().map(|(_, f)| f).collect();
                self.policy.evaluate(manager.records(), &candidates)
            };

            match verdict {
                Verdict::Reject(violation) => {
                    let err = GalleryError::from(violation);
                    info!(reason = err.code(), "Batch rejected by limit policy");
                    let names = supported.iter().map(|(_, f)| f.name.clone()).collect();
                    self.ctx.reject(&RejectTarget::Batch { names }, &err);
                    for (idx, file) in &supported {
                        outcomes[*idx] = Some(UploadOutcome::rejected(&file.name, None, &err));
                    }
                }
                Verdict::Accept => self.run_batch(supported, &mut outcomes).await,
            }
        }

        let outcomes: Vec<UploadOutcome> = outcomes.into_iter().flatten().collect();
        let report = BatchReport { outcomes };
        info!(
            accepted = report.accepted(),
            rejected = report.rejected(),
            "Batch complete"
        );
        report
    }

    async fn run_batch(
        &self,
        files: Vec<(usize, RawFile)>,
        outcomes: &mut [Option<UploadOutcome>],
    ) {
        let mut tasks = JoinSet::new();
        let mut names = Vec::with_capacity(files.len());
        for (idx, file) in files {
            let upload = Upload::new(file);
            self.ctx.view.on_placeholder(&upload.pending);
            names.push((idx, upload.pending.name.clone()));
            let ctx = self.ctx.clone();
            tasks.spawn(async move { (idx, upload.run(ctx).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => outcomes[idx] = Some(outcome),
                Err(e) => error!(error = %e, "Upload task failed"),
            }
        }

        // A panicked task never reported; account for it here.
        for (idx, name) in names {
            if outcomes[idx].is_none() {
                let err = GalleryError::Other(format!("upload of {name} aborted"));
                self.ctx.reject(&RejectTarget::File { name: name.clone() }, &err);
                outcomes[idx] = Some(UploadOutcome::rejected(&name, None, &err));
            }
        }
    }
}

impl Candidate for &RawFile {
    fn size(&self) -> u64 {
        self.size
    }
}
