//! Gallery session: the entry point the presentation layer talks to.
//!
//! A session owns the state manager (behind an async mutex shared with the
//! upload tasks), the notice slot, and the theme preference. It turns user
//! intents into core operations and reports results through the view.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use crate::limits::LimitPolicy;
use crate::notify::Notifier;
use crate::pipeline::{BatchReport, RawFile, SharedManager, UploadPipeline};
use crate::record::ImageRecord;
use crate::state::{GallerySummary, ImageStateManager, RecordSelector};
use crate::storage::KeyValueStore;
use crate::theme::Theme;
use crate::view::{GalleryView, RejectTarget};

/// Whether the displayed order matches what is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSync {
    Synced,
    /// A reorder failed to persist; the view still shows this order.
    Unsynced(Vec<ImageRecord>),
}

/// One user session over a gallery store.
pub struct Gallery<S> {
    manager: SharedManager<S>,
    pipeline: UploadPipeline<S>,
    notifier: Arc<Notifier>,
    view: Arc<dyn GalleryView>,
    theme: Theme,
    order: OrderSync,
}

impl<S> std::fmt::Debug for Gallery<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("theme", &self.theme)
            .field("order", &self.order)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore + Send + 'static> Gallery<S> {
    /// Load the gallery and theme from `store`.
    #[instrument(skip_all)]
    pub fn open(store: S, config: &GalleryConfig, view: Arc<dyn GalleryView>) -> Self {
        let manager = ImageStateManager::load(store);
        let theme = manager.store().load_theme();
        debug!(%theme, "Theme loaded");

        let manager = Arc::new(Mutex::new(manager));
        let notifier = Arc::new(Notifier::new(Arc::clone(&view), config.dismiss_after()));
        let pipeline = UploadPipeline::new(
            Arc::clone(&manager),
            Arc::clone(&view),
            Arc::clone(&notifier),
            config.limits,
            config.upload,
        );

        Self {
            manager,
            pipeline,
            notifier,
            view,
            theme,
            order: OrderSync::Synced,
        }
    }

    /// The user picked files to add.
    pub async fn on_files_selected(&mut self, files: Vec<RawFile>) -> BatchReport {
        let report = self.pipeline.submit(files).await;
        if report.accepted() > 0 {
            self.discard_unsynced_order();
        }
        report
    }

    /// The user asked to delete `record`.
    #[instrument(skip_all, fields(id = %record.id()))]
    pub async fn on_remove_requested(&mut self, record: &ImageRecord) -> Result<ImageRecord> {
        let result = self.manager.lock().await.remove(record);
        match result {
            Ok(removed) => {
                self.discard_unsynced_order();
                self.view.on_removed(&removed);
                Ok(removed)
            }
            Err(err) => {
                self.report(&RejectTarget::Record { id: record.id() }, &err);
                Err(err)
            }
        }
    }

    /// The user finished a drag; `order` is the full sequence as displayed.
    ///
    /// If persisting fails the displayed order is kept and marked unsynced;
    /// [`Gallery::retry_order_sync`] tries again.
    #[instrument(skip_all, fields(count = order.len()))]
    pub async fn on_reorder_completed(&mut self, order: Vec<ImageRecord>) -> Result<()> {
        let result = self.manager.lock().await.reorder(order.clone());
        match result {
            Ok(()) => {
                self.order = OrderSync::Synced;
                self.view.on_order_saved(&order);
                Ok(())
            }
            Err(err) => {
                let ids = order.iter().map(ImageRecord::id).collect();
                self.report(&RejectTarget::Order { ids }, &err);
                if matches!(err, GalleryError::OrderPersistFailure(_)) {
                    warn!("Order kept on screen but not persisted");
                    self.order = OrderSync::Unsynced(order);
                }
                Err(err)
            }
        }
    }

    /// Try again to persist an order that previously failed to save.
    ///
    /// Returns `Ok(false)` when there was nothing to retry.
    pub async fn retry_order_sync(&mut self) -> Result<bool> {
        let OrderSync::Unsynced(order) = &self.order else {
            return Ok(false);
        };
        let order = order.clone();
        info!("Retrying order sync");
        self.on_reorder_completed(order).await.map(|()| true)
    }

    /// Move the record at `from` to position `to`, shifting the rest.
    pub async fn move_record(&mut self, from: usize, to: usize) -> Result<Vec<ImageRecord>> {
        let mut order = self.records().await;
        if from >= order.len() || to >= order.len() {
            let err = GalleryError::OrderMismatch(format!(
                "position {} is past the end ({} images)",
                from.max(to),
                order.len()
            ));
            let ids = order.iter().map(ImageRecord::id).collect();
            self.report(&RejectTarget::Order { ids }, &err);
            return Err(err);
        }
        let record = order.remove(from);
        order.insert(to, record);
        self.on_reorder_completed(order.clone()).await?;
        Ok(order)
    }

    /// Flip between light and dark, persisting the choice.
    pub async fn toggle_theme(&mut self) -> Result<Theme> {
        self.set_theme(self.theme.toggled()).await
    }

    #[instrument(skip(self))]
    pub async fn set_theme(&mut self, theme: Theme) -> Result<Theme> {
        self.manager.lock().await.store_mut().save_theme(theme)?;
        self.theme = theme;
        self.view.on_theme_changed(theme);
        info!(%theme, "Theme changed");
        Ok(theme)
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Records in canonical (stored) order.
    pub async fn records(&self) -> Vec<ImageRecord> {
        self.manager.lock().await.records().to_vec()
    }

    pub async fn resolve(&self, selector: &RecordSelector) -> Result<ImageRecord> {
        self.manager.lock().await.find(selector).cloned()
    }

    pub async fn summary(&self) -> GallerySummary {
        self.manager.lock().await.summary(self.pipeline.policy())
    }

    #[must_use]
    pub fn policy(&self) -> &LimitPolicy {
        self.pipeline.policy()
    }

    #[must_use]
    pub const fn order_sync(&self) -> &OrderSync {
        &self.order
    }

    fn report(&self, target: &RejectTarget, err: &GalleryError) {
        self.view.on_rejected(target, err);
        self.notifier.show(&err.user_message());
    }

    fn discard_unsynced_order(&mut self) {
        if matches!(self.order, OrderSync::Unsynced(_)) {
            debug!("Membership changed, dropping unsynced order");
            self.order = OrderSync::Synced;
        }
    }
}
