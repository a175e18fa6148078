//! Single-slot, auto-dismissing notice channel.
//!
//! Only one message is visible at a time. Showing a new message cancels the
//! previous message's dismissal timer and starts a fresh one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::view::GalleryView;

/// How long a notice stays visible.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Slot {
    message: Option<String>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Debounced notice slot in front of a [`GalleryView`].
pub struct Notifier {
    view: Arc<dyn GalleryView>,
    dismiss_after: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("dismiss_after", &self.dismiss_after)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl Notifier {
    pub fn new(view: Arc<dyn GalleryView>, dismiss_after: Duration) -> Self {
        Self {
            view,
            dismiss_after,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Show `text`, replacing whatever is currently shown.
    ///
    /// Outside a tokio runtime the message stays until replaced.
    pub fn show(&self, text: &str) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = slot.timer.take() {
            trace!("Cancelling previous dismissal timer");
            timer.abort();
        }
        slot.generation += 1;
        slot.message = Some(text.to_string());
        debug!(message = text, "Showing notice");
        self.view.on_error_message(text);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let view = Arc::clone(&self.view);
        let delay = self.dismiss_after;
        slot.timer = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut slot = shared.lock().unwrap_or_else(PoisonError::into_inner);
            // A newer message may have raced past the abort.
            if slot.generation != generation {
                return;
            }
            slot.message = None;
            slot.timer = None;
            drop(slot);
            trace!("Notice dismissed");
            view.on_error_dismissed();
        }));
    }

    /// Dismiss the current message now, if any.
    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        if slot.message.take().is_some() {
            drop(slot);
            self.view.on_error_dismissed();
        }
    }

    /// The message currently visible.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .message
            .clone()
    }

    #[must_use]
    pub const fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }
}
