//! Image state manager: the single owner of the gallery sequence.
//!
//! Every mutation follows persist-then-commit: the candidate sequence is
//! written to the store first, and the in-memory sequence is replaced only
//! after that write succeeds. A failed write leaves memory untouched, so the
//! in-memory view never claims data the store does not hold.

use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{GalleryError, Result};
use crate::limits::LimitPolicy;
use crate::record::ImageRecord;
use crate::storage::{GalleryStore, KeyValueStore};

/// Way to name a record from the outside: position or id prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSelector {
    /// 0-based position in display order.
    Index(usize),
    /// Prefix of [`ImageRecord::id`], at least 4 hex characters.
    IdPrefix(String),
}

impl FromStr for RecordSelector {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if !s.is_empty() && s.len() <= 3 && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse()
                .map(Self::Index)
                .map_err(|_| GalleryError::InvalidSelector(s.to_string()));
        }
        if s.len() >= 4 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(Self::IdPrefix(s.to_ascii_lowercase()));
        }
        Err(GalleryError::InvalidSelector(s.to_string()))
    }
}

impl std::fmt::Display for RecordSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::IdPrefix(p) => f.write_str(p),
        }
    }
}

/// Summary of the gallery for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct GallerySummary {
    pub count: usize,
    pub total_bytes: u64,
    pub max_count: usize,
    pub max_total_bytes: u64,
}

/// Owns the canonical ordered, duplicate-free list of records.
#[derive(Debug)]
pub struct ImageStateManager<S> {
    store: GalleryStore<S>,
    records: Vec<ImageRecord>,
}

impl<S: KeyValueStore> ImageStateManager<S> {
    /// Load the persisted sequence from `store`; corrupt or absent data
    /// yields an empty gallery.
    #[instrument(skip(store))]
    pub fn load(store: S) -> Self {
        let store = GalleryStore::new(store);
        let records = store.load();
        info!(count = records.len(), "Gallery loaded");
        Self { store, records }
    }

    /// Records in display order.
    #[must_use]
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn contains(&self, record: &ImageRecord) -> bool {
        self.records.contains(record)
    }

    /// Sum of decoded payload sizes.
    #[must_use]
    pub fn total_decoded_bytes(&self) -> u64 {
        self.records.iter().map(ImageRecord::decoded_len).sum()
    }

    /// Counts and ceilings for reporting.
    #[must_use]
    pub fn summary(&self, policy: &LimitPolicy) -> GallerySummary {
        GallerySummary {
            count: self.records.len(),
            total_bytes: self.total_decoded_bytes(),
            max_count: policy.max_count,
            max_total_bytes: policy.max_total_bytes(),
        }
    }

    /// Resolve a selector to a stored record.
    pub fn find(&self, selector: &RecordSelector) -> Result<&ImageRecord> {
        match selector {
            RecordSelector::Index(i) => self.records.get(*i).ok_or_else(|| GalleryError::NotFound {
                selector: selector.to_string(),
            }),
            RecordSelector::IdPrefix(prefix) => {
                let mut matches = self.records.iter().filter(|r| r.id().starts_with(prefix));
                let first = matches.next().ok_or_else(|| GalleryError::NotFound {
                    selector: selector.to_string(),
                })?;
                if matches.next().is_some() {
                    return Err(GalleryError::InvalidSelector(format!(
                        "{prefix} matches more than one image"
                    )));
                }
                Ok(first)
            }
        }
    }

    /// Append `record` at the end.
    #[instrument(skip(self, record), fields(id = %record.id()))]
    pub fn add(&mut self, record: ImageRecord) -> Result<()> {
        if self.contains(&record) {
            debug!("Add rejected: duplicate");
            return Err(GalleryError::DuplicateRecord { id: record.id() });
        }
        let mut candidate = self.records.clone();
        candidate.push(record);
        self.commit(candidate)?;
        info!(count = self.records.len(), "Image added");
        Ok(())
    }

    /// Delete `record`, preserving the order of the rest.
    #[instrument(skip(self, record), fields(id = %record.id()))]
    pub fn remove(&mut self, record: &ImageRecord) -> Result<ImageRecord> {
        let Some(pos) = self.records.iter().position(|r| r == record) else {
            debug!("Remove rejected: not found");
            return Err(GalleryError::NotFound {
                selector: record.id(),
            });
        };
        let mut candidate = self.records.clone();
        let removed = candidate.remove(pos);
        self.commit(candidate)?;
        info!(count = self.records.len(), "Image removed");
        Ok(removed)
    }

    /// Replace the display order with `new_order`.
    ///
    /// Limits are not re-checked: a reorder never changes membership. An
    /// order that is not a permutation of the current records is refused.
    #[instrument(skip(self, new_order), fields(count = new_order.len()))]
    pub fn reorder(&mut self, new_order: Vec<ImageRecord>) -> Result<()> {
        self.check_permutation(&new_order)?;
        if new_order == self.records {
            debug!("Order unchanged");
            return Ok(());
        }
        self.commit(new_order).map_err(|e| match e {
            GalleryError::StorageFailure(reason) => GalleryError::OrderPersistFailure(reason),
            other => other,
        })?;
        info!("Order saved");
        Ok(())
    }

    fn check_permutation(&self, new_order: &[ImageRecord]) -> Result<()> {
        if new_order.len() != self.records.len() {
            return Err(GalleryError::OrderMismatch(format!(
                "expected {} images, got {}",
                self.records.len(),
                new_order.len()
            )));
        }
        let current: HashSet<&ImageRecord> = self.records.iter().collect();
        let mut seen = HashSet::with_capacity(new_order.len());
        for record in new_order {
            if !current.contains(record) {
                return Err(GalleryError::OrderMismatch(format!(
                    "{} is not in the gallery",
                    record.id()
                )));
            }
            if !seen.insert(record) {
                return Err(GalleryError::OrderMismatch(format!(
                    "{} listed twice",
                    record.id()
                )));
            }
        }
        Ok(())
    }

    /// Persist `candidate`, then adopt it.
    fn commit(&mut self, candidate: Vec<ImageRecord>) -> Result<()> {
        if let Err(e) = self.store.save(&candidate) {
            warn!(error = %e, "Persist failed, in-memory gallery unchanged");
            return Err(e);
        }
        self.records = candidate;
        Ok(())
    }

    #[must_use]
    pub const fn store(&self) -> &GalleryStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GalleryStore<S> {
        &mut self.store
    }
}
