//! Count and cumulative-size ceilings for the gallery.
//!
//! Evaluation is batch-wide: a batch that would overflow either ceiling is
//! rejected as a whole, even if some of its files would fit one at a time.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::GalleryError;
use crate::record::ImageRecord;

/// Default maximum number of images.
pub const MAX_COUNT: usize = 10;

/// Default maximum total decoded size, in MiB.
pub const MAX_TOTAL_MB: u64 = 10;

const MIB: u64 = 1024 * 1024;

/// Anything that can be weighed against the size ceiling before decoding.
pub trait Candidate {
    /// Raw size in bytes as reported by the source.
    fn size(&self) -> u64;
}

impl Candidate for u64 {
    fn size(&self) -> u64 {
        *self
    }
}

/// Why a batch was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LimitViolation {
    CountExceeded {
        max: usize,
        current: usize,
        incoming: usize,
    },
    SizeExceeded {
        max_mb: u64,
        total_bytes: u64,
    },
}

impl From<LimitViolation> for GalleryError {
    fn from(v: LimitViolation) -> Self {
        match v {
            LimitViolation::CountExceeded {
                max,
                current,
                incoming,
            } => Self::CountExceeded {
                max,
                current,
                incoming,
            },
            LimitViolation::SizeExceeded {
                max_mb,
                total_bytes,
            } => Self::SizeExceeded {
                max_mb,
                total_bytes,
            },
        }
    }
}

/// Outcome of a limit evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(LimitViolation),
}

impl Verdict {
    #[must_use]
    pub const fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Count and size ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitPolicy {
    pub max_count: usize,
    pub max_total_mb: u64,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            max_count: MAX_COUNT,
            max_total_mb: MAX_TOTAL_MB,
        }
    }
}

impl LimitPolicy {
    #[must_use]
    pub const fn new(max_count: usize, max_total_mb: u64) -> Self {
        Self {
            max_count,
            max_total_mb,
        }
    }

    /// Ceiling on total decoded bytes.
    #[must_use]
    pub const fn max_total_bytes(&self) -> u64 {
        self.max_total_mb.saturating_mul(MIB)
    }

    /// Decide whether `candidates` may join `current`.
    ///
    /// Count is checked before size. Stored records are weighed by their
    /// decoded size, candidates by their raw size.
    pub fn evaluate<C: Candidate>(&self, current: &[ImageRecord], candidates: &[C]) -> Verdict {
        let incoming = candidates.len();
        if current.len() + incoming > self.max_count {
            debug!(
                current = current.len(),
                incoming,
                max = self.max_count,
                "Batch rejected: count ceiling"
            );
            return Verdict::Reject(LimitViolation::CountExceeded {
                max: self.max_count,
                current: current.len(),
                incoming,
            });
        }

        let current_bytes: u64 = current.iter().map(ImageRecord::decoded_len).sum();
        let new_bytes: u64 = candidates.iter().map(Candidate::size).sum();
        let total_bytes = current_bytes.saturating_add(new_bytes);
        trace!(current_bytes, new_bytes, total_bytes, "Weighing batch");

        if total_bytes > self.max_total_bytes() {
            debug!(
                total_bytes,
                max_bytes = self.max_total_bytes(),
                "Batch rejected: size ceiling"
            );
            return Verdict::Reject(LimitViolation::SizeExceeded {
                max_mb: self.max_total_mb,
                total_bytes,
            });
        }

        Verdict::Accept
    }
}
