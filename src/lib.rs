//! Image gallery library - persisted, reorderable gallery state with
//! validated, batch-limited uploads.
//!
//! This library exposes the core of the `gallery` CLI for use in tests and
//! by other front ends.
//!
//! # Modules
//!
//! - `record`: image records encoded as data URIs
//! - `limits`: batch-wide count and size ceilings
//! - `storage`: key-value backends (`SQLite`, memory) and the gallery encoding
//! - `state`: the state manager, owner of the canonical sequence
//! - `pipeline`: per-file upload state machine
//! - `gallery`: the session facade presentations talk to
//! - `view`, `notify`: callbacks to the presentation and the notice slot
//! - `config`, `logging`, `cli`, `output`: the CLI's ambient layers
#![forbid(unsafe_code)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod gallery;
pub mod image_ops;
pub mod limits;
pub mod logging;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod state;
pub mod storage;
pub mod theme;
pub mod view;
