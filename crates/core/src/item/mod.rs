//! Conversion queue items and their transient resources.
//!
//! An [`ItemStore`] holds the ordered queue of images the user submitted,
//! one [`ConversionItem`] per file. Preview and result payloads are
//! [`TransientHandle`]s allocated from a [`HandleRegistry`], which accounts
//! for every handle ever created so leak checks can assert that each one
//! is released exactly once.

mod handle;
mod store;
mod types;

pub use handle::{HandleRegistry, TransientHandle};
pub use store::{ItemStore, ItemView, ReadyResult};
pub use types::{ConversionItem, ItemStatus, SourceImage};
