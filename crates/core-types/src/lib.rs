//! Shared primitives for the PJe form automation crates.
//!
//! The locator never talks to a browser directly. It drives a [`PageHandle`]
//! port, asks for elements through [`ElementQuery`] values and reports driver
//! failures as [`PageError`]. The process-wide [`AutomationConfig`] lives here
//! so both the binary and the locator read the same interval.

pub mod config;
pub mod error;
pub mod page;
pub mod query;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::AutomationConfig;
pub use error::PageError;
pub use page::PageHandle;
pub use query::{normalize_text, ElementQuery, Scope, TextMatcher};
