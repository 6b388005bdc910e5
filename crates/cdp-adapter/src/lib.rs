//! Chromium DevTools Protocol adapter for the PJe automation.
//!
//! Attaches to an already-running, already-authenticated browser and exposes
//! one of its tabs through the [`pje_core_types::PageHandle`] port.

pub mod config;
pub mod error;
pub mod page;
pub mod session;

pub use config::{CdpConfig, DEFAULT_ENDPOINT};
pub use error::{map_cdp_error, AdapterError};
pub use page::{ChromiumElement, ChromiumPage};
pub use session::ChromiumSession;
