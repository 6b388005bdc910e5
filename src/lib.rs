//! PJe form automation
//!
//! Command-line front end for the "Adicionar Órgão Julgador" locator. The
//! locator itself lives in `action-locator`; the browser side in
//! `cdp-adapter`.

pub mod cli;
pub mod config;

pub use config::{AppConfig, LoggingConfig};
