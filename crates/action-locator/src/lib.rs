//! Resilient element location for the PJe "Adicionar Órgão Julgador" control
//!
//! This crate implements the locator used by the form automation:
//! - Panel-expansion precondition (best effort, typed outcome)
//! - Overlay clearing before every search
//! - Ordered strategy cascade, first visible match wins
//! - In-page text heuristic as the last strategy
//! - Bounded structural retry with a configurable interval

pub mod errors;
pub mod overlay;
pub mod precondition;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use overlay::*;
pub use precondition::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
