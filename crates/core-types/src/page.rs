use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PageError;
use crate::query::ElementQuery;

/// Capability over a live, already-open page.
///
/// The caller owns the handle. Implementations are not expected to be safe
/// for interleaved use: one logical flow drives a page at a time.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Opaque element reference, valid only while the page lives.
    type Element: Clone + fmt::Debug + Send + Sync;

    /// Wait until the first candidate for `query` is attached, up to `timeout`.
    async fn wait_for(
        &self,
        query: &ElementQuery,
        timeout: Duration,
    ) -> Result<Self::Element, PageError>;

    /// Rendered visibility, not just DOM presence.
    async fn is_visible(&self, element: &Self::Element) -> Result<bool, PageError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, PageError>;

    async fn click(&self, element: &Self::Element) -> Result<(), PageError>;

    /// Evaluate an expression in the page and return its JSON value.
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError>;

    async fn press_key(&self, key: &str) -> Result<(), PageError>;

    /// Pointer click at viewport coordinates.
    async fn mouse_click(&self, x: f64, y: f64) -> Result<(), PageError>;

    async fn wait_for_timeout(&self, duration: Duration);
}
