//! [`PageHandle`] over a chromiumoxide tab

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::element::Element;
use chromiumoxide::layout::Point;
use chromiumoxide::Page;
use pje_core_types::{ElementQuery, PageError, PageHandle};
use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::error::map_cdp_error;

const POLL_START: Duration = Duration::from_millis(100);
const POLL_CAP: Duration = Duration::from_secs(1);

const VISIBILITY_FN: &str = r#"function() {
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden' || Number(style.opacity) === 0) {
        return false;
    }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

/// Element handle plus the query that produced it, for log and error text.
#[derive(Clone)]
pub struct ChromiumElement {
    inner: Arc<Element>,
    label: String,
}

impl fmt::Debug for ChromiumElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumElement")
            .field("label", &self.label)
            .finish()
    }
}

#[derive(Clone)]
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    /// One pass over the query's matches. Scoped queries search each
    /// container that holds the scope's marker, in document order.
    async fn find_first(&self, query: &ElementQuery) -> Result<Option<Element>, PageError> {
        let Some(scope) = &query.within else {
            let elements = self
                .page
                .find_elements(query.selector.as_str())
                .await
                .map_err(|err| map_cdp_error(err, &query.selector))?;
            return first_accepted(elements, query).await;
        };

        let containers = self
            .page
            .find_elements(scope.container.as_str())
            .await
            .map_err(|err| map_cdp_error(err, &scope.container))?;

        for container in containers {
            let markers = match container.find_elements(scope.marker.selector.as_str()).await {
                Ok(markers) => markers,
                Err(err) => {
                    let mapped = map_cdp_error(err, &scope.marker.selector);
                    if mapped.is_fatal() {
                        return Err(mapped);
                    }
                    continue;
                }
            };
            if first_accepted(markers, &scope.marker).await?.is_none() {
                continue;
            }

            let elements = match container.find_elements(query.selector.as_str()).await {
                Ok(elements) => elements,
                Err(err) => {
                    let mapped = map_cdp_error(err, &query.selector);
                    if mapped.is_fatal() {
                        return Err(mapped);
                    }
                    continue;
                }
            };
            if let Some(element) = first_accepted(elements, query).await? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    async fn dispatch_key(&self, kind: DispatchKeyEventType, key: &str) -> Result<(), PageError> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind)
            .key(key.to_string())
            .code(key.to_string());
        if let Some(code) = virtual_key_code(key) {
            builder = builder.windows_virtual_key_code(code);
        }
        let params = builder.build().map_err(PageError::Input)?;
        self.page
            .execute(params)
            .await
            .map_err(|err| map_cdp_error(err, key))?;
        Ok(())
    }
}

/// First element whose rendered text passes the query's filter.
async fn first_accepted(
    elements: Vec<Element>,
    query: &ElementQuery,
) -> Result<Option<Element>, PageError> {
    for element in elements {
        if query.has_text.is_none() {
            return Ok(Some(element));
        }
        let text = match element.inner_text().await {
            Ok(text) => text.unwrap_or_default(),
            Err(err) => {
                let mapped = map_cdp_error(err, &query.selector);
                if mapped.is_fatal() {
                    return Err(mapped);
                }
                continue;
            }
        };
        if query.accepts_text(&text) {
            return Ok(Some(element));
        }
    }
    Ok(None)
}

fn virtual_key_code(key: &str) -> Option<i64> {
    match key {
        "Escape" => Some(27),
        "Enter" => Some(13),
        "Tab" => Some(9),
        _ => None,
    }
}

/// Poll delay after `current`: doubled, never above the cap.
fn next_delay(current: Duration) -> Duration {
    (current * 2).min(POLL_CAP)
}

#[async_trait]
impl PageHandle for ChromiumPage {
    type Element = ChromiumElement;

    async fn wait_for(
        &self,
        query: &ElementQuery,
        timeout: Duration,
    ) -> Result<ChromiumElement, PageError> {
        let deadline = Instant::now() + timeout;
        let mut delay = POLL_START;

        loop {
            match self.find_first(query).await {
                Ok(Some(element)) => {
                    return Ok(ChromiumElement {
                        inner: Arc::new(element),
                        label: query.to_string(),
                    })
                }
                Ok(None) => trace!(%query, "no match yet"),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => debug!(%query, error = %err, "lookup failed; polling again"),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(PageError::timeout(query.to_string(), timeout));
            }
            sleep(delay.min(deadline - now)).await;
            delay = next_delay(delay);
        }
    }

    async fn is_visible(&self, element: &ChromiumElement) -> Result<bool, PageError> {
        let returns = element
            .inner
            .call_js_fn(VISIBILITY_FN, false)
            .await
            .map_err(|err| map_cdp_error(err, &element.label))?;
        Ok(returns
            .result
            .value
            .as_ref()
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    async fn attribute(
        &self,
        element: &ChromiumElement,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        element
            .inner
            .attribute(name)
            .await
            .map_err(|err| map_cdp_error(err, &element.label))
    }

    async fn click(&self, element: &ChromiumElement) -> Result<(), PageError> {
        element
            .inner
            .click()
            .await
            .map_err(|err| map_cdp_error(err, &element.label))?;
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| map_cdp_error(err, "evaluate"))?;
        result
            .into_value::<Value>()
            .map_err(|err| PageError::Script(err.to_string()))
    }

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        self.dispatch_key(DispatchKeyEventType::KeyDown, key).await?;
        self.dispatch_key(DispatchKeyEventType::KeyUp, key).await
    }

    async fn mouse_click(&self, x: f64, y: f64) -> Result<(), PageError> {
        self.page
            .click(Point { x, y })
            .await
            .map_err(|err| map_cdp_error(err, "mouse"))?;
        Ok(())
    }

    async fn wait_for_timeout(&self, duration: Duration) {
        sleep(duration).await;
    }
}
