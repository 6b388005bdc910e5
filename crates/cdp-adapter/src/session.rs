use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CdpConfig;
use crate::error::AdapterError;
use crate::page::ChromiumPage;

/// Connection to a browser the user already started and logged into.
///
/// The handler task drives the websocket; dropping the session aborts it
/// but leaves the browser running.
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    pub async fn connect(config: &CdpConfig) -> Result<Self, AdapterError> {
        info!(endpoint = %config.endpoint, "Attaching to browser");
        let handler_config = HandlerConfig {
            request_timeout: config.request_timeout(),
            ..HandlerConfig::default()
        };
        let (browser, mut handler) =
            Browser::connect_with_config(config.endpoint.clone(), handler_config)
                .await
                .map_err(|source| AdapterError::Connect {
                    endpoint: config.endpoint.clone(),
                    source,
                })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "cdp-session", error = %err, "handler event error");
                }
            }
            warn!(target: "cdp-session", "browser connection closed");
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// The tab whose URL contains `target_url_contains`, or the first tab.
    pub async fn page(&mut self, config: &CdpConfig) -> Result<ChromiumPage, AdapterError> {
        self.browser.fetch_targets().await?;
        let pages = self.browser.pages().await?;
        debug!(count = pages.len(), "Browser pages discovered");

        let selected = match config.target_url_contains.as_deref() {
            Some(fragment) => select_by_url(pages, fragment).await?,
            None => pages.into_iter().next(),
        };

        let page = selected.ok_or_else(|| {
            AdapterError::NoPage(
                config
                    .target_url_contains
                    .clone()
                    .unwrap_or_else(|| "any open tab".to_string()),
            )
        })?;
        Ok(ChromiumPage::new(page))
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

async fn select_by_url(pages: Vec<Page>, fragment: &str) -> Result<Option<Page>, AdapterError> {
    for page in pages {
        let url = page.url().await?.unwrap_or_default();
        if url_matches(&url, fragment) {
            info!(%url, "Selected page");
            return Ok(Some(page));
        }
    }
    Ok(None)
}

fn url_matches(url: &str, fragment: &str) -> bool {
    url.contains(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_fragment_match() {
        assert!(url_matches(
            "https://pje.trt.jus.br/pjekz/pessoa-fisica/123/perito",
            "pessoa-fisica"
        ));
        assert!(!url_matches("about:blank", "pjekz"));
    }
}
