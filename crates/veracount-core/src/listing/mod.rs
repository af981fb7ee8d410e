//! Paginated discovery of object keys under a prefix.
//!
//! Listing backends speak one of two pagination dialects:
//!
//! | Protocol | Request parameter | Response field |
//! |----------|-------------------|----------------|
//! | v1 | `marker` | `NextMarker` (optional) |
//! | v2 | `list-type=2&continuation-token` | `NextContinuationToken` |
//!
//! [`ListingEnumerator`] follows whichever the server offers and terminates
//! through two independent guards: a visited set of issued cursor pairs
//! (non-progress ends the walk with the keys gathered so far) and a hard
//! page ceiling (exceeding it is a [`RefreshError::Listing`]).

mod cursor;
mod page;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::RefreshConfig;
use crate::error::RefreshError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::key::{KeyFilter, ObjectKey};

pub use cursor::{CursorIdentity, CursorTracker, PaginationCursor};
pub use page::{parse_listing_page, unescape_xml, ListingPage};

/// Walks every listing page under one prefix.
#[derive(Clone)]
pub struct ListingEnumerator {
    http_client: Arc<dyn HttpClient>,
    origin: String,
    filter: KeyFilter,
    max_pages: usize,
    timeout_ms: u64,
    user_agent: String,
}

impl ListingEnumerator {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &RefreshConfig) -> Self {
        Self {
            http_client,
            origin: config.origin_base().to_string(),
            filter: KeyFilter::new(config.prefix.clone(), config.extension.clone()),
            max_pages: config.max_listing_pages,
            timeout_ms: config.request_timeout_ms,
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn filter(&self) -> &KeyFilter {
        &self.filter
    }

    /// Listing URL for `cursor`.
    pub fn listing_url(&self, cursor: &PaginationCursor) -> String {
        let query = cursor
            .query_pairs(self.filter.prefix())
            .into_iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/?{query}", self.origin)
    }

    /// Enumerate all matching keys under the configured prefix.
    ///
    /// The returned set is deduplicated and sorted.
    ///
    /// # Errors
    /// Returns [`RefreshError::Listing`] when a page cannot be fetched or
    /// parsed, or when the page ceiling is reached while the listing still
    /// reports more pages.
    pub async fn enumerate(&self) -> Result<BTreeSet<ObjectKey>, RefreshError> {
        let mut tracker = CursorTracker::new();
        let mut keys = BTreeSet::new();

        let mut page_number = 0;
        loop {
            if !tracker.claim_current() {
                warn!(
                    cursor = ?tracker.current(),
                    keys = keys.len(),
                    "listing cursor repeated; stopping with keys gathered so far"
                );
                return Ok(keys);
            }
            if page_number == self.max_pages {
                return Err(RefreshError::Listing(format!(
                    "pagination did not terminate within {} pages",
                    self.max_pages
                )));
            }
            page_number += 1;

            let url = self.listing_url(tracker.current());
            info!(page = page_number, %url, "[list]");
            let page = self.fetch_page(&url).await?;

            let before = keys.len();
            keys.extend(page.keys.iter().cloned());
            debug!(
                page = page_number,
                page_keys = page.keys.len(),
                new_keys = keys.len() - before,
                truncated = page.is_truncated,
                "listing page parsed"
            );

            if !page.is_truncated {
                return Ok(keys);
            }

            if !tracker.advance(&page) {
                debug!(page = page_number, "truncated page carried no next cursor");
                return Ok(keys);
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<ListingPage, RefreshError> {
        let request = HttpRequest::get(url)
            .with_header("user-agent", self.user_agent.as_str())
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| RefreshError::Listing(format!("{url}: {}", error.message())))?;

        if !response.is_success() {
            return Err(RefreshError::Listing(format!(
                "{url}: upstream returned status {}",
                response.status
            )));
        }

        let xml = response
            .text()
            .map_err(|error| RefreshError::Listing(format!("{url}: body is not UTF-8: {error}")))?;

        parse_listing_page(xml, &self.filter)
            .map_err(|message| RefreshError::Listing(format!("{url}: {message}")))
    }
}
