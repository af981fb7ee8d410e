//! Pagination cursors for the two listing protocols.

use std::collections::HashSet;

use super::page::ListingPage;

/// Position in a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaginationCursor {
    /// First request of a session.
    Start,
    /// Protocol v1: resume after this key.
    Marker(String),
    /// Protocol v2: opaque server token.
    ContinuationToken(String),
}

/// `(marker, continuation token)` pair identifying one issued request.
pub type CursorIdentity = (Option<String>, Option<String>);

impl PaginationCursor {
    pub fn identity(&self) -> CursorIdentity {
        match self {
            Self::Start => (None, None),
            Self::Marker(marker) => (Some(marker.clone()), None),
            Self::ContinuationToken(token) => (None, Some(token.clone())),
        }
    }

    /// Query parameters, in request order, for a listing under `prefix`.
    pub fn query_pairs(&self, prefix: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("prefix", prefix.to_string())];
        match self {
            Self::Start => {}
            Self::Marker(marker) => pairs.push(("marker", marker.clone())),
            Self::ContinuationToken(token) => {
                pairs.push(("list-type", String::from("2")));
                pairs.push(("continuation-token", token.clone()));
            }
        }
        pairs
    }
}

/// Cursor state of one enumeration session.
///
/// Owns the visited set so a cursor pair is issued at most once, and
/// remembers whether the server has switched the session to continuation
/// tokens.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    current: PaginationCursor,
    visited: HashSet<CursorIdentity>,
    continuation_seen: bool,
}

impl Default for CursorTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorTracker {
    pub fn new() -> Self {
        Self {
            current: PaginationCursor::Start,
            visited: HashSet::new(),
            continuation_seen: false,
        }
    }

    pub fn current(&self) -> &PaginationCursor {
        &self.current
    }

    pub fn continuation_seen(&self) -> bool {
        self.continuation_seen
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Record that the current cursor is about to be requested.
    ///
    /// Returns `false` if this cursor pair was already issued, meaning the
    /// listing is not making progress.
    pub fn claim_current(&mut self) -> bool {
        self.visited.insert(self.current.identity())
    }

    /// Derive the cursor following a truncated `page`.
    ///
    /// Preference: server continuation token, then server next-marker, then
    /// the greatest key seen on the page. Once a continuation token has been
    /// seen the session never falls back to markers. Returns `false` when no
    /// next cursor exists.
    pub fn advance(&mut self, page: &ListingPage) -> bool {
        let next = if let Some(token) = &page.next_continuation_token {
            Some(PaginationCursor::ContinuationToken(token.clone()))
        } else if self.continuation_seen {
            None
        } else {
            page.next_marker
                .clone()
                .or_else(|| page.last_key.clone())
                .map(PaginationCursor::Marker)
        };

        match next {
            Some(cursor) => {
                if matches!(cursor, PaginationCursor::ContinuationToken(_)) {
                    self.continuation_seen = true;
                }
                self.current = cursor;
                true
            }
            None => false,
        }
    }
}
