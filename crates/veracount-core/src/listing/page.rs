//! Parsing of bucket listing XML documents.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::key::{KeyFilter, ObjectKey};

static CONTENTS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<Contents>(.*?)</Contents>").expect("contents pattern is valid")
});

static KEY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Key>(.*?)</Key>").expect("key pattern is valid"));

static IS_TRUNCATED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<IsTruncated>(.*?)</IsTruncated>").expect("truncation pattern is valid")
});

static NEXT_TOKEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<NextContinuationToken>(.*?)</NextContinuationToken>")
        .expect("token pattern is valid")
});

static NEXT_MARKER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<NextMarker>(.*?)</NextMarker>").expect("marker pattern is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

/// One parsed listing response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPage {
    /// Keys on this page that passed the filter, in document order.
    pub keys: Vec<ObjectKey>,
    /// Greatest key on the page, filtered or not.
    pub last_key: Option<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
    pub next_marker: Option<String>,
}

/// Parse a listing document, keeping only keys accepted by `filter`.
///
/// A missing `<IsTruncated>` element reads as the final page. Empty
/// `NextContinuationToken`/`NextMarker` elements read as absent.
pub fn parse_listing_page(xml: &str, filter: &KeyFilter) -> Result<ListingPage, String> {
    if !xml.contains("<ListBucketResult") {
        return Err(String::from("response is not a ListBucketResult document"));
    }

    let mut page = ListingPage::default();
    for block in CONTENTS_BLOCK.captures_iter(xml) {
        let Some(key) = tag_value(&KEY_TAG, &block[1]) else {
            continue;
        };

        if page.last_key.as_deref().map_or(true, |last| key.as_str() > last) {
            page.last_key = Some(key.clone());
        }
        if let Some(key) = filter.accept(&key) {
            page.keys.push(key);
        }
    }

    page.is_truncated = match tag_value(&IS_TRUNCATED_TAG, xml) {
        None => false,
        Some(value) if value.eq_ignore_ascii_case("true") => true,
        Some(value) if value.eq_ignore_ascii_case("false") => false,
        Some(value) => return Err(format!("unexpected IsTruncated value '{value}'")),
    };
    page.next_continuation_token = tag_value(&NEXT_TOKEN_TAG, xml);
    page.next_marker = tag_value(&NEXT_MARKER_TAG, xml);

    Ok(page)
}

/// Text of the first element matched by `pattern`, trimmed and unescaped.
fn tag_value(pattern: &Regex, source: &str) -> Option<String> {
    let raw = pattern.captures(source)?.get(1)?.as_str().trim();
    if raw.is_empty() {
        return None;
    }
    Some(unescape_xml(raw))
}

/// Decode the predefined XML entities and numeric character references.
/// Unknown entities are left untouched.
pub fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
