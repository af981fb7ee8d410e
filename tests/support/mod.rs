//! Shared fixtures for behaviour tests: a scripted transport, listing XML
//! builders, and Parquet payloads.

#![allow(dead_code)]

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use veracount_core::{HttpClient, HttpError, HttpRequest, HttpResponse, RefreshConfig};

pub const ORIGIN: &str = "https://bucket.test";
pub const PREFIX: &str = "v2/verified_contracts/";

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// Transport double that answers from a closure and records every request.
pub struct ScriptedHttpClient {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Serve fixed bodies by exact URL; anything else is a 404.
    pub fn routes(routes: Vec<(String, HttpResponse)>) -> Arc<Self> {
        Self::new(move |request| {
            Ok(routes
                .iter()
                .find(|(url, _)| *url == request.url)
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| HttpResponse::with_status(404, "NoSuchKey")))
        })
    }

    pub fn recorded_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = (self.handler)(&request);
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        Box::pin(async move { response })
    }
}

/// Configuration pointing at the scripted bucket.
pub fn test_config(output_path: &Path) -> RefreshConfig {
    RefreshConfig {
        origin: String::from(ORIGIN),
        prefix: String::from(PREFIX),
        output_path: output_path.to_path_buf(),
        ..RefreshConfig::default()
    }
}

/// Cursor fields of a listing page.
#[derive(Debug, Default, Clone)]
pub struct PageCursor<'a> {
    pub truncated: bool,
    pub next_marker: Option<&'a str>,
    pub next_token: Option<&'a str>,
}

pub fn listing_xml(keys: &[&str], cursor: PageCursor<'_>) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\n",
    );
    xml.push_str(&format!("  <Prefix>{PREFIX}</Prefix>\n"));
    xml.push_str(&format!("  <IsTruncated>{}</IsTruncated>\n", cursor.truncated));
    if let Some(marker) = cursor.next_marker {
        xml.push_str(&format!("  <NextMarker>{marker}</NextMarker>\n"));
    }
    if let Some(token) = cursor.next_token {
        xml.push_str(&format!(
            "  <NextContinuationToken>{token}</NextContinuationToken>\n"
        ));
    }
    for key in keys {
        xml.push_str(&format!(
            "  <Contents><Key>{key}</Key><Size>1</Size></Contents>\n"
        ));
    }
    xml.push_str("</ListBucketResult>\n");
    xml
}

pub fn xml_response(keys: &[&str], cursor: PageCursor<'_>) -> HttpResponse {
    HttpResponse::ok(listing_xml(keys, cursor))
}

/// URL of the first listing request.
pub fn start_url() -> String {
    format!("{ORIGIN}/?prefix={}", urlencoding::encode(PREFIX))
}

pub fn marker_url(marker: &str) -> String {
    format!("{}&marker={}", start_url(), urlencoding::encode(marker))
}

pub fn token_url(token: &str) -> String {
    format!(
        "{}&list-type=2&continuation-token={}",
        start_url(),
        urlencoding::encode(token)
    )
}

pub fn object_url(key: &str) -> String {
    format!("{ORIGIN}/{key}")
}

pub fn key(name: &str) -> String {
    format!("{PREFIX}{name}")
}

/// Bytes of a Parquet file holding the result of `select_sql`.
pub fn parquet_bytes(select_sql: &str) -> Vec<u8> {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("fixture.parquet");
    let connection = duckdb::Connection::open_in_memory().expect("fixture connection");
    connection
        .execute_batch(&format!(
            "COPY ({select_sql}) TO '{}' (FORMAT PARQUET)",
            path.to_string_lossy().replace('\'', "''")
        ))
        .expect("write parquet fixture");
    std::fs::read(&path).expect("read parquet fixture")
}
