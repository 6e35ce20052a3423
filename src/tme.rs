use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::domain::RawTerm;
use crate::error::TransformerError;

const TOKEN_HEADER: &str = "x-coco-auth";

/// Paginated access to a source taxonomy.
///
/// `fetch_page` returns the terms starting at `offset`. An offset past the
/// end of the data yields an empty page, never an error, and callers may
/// advance the offset monotonically for as long as pages keep coming.
pub trait TermSource: Send + Sync {
    fn fetch_page(&self, offset: usize) -> Result<Vec<RawTerm>, TransformerError>;
}

#[derive(Debug, Clone)]
pub struct TmeSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub token: String,
    pub taxonomy_name: String,
    pub max_records: usize,
    pub slices: usize,
}

pub struct TmeHttpClient {
    client: Client,
    settings: TmeSettings,
}

impl TmeHttpClient {
    pub fn new(settings: TmeSettings) -> Result<Self, TransformerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("taxonomy-transformer/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| TransformerError::TmeHttp(err.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/xml;charset=utf-8"),
        );
        if !settings.token.is_empty() {
            headers.insert(
                TOKEN_HEADER,
                HeaderValue::from_str(&settings.token)
                    .map_err(|err| TransformerError::InvalidConfig(format!("token: {err}")))?,
            );
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|err| TransformerError::TmeHttp(err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn terms_url(&self, start_record: usize, maximum_records: usize) -> String {
        terms_url(
            &self.settings.base_url,
            &self.settings.taxonomy_name,
            start_record,
            maximum_records,
        )
    }

    fn fetch_slice(
        &self,
        start_record: usize,
        maximum_records: usize,
    ) -> Result<Vec<RawTerm>, TransformerError> {
        let url = self.terms_url(start_record, maximum_records);
        let response = self.send_with_retries(|| {
            let request = self.client.get(&url);
            if self.settings.username.is_empty() {
                request
            } else {
                request.basic_auth(&self.settings.username, Some(&self.settings.password))
            }
        })?;
        let response = Self::handle_status(response)?;
        let body = response
            .text()
            .map_err(|err| TransformerError::TmeHttp(err.to_string()))?;
        let terms = parse_taxonomy(&body)?;
        debug!(start_record, maximum_records, terms = terms.len(), "fetched TME slice");
        Ok(terms)
    }

    fn send_with_retries<F>(
        &self,
        mut make_req: F,
    ) -> Result<reqwest::blocking::Response, TransformerError>
    where
        F: FnMut() -> reqwest::blocking::RequestBuilder,
    {
        const MAX_RETRIES: u32 = 5;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0u32;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS << attempt));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS << attempt));
                        attempt += 1;
                        continue;
                    }
                    return Err(TransformerError::TmeHttp(err.to_string()));
                }
            }
        }
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, TransformerError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "TME request failed".to_string());
        Err(TransformerError::TmeStatus { status, message })
    }
}

impl TermSource for TmeHttpClient {
    fn fetch_page(&self, offset: usize) -> Result<Vec<RawTerm>, TransformerError> {
        let ranges = slice_ranges(offset, self.settings.max_records, self.settings.slices);
        let results = thread::scope(|scope| {
            let handles = ranges
                .iter()
                .map(|&(start, count)| scope.spawn(move || self.fetch_slice(start, count)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(TransformerError::TmeHttp("TME fetch thread panicked".to_string()))
                    })
                })
                .collect::<Vec<_>>()
        });

        let mut terms = Vec::new();
        for result in results {
            terms.extend(result?);
        }
        Ok(terms)
    }
}

pub fn terms_url(
    base_url: &str,
    taxonomy_name: &str,
    start_record: usize,
    maximum_records: usize,
) -> String {
    format!(
        "{base_url}/rs/authorityfiles/GL/terms?maximumRecords={maximum_records}&startRecord={start_record}&query=(dc.taxonomyName={taxonomy_name})"
    )
}

/// Splits one page into `slices` contiguous `(start, count)` requests. The
/// last slice takes the remainder.
pub fn slice_ranges(offset: usize, max_records: usize, slices: usize) -> Vec<(usize, usize)> {
    let slices = slices.clamp(1, max_records.max(1));
    let chunk = max_records / slices;
    (0..slices)
        .map(|i| {
            let start = offset + i * chunk;
            let count = if i + 1 == slices {
                max_records - i * chunk
            } else {
                chunk
            };
            (start, count)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    #[serde(rename = "term", default)]
    terms: Vec<RawTerm>,
}

pub fn parse_taxonomy(xml: &str) -> Result<Vec<RawTerm>, TransformerError> {
    let document: TaxonomyDocument =
        quick_xml::de::from_str(xml).map_err(|err| TransformerError::TmeParse(err.to_string()))?;
    Ok(document.terms)
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_cover_whole_page() {
        assert_eq!(slice_ranges(20, 10, 3), vec![(20, 3), (23, 3), (26, 4)]);
        assert_eq!(slice_ranges(0, 4, 10), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);
    }
}
