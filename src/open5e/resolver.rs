//! Open5e lookups: broad search, category narrowing and directory listing.
//!
//! A wide search hits the cross-category `search/` endpoint first. Its
//! records are abbreviated, so the best hit is only used as a locator: the
//! category named by its `route` is queried again, filtered by the first
//! word of the hit, and the user's input is matched once more against that
//! narrower result set.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::entity::{Entity, UnknownEntityKind};
use super::filter::FilterPolicy;
use super::matcher::{search_response, Match, MatchReport};
use super::transport::Transport;
use crate::common::error::{ResolveError, ResolveResult};

/// Default page size asked of the API, large enough to fit any category.
pub const DEFAULT_RESULT_LIMIT: u32 = 10000;

/// What a resolution found.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    /// The response was fine but nothing matched.
    NotFound,
    /// The authoritative record and the category it belongs to.
    Single { matched: Match, category: String },
    /// Every match of the first pass, best first.
    List(Vec<Match>),
}

/// Result of a resolution plus any malformed records met along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub result: ResolutionResult,
    pub unknown: Vec<UnknownEntityKind>,
}

/// Client for the Open5e API.
#[derive(Clone)]
pub struct Open5eClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    policy: FilterPolicy,
    limit: u32,
}

impl Open5eClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        policy: FilterPolicy,
        limit: u32,
    ) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            transport,
            base_url,
            policy,
            limit,
        }
    }

    /// URL of a listing under `path` with the standard parameters and an
    /// optional filter.
    fn listing_url(&self, path: &str, filter: Option<(&str, &str)>) -> String {
        let raw = format!("{}{}", self.base_url, path);
        let limit = self.limit.to_string();
        let mut params = vec![("format", "json"), ("limit", limit.as_str())];
        if let Some(filter) = filter {
            params.push(filter);
        }
        match Url::parse_with_params(&raw, &params) {
            Ok(url) => url.to_string(),
            Err(e) => {
                // Keep the raw URL so the transport failure shows what was built
                warn!("Could not build URL from '{}': {}", raw, e);
                raw
            }
        }
    }

    /// Broad query against the cross-category `search/` endpoint.
    pub fn search_url(&self, term: &str) -> String {
        self.listing_url("search/", Some(("text", term)))
    }

    /// Query against one category, filtered with the parameter the
    /// category supports.
    pub fn category_url(&self, category: &str, term: &str) -> String {
        let path = directory_path(category);
        self.listing_url(&path, Some((self.policy.param_for(category), term)))
    }

    /// Unfiltered listing of a whole category.
    pub fn directory_url(&self, category: &str) -> String {
        self.listing_url(&directory_path(category), None)
    }

    /// URL of the API root.
    pub fn root_url(&self) -> String {
        match Url::parse_with_params(&self.base_url, &[("format", "json")]) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}?format=json", self.base_url),
        }
    }

    /// GET `query` and decode the body as JSON.
    async fn fetch_json(&self, query: &str) -> ResolveResult<Value> {
        let response = self
            .transport
            .get(query)
            .await
            .map_err(|message| ResolveError::Connection {
                query: query.to_string(),
                message,
            })?;

        if !response.is_ok() {
            return Err(ResolveError::Transport {
                status: response.status,
                query: query.to_string(),
            });
        }

        serde_json::from_str(&response.body).map_err(|e| ResolveError::Decode {
            query: query.to_string(),
            message: e.to_string(),
        })
    }

    /// GET `query` and return its `results` array.
    async fn fetch_results(&self, query: &str) -> ResolveResult<Vec<Value>> {
        match self.fetch_json(query).await? {
            Value::Object(mut body) => match body.remove("results") {
                Some(Value::Array(results)) => Ok(results),
                _ => Err(ResolveError::Decode {
                    query: query.to_string(),
                    message: "missing `results` array".to_string(),
                }),
            },
            Value::Array(results) => Ok(results),
            _ => Err(ResolveError::Decode {
                query: query.to_string(),
                message: "response is neither an object nor an array".to_string(),
            }),
        }
    }

    /// Resolve `normalized_input` starting from `query`.
    ///
    /// - `list_results` returns every first-pass match and never narrows.
    /// - Otherwise the best match is taken. Without `wide_search` it is
    ///   final and `category` labels it. With `wide_search` its `route`
    ///   is queried again and the same input is re-matched there; the
    ///   first-pass hit is discarded either way.
    ///
    /// At most two requests are made, the second only after the first
    /// succeeded. Non-200 responses end the resolution with
    /// [`ResolveError::Transport`] carrying the URL that failed.
    pub async fn request_open5e(
        &self,
        query: &str,
        normalized_input: &str,
        category: &str,
        wide_search: bool,
        list_results: bool,
    ) -> ResolveResult<Resolution> {
        let results = self.fetch_results(query).await?;
        let MatchReport { matches, mut unknown } = search_response(results, normalized_input);

        log_unknown(&unknown, query);

        let Some(first) = matches.first() else {
            debug!("No match for '{}' in {}", normalized_input, query);
            return Ok(Resolution {
                result: ResolutionResult::NotFound,
                unknown,
            });
        };

        if list_results {
            info!("{} matches for '{}' in {}", matches.len(), normalized_input, query);
            return Ok(Resolution {
                result: ResolutionResult::List(matches),
                unknown,
            });
        }

        if !wide_search {
            let matched = first.clone();
            return Ok(Resolution {
                result: ResolutionResult::Single {
                    matched,
                    category: category.to_string(),
                },
                unknown,
            });
        }

        // Wide search: the hit only tells us where to look
        let locator = &first.entity;
        let route = locator
            .route()
            .ok_or_else(|| ResolveError::MissingRoute {
                label: locator.label().to_string(),
                query: query.to_string(),
            })?
            .to_string();

        let narrow_query = self.listing_url(
            &directory_path(&route),
            Some((self.policy.param_for(&route), locator.first_word())),
        );
        debug!("Narrowing '{}' via {}", normalized_input, narrow_query);

        let narrowed = self.fetch_results(&narrow_query).await?;
        let report = search_response(narrowed, normalized_input);
        log_unknown(&report.unknown, &narrow_query);
        unknown.extend(report.unknown);

        let result = match report.matches.into_iter().next() {
            Some(matched) => ResolutionResult::Single {
                matched,
                category: route,
            },
            None => {
                debug!("Locator for '{}' found nothing in {}", normalized_input, narrow_query);
                ResolutionResult::NotFound
            }
        };

        Ok(Resolution { result, unknown })
    }

    /// Category names advertised by the API root, `search` excluded.
    pub async fn directories(&self) -> ResolveResult<Vec<String>> {
        let query = self.root_url();
        match self.fetch_json(&query).await? {
            Value::Object(root) => Ok(root
                .into_iter()
                .map(|(key, _)| key)
                .filter(|key| key != "search")
                .collect()),
            _ => Err(ResolveError::Decode {
                query,
                message: "root is not an object".to_string(),
            }),
        }
    }

    /// Labels of every record in a category (or in `search` for the whole
    /// database).
    pub async fn entity_labels(&self, category: &str) -> ResolveResult<EntityLabels> {
        let query = self.directory_url(category);
        let results = self.fetch_results(&query).await?;

        let mut listing = EntityLabels {
            labels: Vec::with_capacity(results.len()),
            unknown: Vec::new(),
        };
        for value in results {
            match Entity::try_from(value) {
                Ok(entity) => listing.labels.push(entity.label().to_string()),
                Err(unknown) => listing.unknown.push(unknown),
            }
        }
        log_unknown(&listing.unknown, &query);

        Ok(listing)
    }
}

/// Labels of a whole listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityLabels {
    pub labels: Vec<String>,
    pub unknown: Vec<UnknownEntityKind>,
}

/// `category` with exactly one trailing slash.
fn directory_path(category: &str) -> String {
    format!("{}/", category.trim_matches('/'))
}

fn log_unknown(unknown: &[UnknownEntityKind], query: &str) {
    for entity in unknown {
        warn!("Skipping unrecognised entity from {}: {}", query, entity.raw);
    }
}
