//! Scryfall card art lookup, used to decorate result embeds.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::open5e::Transport;

/// Default Scryfall API root.
pub const DEFAULT_SCRYFALL_URL: &str = "https://api.scryfall.com/";

/// Finds a card art crop matching a search term.
#[derive(Clone)]
pub struct ScryfallClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl ScryfallClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { transport, base_url }
    }

    fn search_url(&self, query: &str) -> String {
        let raw = format!("{}cards/search", self.base_url);
        let params = [
            ("q", query),
            ("include_extras", "true"),
            ("include_multilingual", "true"),
            ("include_variations", "true"),
        ];
        Url::parse_with_params(&raw, &params)
            .map(|url| url.to_string())
            .unwrap_or(raw)
    }

    /// Art crop URL for the first card matching `terms`.
    ///
    /// Tries the whole phrase, then only the first word when the phrase
    /// finds nothing. Every failure ends in `None`.
    pub async fn thumbnail(&self, terms: &[&str]) -> Option<String> {
        let first = terms.iter().copied().find(|t| !t.is_empty())?;

        let url = self.search_url(&terms.join(" "));
        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Scryfall request failed for {}: {}", url, e);
                return None;
            }
        };

        let response = match response.status {
            200 => response,
            404 => {
                info!("Scryfall 1st attempt - no matches found for: {}", url);
                let url = self.search_url(first);
                match self.transport.get(&url).await {
                    Ok(retry) if retry.is_ok() => retry,
                    Ok(_) | Err(_) => {
                        info!("Scryfall 2nd attempt - no matches found for: {}", url);
                        return None;
                    }
                }
            }
            status => {
                warn!("Scryfall request failed with {} for: {}", status, url);
                return None;
            }
        };

        let body: Value = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(e) => {
                warn!("Scryfall returned an unreadable body: {}", e);
                return None;
            }
        };

        let art = art_crop(&body);
        if art.is_none() {
            debug!("Scryfall card has no art crop");
        }
        art
    }
}

/// `art_crop` of the first card, preferring its first face.
fn art_crop(body: &Value) -> Option<String> {
    let card = body.get("data")?.as_array()?.first()?;

    let from_face = card
        .get("card_faces")
        .and_then(Value::as_array)
        .and_then(|faces| faces.first())
        .and_then(|face| face.pointer("/image_uris/art_crop"));

    from_face
        .or_else(|| card.pointer("/image_uris/art_crop"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open5e::transport::fake::FakeTransport;
    use serde_json::json;

    fn url(q: &str) -> String {
        format!(
            "https://api.scryfall.com/cards/search?q={}&include_extras=true&include_multilingual=true&include_variations=true",
            q
        )
    }

    fn card(art: &str) -> Value {
        json!({"data": [{"card_faces": [{"image_uris": {"art_crop": art}}]}]})
    }

    fn scryfall(transport: FakeTransport) -> (ScryfallClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        (ScryfallClient::new(transport.clone(), "https://api.scryfall.com"), transport)
    }

    #[tokio::test]
    async fn test_full_phrase_hit() {
        let (client, transport) =
            scryfall(FakeTransport::new().with_json(&url("Blue+Dragon"), card("https://img/blue.jpg")));

        let art = client.thumbnail(&["Blue", "Dragon"]).await;
        assert_eq!(art.as_deref(), Some("https://img/blue.jpg"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_falls_back_to_first_word_on_404() {
        let (client, transport) = scryfall(
            FakeTransport::new()
                .with_status(&url("Blue+Wizardly+Dragon"), 404)
                .with_json(&url("Blue"), card("https://img/blue.jpg")),
        );

        let art = client.thumbnail(&["Blue", "Wizardly", "Dragon"]).await;
        assert_eq!(art.as_deref(), Some("https://img/blue.jpg"));
        assert_eq!(transport.requests(), vec![url("Blue+Wizardly+Dragon"), url("Blue")]);
    }

    #[tokio::test]
    async fn test_other_errors_do_not_retry() {
        let (client, transport) = scryfall(FakeTransport::new().with_status(&url("Fireball"), 500));

        assert_eq!(client.thumbnail(&["Fireball"]).await, None);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_top_level_image_used_without_faces() {
        let (client, _) = scryfall(FakeTransport::new().with_json(
            &url("Shock"),
            json!({"data": [{"image_uris": {"art_crop": "https://img/shock.jpg"}}]}),
        ));
        assert_eq!(client.thumbnail(&["Shock"]).await.as_deref(), Some("https://img/shock.jpg"));
    }

    #[tokio::test]
    async fn test_no_terms_no_request() {
        let (client, transport) = scryfall(FakeTransport::new());
        assert_eq!(client.thumbnail(&[]).await, None);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_art_crop_missing() {
        assert_eq!(art_crop(&json!({"data": []})), None);
        assert_eq!(art_crop(&json!({"data": [{"card_faces": []}]})), None);
        assert_eq!(art_crop(&json!({})), None);
    }
}
