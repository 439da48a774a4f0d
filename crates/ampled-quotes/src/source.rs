//! Quote sources

use crate::error::{QuoteError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Public forismatic endpoint
pub const FORISMATIC_ENDPOINT: &str = "http://api.forismatic.com/api/1.0/";

/// A quotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Quote body
    pub text: String,
    /// Attribution, if known
    pub author: Option<String>,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.author {
            Some(author) => write!(f, "{} ({})", self.text, author),
            None => f.write_str(&self.text),
        }
    }
}

/// Something that produces quotations
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Fetch one quotation
    async fn fetch(&self) -> Result<Quote>;
}

#[derive(Debug, Deserialize)]
struct ForismaticResponse {
    #[serde(rename = "quoteText")]
    quote_text: String,
    #[serde(rename = "quoteAuthor", default)]
    quote_author: String,
}

/// Decode a forismatic JSON body.
///
/// The service escapes apostrophes as `\'`, which is not valid JSON.
pub fn parse_forismatic(body: &str) -> Result<Quote> {
    let cleaned = body.replace("\\'", "'");
    let response: ForismaticResponse =
        serde_json::from_str(&cleaned).map_err(|e| QuoteError::Malformed(e.to_string()))?;

    let text = response.quote_text.trim();
    if text.is_empty() {
        return Err(QuoteError::Empty);
    }
    let author = response.quote_author.trim();

    Ok(Quote {
        text: text.to_string(),
        author: (!author.is_empty()).then(|| author.to_string()),
    })
}

/// forismatic.com quote API
pub struct ForismaticSource {
    client: Client,
    endpoint: String,
    language: String,
}

impl ForismaticSource {
    /// Source for `language` (`ru` or `en`)
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| QuoteError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            language: language.into(),
        })
    }
}

#[async_trait]
impl QuoteSource for ForismaticSource {
    fn name(&self) -> &str {
        "forismatic"
    }

    async fn fetch(&self) -> Result<Quote> {
        debug!(endpoint = %self.endpoint, lang = %self.language, "Fetching quote");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("method", "getQuote"),
                ("format", "json"),
                ("lang", self.language.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::Network(format!(
                "quote API error: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_forismatic(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_author() {
        let quote = parse_forismatic(
            r#"{"quoteText":"Знание есть сила. ","quoteAuthor":"Фрэнсис Бэкон","senderName":"","quoteLink":""}"#,
        )
        .unwrap();
        assert_eq!(quote.text, "Знание есть сила.");
        assert_eq!(quote.author.as_deref(), Some("Фрэнсис Бэкон"));
        assert_eq!(quote.to_string(), "Знание есть сила. (Фрэнсис Бэкон)");
    }

    #[test]
    fn test_parse_without_author() {
        let quote = parse_forismatic(r#"{"quoteText":"Just do it","quoteAuthor":" "}"#).unwrap();
        assert!(quote.author.is_none());
        assert_eq!(quote.to_string(), "Just do it");

        let quote = parse_forismatic(r#"{"quoteText":"Alone"}"#).unwrap();
        assert!(quote.author.is_none());
    }

    #[test]
    fn test_parse_invalid_apostrophe_escape() {
        let quote = parse_forismatic(r#"{"quoteText":"Don\'t panic","quoteAuthor":""}"#).unwrap();
        assert_eq!(quote.text, "Don't panic");
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            parse_forismatic("<html>busy</html>"),
            Err(QuoteError::Malformed(_))
        ));
        assert!(matches!(
            parse_forismatic(r#"{"quoteAuthor":"x"}"#),
            Err(QuoteError::Malformed(_))
        ));
        assert!(matches!(
            parse_forismatic(r#"{"quoteText":"  "}"#),
            Err(QuoteError::Empty)
        ));
    }

    #[test]
    fn test_source_builds() {
        let source = ForismaticSource::new(FORISMATIC_ENDPOINT, "ru").unwrap();
        assert_eq!(source.name(), "forismatic");
    }
}
