//! News search client. Results are never cached.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::NewsConfig;
use crate::outcome::{Error, ErrorCatalog, ErrorKind, Outcome};
use crate::sources::{decode_response, endpoint, invalid_endpoint, SourceClient};
use crate::transport::{Transport, UpstreamRequest};

pub const SOURCE: &str = "news";

pub const ERRORS: ErrorCatalog = ErrorCatalog {
    failed_response: Error::new(
        "news.failed_response",
        ErrorKind::UpstreamUnavailable,
        "News service request failed",
    ),
    empty_response: Error::new(
        "news.empty_response",
        ErrorKind::EmptyUpstreamResponse,
        "News service returned an empty response",
    ),
    malformed_response: Error::new(
        "news.malformed_response",
        ErrorKind::MalformedUpstreamResponse,
        "News service response could not be parsed",
    ),
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsFeed {
    pub status: String,
    pub total_results: u64,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: String,
}

pub struct NewsClient {
    transport: Arc<dyn Transport>,
    config: NewsConfig,
}

impl NewsClient {
    pub fn new(transport: Arc<dyn Transport>, config: NewsConfig) -> Self {
        Self { transport, config }
    }

    fn search_url(&self, query: &str, from: NaiveDate) -> Result<Url, url::ParseError> {
        let mut url = endpoint(&self.config.api_url, "everything")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("from", &from.format("%Y-%m-%d").to_string())
            .append_pair("apiKey", &self.config.api_key);
        Ok(url)
    }
}

#[async_trait]
impl SourceClient for NewsClient {
    type Params = String;
    type Payload = NewsFeed;

    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, query: String) -> Outcome<NewsFeed> {
        let url = match self.search_url(&query, Utc::now().date_naive()) {
            Ok(url) => url,
            Err(e) => return invalid_endpoint(SOURCE, &ERRORS, e),
        };

        let result = self.transport.send(UpstreamRequest::get(SOURCE, url)).await;
        decode_response(SOURCE, &ERRORS, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stub::StubTransport;
    use reqwest::StatusCode;

    const FEED: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": { "id": "wired", "name": "Wired" },
                "author": "A. Writer",
                "title": "Models everywhere",
                "description": null,
                "url": "https://wired.test/a",
                "urlToImage": null,
                "publishedAt": "2024-06-01T09:30:00Z",
                "content": "..."
            },
            {
                "source": { "id": null, "name": "BBC News" },
                "title": "Chips",
                "publishedAt": null
            }
        ]
    }"#;

    fn client(stub: Arc<StubTransport>) -> NewsClient {
        let config = NewsConfig {
            api_url: "http://news.test/v2".to_string(),
            api_key: "secret".to_string(),
            ..NewsConfig::default()
        };
        NewsClient::new(stub, config)
    }

    #[test]
    fn test_search_url_uses_iso_date() {
        let news = client(Arc::new(StubTransport::new()));
        let from = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

        let url = news.search_url("AI", from).unwrap();
        assert_eq!(
            url.as_str(),
            "http://news.test/v2/everything?q=AI&from=2024-03-07&apiKey=secret"
        );
    }

    #[tokio::test]
    async fn test_fetch_decodes_articles() {
        let stub = Arc::new(StubTransport::new().respond(SOURCE, StatusCode::OK, FEED));
        let news = client(stub.clone());

        let feed = news.fetch("AI".to_string()).await.ok().unwrap();
        assert_eq!(feed.total_results, 2);
        assert_eq!(feed.articles[0].source.name, "Wired");
        assert_eq!(
            feed.articles[0].published_at.unwrap().to_rfc3339(),
            "2024-06-01T09:30:00+00:00"
        );
        assert_eq!(feed.articles[1].source.id, None);
        assert!(feed.articles[1].published_at.is_none());
    }

    #[tokio::test]
    async fn test_never_cached() {
        let stub = Arc::new(
            StubTransport::new()
                .respond(SOURCE, StatusCode::OK, FEED)
                .respond(SOURCE, StatusCode::OK, FEED),
        );
        let news = client(stub.clone());

        assert!(news.fetch("AI".into()).await.succeeded());
        assert!(news.fetch("AI".into()).await.succeeded());
        assert_eq!(stub.calls(SOURCE), 2);
    }

    #[tokio::test]
    async fn test_network_failure() {
        let stub = Arc::new(StubTransport::new().fail(SOURCE));
        let outcome = client(stub).fetch("AI".into()).await;
        assert_eq!(outcome.error().code, "news.failed_response");
        assert_eq!(outcome.error().kind, ErrorKind::UpstreamUnavailable);
    }
}
