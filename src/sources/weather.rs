//! Weather forecast client.
//!
//! Forecasts are cached under a single key for every location; a process
//! serves one configured location.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::CacheAside;
use crate::config::WeatherConfig;
use crate::outcome::{Error, ErrorCatalog, ErrorKind, Outcome};
use crate::sources::{decode_response, endpoint, invalid_endpoint, SourceClient};
use crate::transport::{Transport, UpstreamRequest};

pub const SOURCE: &str = "weather";
pub const CACHE_KEY: &str = "weather.forecast";

pub const ERRORS: ErrorCatalog = ErrorCatalog {
    failed_response: Error::new(
        "weather.failed_response",
        ErrorKind::UpstreamUnavailable,
        "Weather service request failed",
    ),
    empty_response: Error::new(
        "weather.empty_response",
        ErrorKind::EmptyUpstreamResponse,
        "Weather service returned an empty response",
    ),
    malformed_response: Error::new(
        "weather.malformed_response",
        ErrorKind::MalformedUpstreamResponse,
        "Weather service response could not be parsed",
    ),
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherForecast {
    pub cod: String,
    pub cnt: u32,
    pub list: Vec<ForecastEntry>,
    pub city: City,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastEntry {
    /// Unix timestamp of the forecast slot.
    pub dt: i64,
    pub main: Readings,
    pub weather: Vec<Condition>,
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct City {
    pub name: String,
    pub country: String,
}

pub struct WeatherClient {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheAside>,
    config: WeatherConfig,
    ttl: Duration,
}

impl WeatherClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<CacheAside>,
        config: WeatherConfig,
        ttl: Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            config,
            ttl,
        }
    }

    async fn request_forecast(&self, location: &str) -> Outcome<WeatherForecast> {
        let mut url = match endpoint(&self.config.api_url, "forecast") {
            Ok(url) => url,
            Err(e) => return invalid_endpoint(SOURCE, &ERRORS, e),
        };
        url.query_pairs_mut()
            .append_pair("q", location)
            .append_pair("appid", &self.config.api_key);

        let result = self.transport.send(UpstreamRequest::get(SOURCE, url)).await;
        decode_response(SOURCE, &ERRORS, result)
    }
}

#[async_trait]
impl SourceClient for WeatherClient {
    type Params = String;
    type Payload = WeatherForecast;

    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, location: String) -> Outcome<WeatherForecast> {
        self.cache
            .get_or_fetch(CACHE_KEY, self.ttl, || self.request_forecast(&location))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stub::StubTransport;
    use reqwest::StatusCode;

    const FORECAST: &str = r#"{
        "cod": "200",
        "cnt": 1,
        "list": [{
            "dt": 1717243200,
            "main": { "temp": 301.2, "feels_like": 300.9, "humidity": 40, "pressure": 1012 },
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky" }],
            "dt_txt": "2024-06-01 12:00:00"
        }],
        "city": { "name": "Athens", "country": "GR" }
    }"#;

    fn client(stub: Arc<StubTransport>) -> WeatherClient {
        let config = WeatherConfig {
            api_url: "http://weather.test/data/2.5".to_string(),
            api_key: "k3y".to_string(),
            ..WeatherConfig::default()
        };
        WeatherClient::new(stub, Arc::new(CacheAside::default()), config, Duration::from_secs(86_400))
    }

    #[tokio::test]
    async fn test_fetch_builds_query_and_decodes() {
        let stub = Arc::new(StubTransport::new().respond(SOURCE, StatusCode::OK, FORECAST));
        let weather = client(stub.clone());

        let outcome = weather.fetch("Athens,GR".to_string()).await;
        let forecast = outcome.value().unwrap();
        assert_eq!(forecast.city.name, "Athens");
        assert_eq!(forecast.list[0].weather[0].description, "clear sky");
        assert_eq!(forecast.list[0].main.humidity, 40.0);

        let requests = stub.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "http://weather.test/data/2.5/forecast?q=Athens%2CGR&appid=k3y"
        );
    }

    #[tokio::test]
    async fn test_second_fetch_served_from_cache() {
        let stub = Arc::new(StubTransport::new().respond(SOURCE, StatusCode::OK, FORECAST));
        let weather = client(stub.clone());

        assert!(weather.fetch("Athens,GR".into()).await.succeeded());
        // Single shared key: another location still hits the cached forecast.
        let again = weather.fetch("Paris,FR".into()).await;
        assert_eq!(again.value().unwrap().city.name, "Athens");
        assert_eq!(stub.calls(SOURCE), 1);
    }

    #[tokio::test]
    async fn test_failures_use_weather_codes() {
        let stub = Arc::new(
            StubTransport::new()
                .respond(SOURCE, StatusCode::OK, "")
                .respond(SOURCE, StatusCode::OK, "<html>oops</html>")
                .respond(SOURCE, StatusCode::UNAUTHORIZED, r#"{"cod":401}"#),
        );
        let weather = client(stub.clone());

        assert_eq!(weather.fetch("x".into()).await.error().code, "weather.empty_response");
        assert_eq!(weather.fetch("x".into()).await.error().code, "weather.malformed_response");
        assert_eq!(weather.fetch("x".into()).await.error().code, "weather.failed_response");
        assert_eq!(stub.calls(SOURCE), 3);
    }
}
