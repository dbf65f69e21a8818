//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::transport::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

type Scripted = Result<UpstreamResponse, TransportError>;

/// Answers each source's requests from a queue, in order.
///
/// An exhausted queue answers with a network error.
#[derive(Default)]
pub(crate) struct StubTransport {
    scripts: Mutex<HashMap<&'static str, VecDeque<Scripted>>>,
    seen: Mutex<Vec<UpstreamRequest>>,
    delay: Option<Duration>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, source: &'static str, status: StatusCode, body: &str) -> Self {
        self.push(source, Ok(UpstreamResponse::new(status, body)));
        self
    }

    pub(crate) fn fail(self, source: &'static str) -> Self {
        self.push(
            source,
            Err(TransportError::Network {
                url: format!("http://{source}.test"),
                message: "connection refused".into(),
            }),
        );
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue an answer after construction.
    pub(crate) fn push(&self, source: &'static str, answer: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(source)
            .or_default()
            .push_back(answer);
    }

    pub(crate) fn requests(&self) -> Vec<UpstreamRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self, source: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.source == source)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let source = request.source;
        self.seen.lock().unwrap().push(request);

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(source)
            .and_then(VecDeque::pop_front);

        next.unwrap_or_else(|| {
            Err(TransportError::Network {
                url: format!("http://{source}.test"),
                message: "no scripted response".into(),
            })
        })
    }
}
