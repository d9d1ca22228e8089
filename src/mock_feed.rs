// In-memory feed source for tests: canned documents, request counters and failure injection
use crate::feed_source::{FeedError, FeedKind, FeedSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    // Transport error before any response arrives
    Network,
    // Server answers with a non-2xx status
    ServerError,
    // Server answers 200 with a body that is not a valid feed
    Garbage,
}

#[derive(Default)]
struct FeedState {
    body: String,
    request_count: usize,
    fail_next_requests: usize,
    failure_mode: Option<FailureMode>,
}

impl FeedState {
    fn respond(&mut self, kind: FeedKind) -> Result<String, FeedError> {
        self.request_count += 1;

        if self.fail_next_requests > 0 {
            self.fail_next_requests -= 1;
            return match self.failure_mode.unwrap_or(FailureMode::ServerError) {
                FailureMode::Network => Err(FeedError::Fetch(format!(
                    "{} feed: connection reset",
                    kind
                ))),
                FailureMode::ServerError => Err(FeedError::Status {
                    status_code: 500,
                    message: "Internal Server Error".to_string(),
                }),
                FailureMode::Garbage => Ok("<html><body>maintenance".to_string()),
            };
        }

        Ok(self.body.clone())
    }
}

pub struct MockFeedSource {
    lots: Mutex<FeedState>,
    meta: Mutex<FeedState>,
    delay_ms: AtomicU64,
}

impl MockFeedSource {
    pub fn new(lots_xml: &str, meta_xml: &str) -> Self {
        Self {
            lots: Mutex::new(FeedState {
                body: lots_xml.to_string(),
                ..FeedState::default()
            }),
            meta: Mutex::new(FeedState {
                body: meta_xml.to_string(),
                ..FeedState::default()
            }),
            delay_ms: AtomicU64::new(0),
        }
    }

    fn state(&self, kind: FeedKind) -> &Mutex<FeedState> {
        match kind {
            FeedKind::Lots => &self.lots,
            FeedKind::Meta => &self.meta,
        }
    }

    pub fn set_body(&self, kind: FeedKind, xml: &str) {
        self.state(kind).lock().body = xml.to_string();
    }

    pub fn fail_next_requests(&self, kind: FeedKind, count: usize, mode: FailureMode) {
        let mut state = self.state(kind).lock();
        state.fail_next_requests = count;
        state.failure_mode = Some(mode);
    }

    pub fn set_delay(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub fn request_count(&self, kind: FeedKind) -> usize {
        self.state(kind).lock().request_count
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch(&self, kind: FeedKind) -> Result<String, FeedError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.state(kind).lock().respond(kind)
    }
}
