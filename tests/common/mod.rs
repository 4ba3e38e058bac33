#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use link_guard::{
    ai::{LinkAssessor, RemoteClassificationError},
    domain::{DomainList, DomainLists, Submission},
    infrastructure::notifier::{DeliveryError, DeliveryReceipt, SmsSender},
    store::SubmissionStore,
    tasks::{SubmissionProcessor, TriggerQueue},
};

/// Remote classifier double: a fixed answer, or a failure when `None`.
pub struct StubAssessor {
    answer: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubAssessor {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    /// Answers only after `delay`, like a slow remote model.
    pub fn answering_after(answer: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.to_string()),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkAssessor for StubAssessor {
    async fn assess(&self, _link: &str) -> Result<String, RemoteClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.answer
            .clone()
            .ok_or(RemoteClassificationError::MissingApiKey)
    }
}

/// SMS double that records every attempt.
pub struct RecordingSender {
    attempts: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingSender {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl SmsSender for RecordingSender {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError> {
        let mut attempts = self.attempts.lock();
        attempts.push((to.to_string(), body.to_string()));
        if self.fail {
            return Err(DeliveryError::MalformedResponse);
        }
        Ok(DeliveryReceipt {
            sid: format!("SM{}", attempts.len()),
        })
    }
}

pub struct Harness {
    _dir: TempDir,
    pub store: Arc<SubmissionStore>,
    pub queue: Arc<TriggerQueue>,
    pub assessor: Arc<StubAssessor>,
    pub sender: Arc<RecordingSender>,
    pub processor: Arc<SubmissionProcessor>,
}

impl Harness {
    pub async fn new(assessor: Arc<StubAssessor>, sender: Arc<RecordingSender>) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(SubmissionStore::new(dir.path().join("data.json")));
        store.ensure_initialized().await.expect("bootstrap store");

        let lists = Arc::new(DomainLists::new(
            DomainList::from_domains(["good.test", "both.test"]),
            DomainList::from_domains(["evil.test", "both.test"]),
        ));
        let queue = Arc::new(TriggerQueue::new());
        let processor = Arc::new(SubmissionProcessor::new(
            queue.clone(),
            store.clone(),
            lists,
            assessor.clone(),
            sender.clone(),
        ));

        Self {
            _dir: dir,
            store,
            queue,
            assessor,
            sender,
            processor,
        }
    }

    pub async fn submit(&self, link: &str, phone: &str) -> usize {
        self.store
            .append(Submission::new(link, phone))
            .await
            .expect("append submission")
    }

    pub async fn records(&self) -> Vec<Submission> {
        self.store.load_all().await.expect("load submissions")
    }
}
