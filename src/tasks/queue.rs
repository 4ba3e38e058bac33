use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Startup,
    /// A submission was appended at this store index.
    Submission { index: usize },
}

#[derive(Debug, Clone)]
pub struct Trigger {
    pub source: TriggerSource,
    pub queued_at: DateTime<Utc>,
}

impl Trigger {
    pub fn new(source: TriggerSource) -> Self {
        Self {
            source,
            queued_at: Utc::now(),
        }
    }
}

/// In-process event queue between the intake handler and the processor.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    pending: Mutex<VecDeque<Trigger>>,
    wake: Notify,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, trigger: Trigger) {
        self.pending.lock().push_back(trigger);
        self.wake.notify_one();
    }

    pub fn drain_ordered(&self) -> Vec<Trigger> {
        self.pending.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Resolves once something has been pushed since the last wake-up.
    pub async fn wait(&self) {
        self.wake.notified().await;
    }
}
