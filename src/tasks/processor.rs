use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    ai::{classify_remote, LinkAssessor},
    classify::{classify, parse_link},
    domain::{DomainLists, Verdict},
    infrastructure::{notifier::SmsSender, shutdown::ShutdownListener},
    store::SubmissionStore,
    tasks::queue::{Trigger, TriggerQueue},
};

/// Result of one pipeline cycle over the newest submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The store holds no records.
    Empty,
    /// The newest record was handled by an earlier cycle.
    AlreadyProcessed { index: usize },
    Processed {
        index: usize,
        verdict: Verdict,
        notified: bool,
    },
    /// Loading or committing failed; nothing was marked processed.
    Aborted,
}

pub struct SubmissionProcessor {
    queue: Arc<TriggerQueue>,
    store: Arc<SubmissionStore>,
    lists: Arc<DomainLists>,
    assessor: Arc<dyn LinkAssessor>,
    notifier: Arc<dyn SmsSender>,
}

impl SubmissionProcessor {
    pub fn new(
        queue: Arc<TriggerQueue>,
        store: Arc<SubmissionStore>,
        lists: Arc<DomainLists>,
        assessor: Arc<dyn LinkAssessor>,
        notifier: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            queue,
            store,
            lists,
            assessor,
            notifier,
        }
    }

    pub fn spawn(self: Arc<Self>, mut shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_loop(&mut shutdown).await;
        })
    }

    /// Runs one cycle per drained trigger, strictly one at a time.
    async fn run_loop(&self, shutdown: &mut ShutdownListener) {
        loop {
            if shutdown.is_triggered() {
                break;
            }

            let batch = self.queue.drain_ordered();
            if batch.is_empty() {
                tokio::select! {
                    _ = self.queue.wait() => {}
                    _ = shutdown.notified() => break,
                }
                continue;
            }

            for trigger in batch {
                if shutdown.is_triggered() {
                    tracing::info!(
                        target: "processor",
                        "shutdown requested; leaving remaining triggers unhandled"
                    );
                    break;
                }
                self.handle_trigger(trigger).await;
            }
        }
        tracing::info!(target: "processor", "submission processor stopped");
    }

    async fn handle_trigger(&self, trigger: Trigger) {
        let outcome = self.process_latest().await;
        tracing::debug!(
            target: "processor",
            source = ?trigger.source,
            queued_at = %trigger.queued_at,
            outcome = ?outcome,
            "trigger handled"
        );
    }

    /// Drives the newest record through extract, policy, escalation,
    /// notification and commit.
    pub async fn process_latest(&self) -> CycleOutcome {
        let records = match self.store.load_all().await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(target: "processor", error = %err, "failed to load submissions");
                return CycleOutcome::Aborted;
            }
        };

        let Some(index) = records.len().checked_sub(1) else {
            return CycleOutcome::Empty;
        };
        let latest = &records[index];
        if latest.processed {
            return CycleOutcome::AlreadyProcessed { index };
        }

        let parsed = match parse_link(&latest.link) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(
                    target: "processor",
                    index,
                    link = %latest.link,
                    error = %err,
                    "invalid link; marking processed without notification"
                );
                return self.commit(index, Verdict::Invalid, false).await;
            }
        };

        let verdict = match classify(&parsed.host, &self.lists.blocklist, &self.lists.allowlist) {
            Some(verdict) => verdict,
            None => classify_remote(self.assessor.as_ref(), &parsed.link).await,
        };
        tracing::info!(
            target: "processor",
            index,
            host = %parsed.host,
            verdict = %verdict,
            "submission classified"
        );

        let notified = match render_message(&parsed.link, &verdict) {
            Some(message) => match self.notifier.send(&latest.phone, &message).await {
                Ok(receipt) => {
                    tracing::info!(target: "processor", index, sid = %receipt.sid, "verdict delivered");
                    true
                }
                Err(err) => {
                    tracing::error!(
                        target: "processor",
                        index,
                        phone = %latest.phone,
                        error = %err,
                        "failed to deliver verdict"
                    );
                    false
                }
            },
            None => false,
        };

        self.commit(index, verdict, notified).await
    }

    async fn commit(&self, index: usize, verdict: Verdict, notified: bool) -> CycleOutcome {
        match self.store.mark_processed(index, verdict.clone()).await {
            Ok(()) => CycleOutcome::Processed {
                index,
                verdict,
                notified,
            },
            Err(err) => {
                tracing::error!(
                    target: "processor",
                    index,
                    error = %err,
                    "failed to mark submission processed"
                );
                CycleOutcome::Aborted
            }
        }
    }
}

/// SMS body for a verdict. Invalid links are not notified.
pub fn render_message(link: &str, verdict: &Verdict) -> Option<String> {
    match verdict {
        Verdict::Blacklisted => Some(format!("The link {link} is BLACKLISTED")),
        Verdict::Whitelisted => Some(format!("The link {link} is safe")),
        Verdict::Model(text) => Some(format!("The link {link} was assessed: {text}")),
        Verdict::Unknown => Some(format!("The link {link} was assessed: unknown")),
        Verdict::Invalid => None,
    }
}
