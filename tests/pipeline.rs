mod common;

use std::time::Duration;

use common::{Harness, RecordingSender, StubAssessor};
use link_guard::{
    domain::Verdict,
    infrastructure::shutdown::Shutdown,
    tasks::{CycleOutcome, Trigger, TriggerSource},
};

#[tokio::test]
async fn blocklisted_link_is_blacklisted_and_notified_once() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::ok()).await;
    h.submit("evil.test", "+10000000000").await;

    let outcome = h.processor.process_latest().await;

    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            index: 0,
            verdict: Verdict::Blacklisted,
            notified: true,
        }
    );
    let records = h.records().await;
    assert!(records[0].processed);
    assert_eq!(records[0].verdict, Some(Verdict::Blacklisted));

    let attempts = h.sender.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].0, "+10000000000");
    assert!(attempts[0].1.contains("BLACKLISTED"));
    assert_eq!(h.assessor.calls(), 0, "local verdicts never escalate");
}

#[tokio::test]
async fn link_in_both_lists_is_blacklisted() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::ok()).await;
    h.submit("https://BOTH.test/landing", "+1").await;

    let outcome = h.processor.process_latest().await;
    assert!(matches!(
        outcome,
        CycleOutcome::Processed { verdict: Verdict::Blacklisted, .. }
    ));
}

#[tokio::test]
async fn allowlisted_link_is_whitelisted() {
    let h = Harness::new(StubAssessor::answering("No"), RecordingSender::ok()).await;
    h.submit("good.test/path", "+1").await;

    h.processor.process_latest().await;

    assert_eq!(h.records().await[0].verdict, Some(Verdict::Whitelisted));
    assert_eq!(h.sender.attempts()[0].1, "The link https://good.test/path is safe");
    assert_eq!(h.assessor.calls(), 0);
}

#[tokio::test]
async fn unlisted_link_uses_the_model_answer_verbatim() {
    let h = Harness::new(StubAssessor::answering("Maybe"), RecordingSender::ok()).await;
    h.submit("new.test", "+1").await;

    h.processor.process_latest().await;

    assert_eq!(h.assessor.calls(), 1);
    assert_eq!(
        h.records().await[0].verdict,
        Some(Verdict::Model("Maybe".into()))
    );
    assert_eq!(
        h.sender.attempts()[0].1,
        "The link https://new.test was assessed: Maybe"
    );
}

#[tokio::test]
async fn failed_escalation_degrades_to_unknown() {
    let h = Harness::new(StubAssessor::failing(), RecordingSender::ok()).await;
    h.submit("nowhere.test", "+1").await;

    let outcome = h.processor.process_latest().await;

    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            index: 0,
            verdict: Verdict::Unknown,
            notified: true,
        }
    );
    let records = h.records().await;
    assert!(records[0].processed);
    assert_eq!(records[0].verdict, Some(Verdict::Unknown));
    assert_eq!(h.sender.attempts().len(), 1);
}

#[tokio::test]
async fn invalid_link_is_terminal_and_silent() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::ok()).await;
    h.submit("http://not a valid url", "+1").await;

    let outcome = h.processor.process_latest().await;

    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            index: 0,
            verdict: Verdict::Invalid,
            notified: false,
        }
    );
    assert_eq!(h.records().await[0].verdict, Some(Verdict::Invalid));
    assert!(h.sender.attempts().is_empty());
    assert_eq!(h.assessor.calls(), 0);

    assert_eq!(
        h.processor.process_latest().await,
        CycleOutcome::AlreadyProcessed { index: 0 }
    );
}

#[tokio::test]
async fn delivery_failure_still_marks_processed() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::failing()).await;
    h.submit("evil.test", "+1").await;

    let outcome = h.processor.process_latest().await;

    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            index: 0,
            verdict: Verdict::Blacklisted,
            notified: false,
        }
    );
    assert!(h.records().await[0].processed);
    assert_eq!(h.sender.attempts().len(), 1);
}

#[tokio::test]
async fn second_cycle_on_processed_record_is_a_no_op() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::ok()).await;
    h.submit("evil.test", "+10000000000").await;

    h.processor.process_latest().await;
    let after_first = h.records().await;

    let outcome = h.processor.process_latest().await;

    assert_eq!(outcome, CycleOutcome::AlreadyProcessed { index: 0 });
    assert_eq!(h.records().await, after_first);
    assert_eq!(h.sender.attempts().len(), 1);
}

#[tokio::test]
async fn empty_store_is_a_no_op() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::ok()).await;
    assert_eq!(h.processor.process_latest().await, CycleOutcome::Empty);
    assert!(h.sender.attempts().is_empty());
}

#[tokio::test]
async fn corrupt_store_aborts_without_touching_the_document() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::ok()).await;
    tokio::fs::write(h.store.path(), b"not json").await.unwrap();

    assert_eq!(h.processor.process_latest().await, CycleOutcome::Aborted);

    let raw = tokio::fs::read_to_string(h.store.path()).await.unwrap();
    assert_eq!(raw, "not json");
    assert!(h.sender.attempts().is_empty());
}

#[tokio::test]
async fn back_to_back_submissions_never_double_process() {
    let h = Harness::new(StubAssessor::answering("Yes"), RecordingSender::ok()).await;
    h.submit("evil.test", "+1").await;
    h.submit("good.test", "+2").await;

    // One cycle per append, both running after the second append landed.
    h.processor.process_latest().await;
    h.processor.process_latest().await;

    let records = h.records().await;
    assert!(
        !records[0].processed,
        "older record is stranded when a newer one arrives first"
    );
    assert!(records[1].processed);
    assert_eq!(records[1].verdict, Some(Verdict::Whitelisted));

    let attempts = h.sender.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].0, "+2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn append_during_escalation_is_preserved() {
    let h = Harness::new(
        StubAssessor::answering_after("No", Duration::from_millis(300)),
        RecordingSender::ok(),
    )
    .await;
    h.submit("a.test", "+1").await;

    let processor = h.processor.clone();
    let cycle = tokio::spawn(async move { processor.process_latest().await });

    // Land a second append while the cycle is waiting on the remote model.
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while h.assessor.calls() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "cycle should reach escalation");
    let second = h.submit("b.test", "+2").await;
    assert_eq!(second, 1);

    let outcome = tokio::time::timeout(Duration::from_secs(5), cycle)
        .await
        .expect("cycle finishes")
        .unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Processed {
            index: 0,
            verdict: Verdict::Model("No".into()),
            notified: true,
        }
    );

    let records = h.records().await;
    assert_eq!(records.len(), 2, "append during the cycle must survive commit");
    assert!(records[0].processed);
    assert_eq!(records[0].verdict, Some(Verdict::Model("No".into())));
    assert_eq!(records[1].link, "b.test");
    assert_eq!(records[1].phone, "+2");
    assert!(!records[1].processed);
    assert!(records[1].verdict.is_none());
}

#[tokio::test]
async fn spawned_processor_handles_queued_triggers() {
    let h = Harness::new(StubAssessor::answering("No"), RecordingSender::ok()).await;
    let (shutdown, _) = Shutdown::new();
    let handle = h.processor.clone().spawn(shutdown.subscribe());

    let index = h.submit("new.test", "+1").await;
    h.queue
        .push(Trigger::new(TriggerSource::Submission { index }));

    let processed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if h.records().await[index].processed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(processed.is_ok(), "processor should pick up the trigger");
    assert_eq!(h.sender.attempts().len(), 1);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("processor stops on shutdown")
        .unwrap();
}
