mod test_utils;

use std::sync::Arc;
use tessera_core::PropertyMap;
use tessera_engine::{JobState, RenderOrchestrator};
use tessera_error::{RenderErrorKind, TesseraErrorKind};
use tessera_rate_limit::{BackoffPolicy, RenderSettings};
use test_utils::MockRenderBackend;

fn orchestrator(backend: &MockRenderBackend) -> RenderOrchestrator {
    RenderOrchestrator::new(Arc::new(backend.clone()))
        .with_settings(RenderSettings::new(0, 10, 5, 0))
        .with_backoff(BackoffPolicy::immediate(3))
}

fn jobs(n: usize) -> Vec<(String, PropertyMap)> {
    (0..n)
        .map(|i| {
            let mut properties = PropertyMap::default();
            properties.insert("header", "text", serde_json::json!(format!("creative {}", i)));
            (format!("tpl-{}", i % 2), properties)
        })
        .collect()
}

#[tokio::test]
async fn test_renders_every_job_in_order() {
    let backend = MockRenderBackend::new();
    let finished = orchestrator(&backend).render(jobs(3)).await.unwrap();

    assert_eq!(finished.len(), 3);
    for (i, job) in finished.iter().enumerate() {
        assert_eq!(job.creative_index(), i);
        assert_eq!(
            job.state(),
            &JobState::Finished {
                job_id: format!("job-{}", i),
                url: format!("https://render.test/job-{}.png", i),
            }
        );
    }
    assert_eq!(backend.submitted_templates(), vec!["tpl-0", "tpl-1", "tpl-0"]);
    // Pending once, then finished.
    assert_eq!(backend.poll_count("job-0"), 2);
}

#[tokio::test]
async fn test_submit_failure_does_not_block_later_submissions() {
    let backend = MockRenderBackend::new().failing_submit(1);
    let err = orchestrator(&backend).render(jobs(4)).await.unwrap_err();

    assert_eq!(backend.submit_count(), 4);
    assert_eq!(backend.total_polls(), 0);
    match err.kind() {
        TesseraErrorKind::Render(e) => assert!(matches!(
            e.kind,
            RenderErrorKind::SubmitFailed { creative_index: 1, .. }
        )),
        other => panic!("expected render error, got {}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_submissions_are_retried() {
    let backend = MockRenderBackend::new().rate_limited_submits(2);
    let finished = orchestrator(&backend).render(jobs(2)).await.unwrap();
    assert_eq!(finished.len(), 2);
    assert_eq!(backend.submit_count(), 2);
}

#[tokio::test]
async fn test_poll_error_aborts_the_batch() {
    let backend = MockRenderBackend::new().failing_job("job-1");
    let err = orchestrator(&backend).render(jobs(3)).await.unwrap_err();

    match err.kind() {
        TesseraErrorKind::Render(e) => match &e.kind {
            RenderErrorKind::JobFailed { job_id, reason } => {
                assert_eq!(job_id, "job-1");
                assert!(reason.contains("header"));
            }
            other => panic!("expected job failure, got {}", other),
        },
        other => panic!("expected render error, got {}", other),
    }
}

#[tokio::test]
async fn test_finished_without_url_keeps_polling() {
    let backend = MockRenderBackend::new().finished_without_url(2);
    let finished = orchestrator(&backend).render(jobs(1)).await.unwrap();
    assert!(matches!(finished[0].state(), JobState::Finished { .. }));
    // pending, finished without URL twice, then finished.
    assert_eq!(backend.poll_count("job-0"), 4);
}

#[tokio::test]
async fn test_batch_times_out_after_max_rounds() {
    let backend = MockRenderBackend::new().never_finishing();
    let err = orchestrator(&backend).render(jobs(2)).await.unwrap_err();

    assert!(matches!(err.kind(), TesseraErrorKind::Timeout(_)));
    assert_eq!(backend.poll_count("job-0"), 10);
    assert_eq!(backend.poll_count("job-1"), 10);
}

#[tokio::test]
async fn test_poll_until_done_returns_url() {
    let backend = MockRenderBackend::new();
    let url = orchestrator(&backend).poll_until_done("job-9").await.unwrap();
    assert_eq!(url, "https://render.test/job-9.png");
}

#[tokio::test]
async fn test_poll_until_done_times_out() {
    let backend = MockRenderBackend::new().never_finishing();
    let err = orchestrator(&backend)
        .poll_until_done("job-0")
        .await
        .unwrap_err();
    match err.kind() {
        TesseraErrorKind::Timeout(e) => assert_eq!(e.attempts, 5),
        other => panic!("expected timeout, got {}", other),
    }
    assert_eq!(backend.poll_count("job-0"), 5);
}

#[tokio::test]
async fn test_poll_until_done_reports_failure() {
    let backend = MockRenderBackend::new().failing_job("job-3");
    let err = orchestrator(&backend)
        .poll_until_done("job-3")
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Render(_)));
}
