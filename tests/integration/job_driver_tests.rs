/*!
 * Tests for multi-document jobs
 */

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use lingosub::document::FileMode;
use lingosub::errors::ProviderError;
use lingosub::providers::mock::{MockProvider, MockRequest, MockResponse};
use lingosub::providers::Provider;
use lingosub::translation::prompts::extract_payload;
use lingosub::translation::{EventSink, JobEvent};
use lingosub::{AppError, Controller, OutputPlacement};
use crate::common;

/// Provider that raises the stop flag while the first document is in flight
#[derive(Debug, Clone)]
struct CancellingProvider {
    cancel: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Provider for CancellingProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    fn build_request(&self, model: &str, prompt: &str) -> MockRequest {
        MockRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
        }
    }

    async fn complete(&self, request: MockRequest) -> Result<MockResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cancel.store(true, Ordering::SeqCst);
        Ok(MockResponse {
            text: extract_payload(&request.prompt).to_uppercase(),
        })
    }

    fn extract_text(response: &MockResponse) -> String {
        response.text.clone()
    }
}

/// Discovery skips marked files; outputs land next to their inputs
#[tokio::test]
async fn test_runJob_withDirectory_shouldTranslateUnmarkedFiles() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "a.srt", &common::sample_srt(2))?;
    common::create_test_file(root, "nested/b.srt", &common::sample_srt(3))?;
    common::create_test_file(root, "old_zh.srt", &common::sample_srt(1))?;
    common::create_test_file(root, "skip.txt", "not a subtitle")?;

    let controller = Controller::with_config(common::test_config(10, FileMode::Srt), MockProvider::working())?;
    let (sink, mut rx) = EventSink::channel();
    let cancel = AtomicBool::new(false);

    let summary = controller.run_job(root, &OutputPlacement::BesideInput, &sink, &cancel).await?;
    drop(sink);

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert!(summary.failed.is_empty());
    assert!(!summary.cancelled);
    assert!(root.join("a_zh.srt").exists());
    assert!(root.join("nested/b_zh.srt").exists());
    assert!(!root.join("old_zh_zh.srt").exists());
    assert_eq!(controller.engine().client().provider().request_count(), 2);

    let mut job_progress = Vec::new();
    let mut last = None;
    while let Some(event) = rx.recv().await {
        if let JobEvent::JobProgress { completed, total } = &event {
            job_progress.push((*completed, *total));
        }
        last = Some(event);
    }
    assert_eq!(job_progress, vec![(0, 2), (1, 2), (2, 2)]);
    assert!(matches!(last, Some(JobEvent::Finished(ref s)) if s.succeeded == 2));
    Ok(())
}

/// One broken document does not stop the others
#[tokio::test]
async fn test_runJob_withBrokenDocument_shouldContinue() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "a.srt", "garbage\n")?;
    common::create_test_file(root, "b.srt", &common::sample_srt(2))?;

    let controller = Controller::with_config(common::test_config(10, FileMode::Srt), MockProvider::working())?;
    let summary = controller
        .run_job(root, &OutputPlacement::BesideInput, &EventSink::detached(), &AtomicBool::new(false))
        .await?;

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, root.join("a.srt"));
    assert!(!root.join("a_zh.srt").exists());
    assert!(root.join("b_zh.srt").exists());
    Ok(())
}

/// With an output directory the tree under the input root is mirrored
#[tokio::test]
async fn test_runJob_withOutputDirectory_shouldMirrorTree() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("in");
    let out = temp_dir.path().join("out");
    common::create_test_file(&input, "ch1/part.txt", "Hello\n\nWorld\n")?;

    let controller = Controller::with_config(common::test_config(10, FileMode::PlainText), MockProvider::working())?;
    controller
        .run_job(
            &input,
            &OutputPlacement::Directory(out.clone()),
            &EventSink::detached(),
            &AtomicBool::new(false),
        )
        .await?;

    assert_eq!(
        common::read(&out.join("ch1/part.txt")),
        "[TRANSLATED] Hello\n\n[TRANSLATED] World\n"
    );
    Ok(())
}

/// A single input file may go to an explicit output file
#[tokio::test]
async fn test_runJob_withSingleFileAndOutputFile_shouldWriteThere() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output: PathBuf = temp_dir.path().join("custom/name.srt");

    let controller = Controller::with_config(common::test_config(2, FileMode::Srt), MockProvider::working())?;
    let summary = controller
        .run_job(
            &input,
            &OutputPlacement::File(output.clone()),
            &EventSink::detached(),
            &AtomicBool::new(false),
        )
        .await?;

    assert_eq!(summary.succeeded, 1);
    assert!(common::read(&output).contains("[TRANSLATED] For testing purposes."));
    Ok(())
}

#[tokio::test]
async fn test_runJob_withOutputFileForDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(2, FileMode::Srt), MockProvider::working())?;
    let result = controller
        .run_job(
            temp_dir.path(),
            &OutputPlacement::File(temp_dir.path().join("x.srt")),
            &EventSink::detached(),
            &AtomicBool::new(false),
        )
        .await;
    assert!(matches!(result, Err(AppError::Config(_))));
    Ok(())
}

/// A stop request lets the current document finish and starts no other
#[tokio::test]
async fn test_runJob_withCancelDuringFirstDocument_shouldStopAtBoundary() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    for name in ["a.srt", "b.srt", "c.srt"] {
        common::create_test_file(root, name, &common::sample_srt(4))?;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let provider = CancellingProvider {
        cancel: Arc::clone(&cancel),
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let calls = Arc::clone(&provider.calls);
    let controller = Controller::with_config(common::test_config(2, FileMode::Srt), provider)?;

    let summary = controller
        .run_job(root, &OutputPlacement::BesideInput, &EventSink::detached(), &cancel)
        .await?;

    assert!(summary.cancelled);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(common::read(&root.join("a_zh.srt")).contains("LINE 4"));
    assert!(!root.join("b_zh.srt").exists());
    Ok(())
}

/// A spawned job reports through its handle and ends with Finished
#[tokio::test]
async fn test_spawn_shouldStreamEventsAndJoin() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "notes.txt", "one\ntwo\n")?;

    let controller = Controller::with_config(common::test_config(1, FileMode::PlainText), MockProvider::working())?;
    let mut handle = controller.spawn(input, OutputPlacement::BesideInput);

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    let summary = handle.join().await?;

    assert_eq!(summary.succeeded, 1);
    assert!(matches!(events.last(), Some(JobEvent::Finished(_))));
    assert!(events.contains(&JobEvent::DocumentProgress { processed: 2, total: 2 }));
    assert_eq!(common::read(&temp_dir.path().join("notes_zh.txt")), "[TRANSLATED] one\n[TRANSLATED] two\n");
    Ok(())
}

/// A job cancelled before it starts translates nothing
#[tokio::test]
async fn test_spawn_withImmediateCancel_shouldTranslateNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "a.txt", "one\n")?;

    let controller = Controller::with_config(common::test_config(1, FileMode::PlainText), MockProvider::working())?;
    let handle = controller.spawn(temp_dir.path().to_path_buf(), OutputPlacement::BesideInput);
    handle.cancel();
    let summary = handle.join().await?;

    assert!(summary.cancelled);
    assert_eq!(summary.succeeded, 0);
    assert!(!temp_dir.path().join("a_zh.txt").exists());
    Ok(())
}
