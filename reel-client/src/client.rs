//! Generic remote-task client
//!
//! Drives one [`TaskProtocol`] through submit → poll → fetch, bounded by a
//! fixed number of poll attempts, and resubmits once with a rewritten prompt
//! when the vendor rejects a task on content-policy grounds.

use reel_core::domain::generation::GenerationRequest;
use reel_core::domain::task::{RemoteTask, TaskStatus};
use reel_core::{LogSink, NullSink};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{GenerationError, Result};
use crate::protocol::{Submission, TaskProtocol};
use crate::rate_limit::RateLimiter;
use crate::remediation::PromptRemediator;
use crate::storage::ArtifactStore;

/// Task id recorded for artifacts the vendor returned without queueing
const DIRECT_TASK_ID: &str = "direct";

/// Characters of the prompt shown in log lines
const PROMPT_PREVIEW_CHARS: usize = 60;

/// Poll loop bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause before every attempt after the first
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound reported when attempts run out
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// A finished generation
#[derive(Debug)]
pub struct Generation<A> {
    pub artifact: A,
    /// Vendor task id, `None` when the artifact came back directly
    pub task_id: Option<String>,
    /// Remote locator of the result
    pub locator: Option<String>,
    /// Local copy, when the artifact could be written and a store is set
    pub saved_path: Option<PathBuf>,
    /// Prompt that produced the artifact
    pub prompt: String,
    /// True when the prompt had to be rewritten after a policy rejection
    pub remediated: bool,
}

/// Submit/poll/fetch client for one vendor protocol
pub struct RemoteTaskClient<P: TaskProtocol> {
    protocol: P,
    poll: PollSettings,
    limiter: Option<Arc<dyn RateLimiter>>,
    remediator: PromptRemediator,
    store: Option<ArtifactStore>,
    sink: Arc<dyn LogSink>,
}

impl<P: TaskProtocol> RemoteTaskClient<P> {
    pub fn new(protocol: P, poll: PollSettings) -> Self {
        Self {
            protocol,
            poll,
            limiter: None,
            remediator: PromptRemediator::new(),
            store: None,
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_store(mut self, store: ArtifactStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.poll
    }

    /// Generates one artifact
    ///
    /// A content-policy rejection of the original request is retried once
    /// with a rewritten prompt; every other failure is returned as is.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Generation<P::Artifact>> {
        let mut current = request.clone();
        let mut remediated = false;

        loop {
            match self.run_attempt(&current, remediated).await {
                Ok(generation) => return Ok(generation),
                Err(GenerationError::PolicyRejected {
                    task_id, reason, ..
                }) if !remediated => {
                    let rewrite = self.remediator.remediate(&current.prompt);
                    warn!(
                        "[{}] Task {} hit content policy ({}), resubmitting with rewritten prompt",
                        self.protocol.name(),
                        task_id,
                        reason
                    );
                    self.sink.warning(format!(
                        "Content policy triggered for task {}: {}",
                        task_id, reason
                    ));
                    self.sink.info(format!(
                        "Retrying with remediated prompt: {}",
                        rewrite.prompt
                    ));

                    current = current.with_prompt(rewrite.prompt);
                    remediated = true;
                }
                Err(e) => {
                    self.sink
                        .error(format!("{} generation failed: {}", self.protocol.name(), e));
                    return Err(e);
                }
            }
        }
    }

    /// One submission and everything that follows it
    async fn run_attempt(
        &self,
        request: &GenerationRequest,
        remediated: bool,
    ) -> Result<Generation<P::Artifact>> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        info!(
            "[{}] Submitting: {}",
            self.protocol.name(),
            request.prompt_preview(PROMPT_PREVIEW_CHARS)
        );

        match self.protocol.submit(request).await? {
            Submission::Direct(artifact) => {
                self.sink.info(format!(
                    "{} returned the result directly",
                    self.protocol.name()
                ));
                let saved_path = self.persist(&artifact, DIRECT_TASK_ID, &request.prompt).await;
                Ok(Generation {
                    artifact,
                    task_id: None,
                    locator: None,
                    saved_path,
                    prompt: request.prompt.clone(),
                    remediated,
                })
            }
            Submission::Queued(task) => {
                self.sink
                    .info(format!("Task submitted successfully, task ID: {}", task.id));

                let task = self.wait_for(task, remediated).await?;
                let locator = task.ready_locator().unwrap_or_default().to_string();

                let artifact = self.protocol.fetch(&locator).await?;
                let saved_path = self.persist(&artifact, &task.id, &request.prompt).await;

                self.sink
                    .info(format!("Generation succeeded for task {}", task.id));

                Ok(Generation {
                    artifact,
                    task_id: Some(task.id),
                    locator: Some(locator),
                    saved_path,
                    prompt: request.prompt.clone(),
                    remediated,
                })
            }
        }
    }

    /// Polls until the task succeeds with a locator, fails, or attempts run out
    async fn wait_for(&self, mut task: RemoteTask, remediated: bool) -> Result<RemoteTask> {
        let max = self.poll.max_attempts;

        for attempt in 1..=max {
            if attempt > 1 {
                tokio::time::sleep(self.poll.interval).await;
            }

            self.sink.info(format!(
                "Polling task {} (attempt {}/{})",
                task.id, attempt, max
            ));

            let snapshot = match self.protocol.poll(&task.id).await {
                Ok(snapshot) => snapshot,
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    warn!(
                        "[{}] Poll {}/{} for {} failed: {}",
                        self.protocol.name(),
                        attempt,
                        max,
                        task.id,
                        e
                    );
                    self.sink
                        .warning(format!("Status query failed, will retry: {}", e));
                    continue;
                }
            };

            task.apply(&snapshot);

            match snapshot.status {
                Some(TaskStatus::Succeeded) => {
                    if task.ready_locator().is_some() {
                        info!(
                            "[{}] Task {} succeeded after {} poll(s)",
                            self.protocol.name(),
                            task.id,
                            attempt
                        );
                        return Ok(task);
                    }
                    debug!("Task {} succeeded without a locator yet", task.id);
                }
                Some(TaskStatus::Queued) | Some(TaskStatus::Processing) => {
                    debug!("Task {} is {}", task.id, task.status);
                }
                Some(TaskStatus::Failed) => {
                    let reason = failure_reason(&task, snapshot.raw_status);
                    self.sink
                        .error(format!("Task {} failed: {}", task.id, reason));

                    if self.remediator.is_policy_violation(&reason) {
                        return Err(GenerationError::PolicyRejected {
                            task_id: task.id,
                            reason,
                            remediated,
                        });
                    }
                    return Err(GenerationError::TaskFailed {
                        task_id: task.id,
                        reason,
                    });
                }
                None => {
                    warn!(
                        "[{}] Task {} reported unknown status {:?}, waiting",
                        self.protocol.name(),
                        task.id,
                        snapshot.raw_status
                    );
                }
            }
        }

        Err(GenerationError::Timeout {
            task_id: task.id,
            attempts: max,
            elapsed: self.poll.budget(),
        })
    }

    /// Best-effort local copy
    async fn persist(&self, artifact: &P::Artifact, task_id: &str, prompt: &str) -> Option<PathBuf> {
        let store = self.store.as_ref()?;

        match store.save(artifact, task_id, prompt).await {
            Ok(Some(path)) => {
                self.sink
                    .info(format!("Saved local copy to {}", path.display()));
                Some(path)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to save artifact for task {}: {:#}", task_id, e);
                self.sink
                    .warning(format!("Could not save local copy: {:#}", e));
                None
            }
        }
    }
}

fn failure_reason(task: &RemoteTask, raw_status: Option<i64>) -> String {
    match task.failure_reason.as_deref().map(str::trim) {
        Some(reason) if !reason.is_empty() => reason.to_string(),
        _ => match raw_status {
            Some(code) => format!("task failed with status {}", code),
            None => "task failed without a reason".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Artifact;
    use async_trait::async_trait;
    use reel_core::domain::log::{LogEntry, LogLevel};
    use reel_core::domain::task::TaskSnapshot;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct FakeArtifact(String);

    impl Artifact for FakeArtifact {
        fn extension(&self) -> &'static str {
            "bin"
        }

        fn encode(&self) -> anyhow::Result<Option<Vec<u8>>> {
            Ok(Some(self.0.as_bytes().to_vec()))
        }
    }

    enum Step {
        Snapshot(TaskSnapshot),
        Error,
        Fatal,
    }

    /// Scripted protocol: each submission pops one poll script
    #[derive(Default)]
    struct FakeProtocol {
        scripts: Mutex<VecDeque<VecDeque<Step>>>,
        direct: bool,
        submitted: Mutex<Vec<String>>,
        polls: Mutex<u32>,
    }

    impl FakeProtocol {
        fn scripted(scripts: Vec<Vec<Step>>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into_iter().map(VecDeque::from).collect()),
                ..Default::default()
            }
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }

        fn submitted(&self) -> Vec<String> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskProtocol for FakeProtocol {
        type Artifact = FakeArtifact;

        fn name(&self) -> &'static str {
            "fake"
        }

        async fn submit(&self, request: &GenerationRequest) -> Result<Submission<FakeArtifact>> {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(request.prompt.clone());
            if self.direct {
                return Ok(Submission::Direct(FakeArtifact("inline".into())));
            }
            Ok(Submission::Queued(RemoteTask::queued(format!(
                "task-{}",
                submitted.len()
            ))))
        }

        async fn poll(&self, _task_id: &str) -> Result<TaskSnapshot> {
            *self.polls.lock().unwrap() += 1;
            let mut scripts = self.scripts.lock().unwrap();
            let step = scripts.front_mut().and_then(|script| script.pop_front());
            if scripts.front().is_some_and(|script| script.is_empty()) {
                scripts.pop_front();
            }
            match step {
                Some(Step::Snapshot(snapshot)) => Ok(snapshot),
                Some(Step::Error) => Err(GenerationError::Decode("garbled".into())),
                Some(Step::Fatal) => Err(GenerationError::Submission("task was revoked".into())),
                None => Ok(status(TaskStatus::Processing)),
            }
        }

        async fn fetch(&self, locator: &str) -> Result<FakeArtifact> {
            Ok(FakeArtifact(locator.to_string()))
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<LogEntry>>);

    impl LogSink for Recorder {
        fn publish(&self, entry: LogEntry) {
            self.0.lock().unwrap().push(entry);
        }
    }

    impl Recorder {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().iter().map(|e| e.message.clone()).collect()
        }
    }

    fn status(status: TaskStatus) -> TaskSnapshot {
        TaskSnapshot {
            status: Some(status),
            ..Default::default()
        }
    }

    fn succeeded(locator: &str) -> Step {
        Step::Snapshot(TaskSnapshot {
            status: Some(TaskStatus::Succeeded),
            locator: Some(locator.to_string()),
            ..Default::default()
        })
    }

    fn failed(reason: &str) -> Step {
        Step::Snapshot(TaskSnapshot {
            status: Some(TaskStatus::Failed),
            raw_status: Some(3),
            failure_reason: Some(reason.to_string()),
            ..Default::default()
        })
    }

    fn client(protocol: FakeProtocol, max_attempts: u32) -> RemoteTaskClient<FakeProtocol> {
        RemoteTaskClient::new(protocol, PollSettings::new(Duration::ZERO, max_attempts))
    }

    // =============================================================================
    // Poll loop
    // =============================================================================

    #[tokio::test]
    async fn test_success_on_attempt_k_polls_k_times() {
        let protocol = FakeProtocol::scripted(vec![vec![
            Step::Snapshot(status(TaskStatus::Queued)),
            Step::Snapshot(status(TaskStatus::Processing)),
            succeeded("https://cdn.example/out.png"),
        ]]);
        let client = client(protocol, 10);

        let generation = client
            .generate(&GenerationRequest::new("a lighthouse"))
            .await
            .unwrap();

        assert_eq!(client.protocol().polls(), 3);
        assert_eq!(generation.task_id.as_deref(), Some("task-1"));
        assert_eq!(
            generation.artifact,
            FakeArtifact("https://cdn.example/out.png".into())
        );
        assert!(!generation.remediated);
    }

    #[tokio::test]
    async fn test_timeout_after_exactly_max_attempts() {
        let protocol = FakeProtocol::scripted(vec![]);
        let client = RemoteTaskClient::new(
            protocol,
            PollSettings::new(Duration::from_millis(1), 4),
        );

        let err = client
            .generate(&GenerationRequest::new("never ends"))
            .await
            .unwrap_err();

        assert_eq!(client.protocol().polls(), 4);
        match err {
            GenerationError::Timeout {
                task_id,
                attempts,
                elapsed,
            } => {
                assert_eq!(task_id, "task-1");
                assert_eq!(attempts, 4);
                assert_eq!(elapsed, Duration::from_millis(4));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_waiting() {
        let protocol = FakeProtocol::scripted(vec![vec![
            Step::Snapshot(TaskSnapshot {
                status: None,
                raw_status: Some(7),
                ..Default::default()
            }),
            succeeded("https://cdn.example/a.mp4"),
        ]]);
        let client = client(protocol, 5);

        let generation = client
            .generate(&GenerationRequest::new("waves"))
            .await
            .unwrap();

        assert_eq!(client.protocol().polls(), 2);
        assert_eq!(generation.locator.as_deref(), Some("https://cdn.example/a.mp4"));
    }

    #[tokio::test]
    async fn test_succeeded_without_locator_keeps_waiting() {
        let protocol = FakeProtocol::scripted(vec![vec![
            succeeded(""),
            succeeded("https://cdn.example/b.png"),
        ]]);
        let client = client(protocol, 5);

        client
            .generate(&GenerationRequest::new("mountains"))
            .await
            .unwrap();

        assert_eq!(client.protocol().polls(), 2);
    }

    #[tokio::test]
    async fn test_transient_poll_errors_consume_attempts() {
        let protocol = FakeProtocol::scripted(vec![vec![
            Step::Error,
            Step::Error,
            succeeded("https://cdn.example/c.png"),
        ]]);
        let recorder = Arc::new(Recorder::default());
        let client = client(protocol, 3).with_sink(recorder.clone());

        client
            .generate(&GenerationRequest::new("river"))
            .await
            .unwrap();

        assert_eq!(client.protocol().polls(), 3);
        let retries = recorder
            .messages()
            .iter()
            .filter(|m| m.starts_with("Status query failed"))
            .count();
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_non_transient_poll_error_stops_polling() {
        let protocol = FakeProtocol::scripted(vec![vec![
            Step::Error,
            Step::Fatal,
            succeeded("https://cdn.example/late.png"),
        ]]);
        let recorder = Arc::new(Recorder::default());
        let client = client(protocol, 5).with_sink(recorder.clone());

        let err = client
            .generate(&GenerationRequest::new("harbor"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Submission(ref m) if m == "task was revoked"));
        assert_eq!(client.protocol().polls(), 2);
        let retries = recorder
            .messages()
            .iter()
            .filter(|m| m.starts_with("Status query failed"))
            .count();
        assert_eq!(retries, 1);
    }

    // =============================================================================
    // Failures and remediation
    // =============================================================================

    #[tokio::test]
    async fn test_non_policy_failure_is_fatal_without_remediation() {
        let protocol = FakeProtocol::scripted(vec![vec![failed("GPU out of memory")]]);
        let client = client(protocol, 5);

        let err = client
            .generate(&GenerationRequest::new("a naked tree in winter"))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::TaskFailed { ref reason, .. } if reason == "GPU out of memory"));
        assert_eq!(client.protocol().submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_policy_failure_remediates_once_and_succeeds() {
        let protocol = FakeProtocol::scripted(vec![
            vec![failed("This request may violate our guardrails")],
            vec![succeeded("https://cdn.example/safe.png")],
        ]);
        let recorder = Arc::new(Recorder::default());
        let client = client(protocol, 5).with_sink(recorder.clone());

        let generation = client
            .generate(&GenerationRequest::new("a nude statue in a garden"))
            .await
            .unwrap();

        let submitted = client.protocol().submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0], "a nude statue in a garden");
        assert!(submitted[1].starts_with("a clothed figure statue in a garden, "));
        assert!(generation.remediated);
        assert_eq!(generation.prompt, submitted[1]);
        assert_eq!(generation.task_id.as_deref(), Some("task-2"));
        assert!(
            recorder
                .messages()
                .iter()
                .any(|m| m.starts_with("Content policy triggered for task task-1"))
        );
    }

    #[tokio::test]
    async fn test_second_policy_failure_is_fatal() {
        let protocol = FakeProtocol::scripted(vec![
            vec![failed("nudity detected")],
            vec![failed("nudity detected")],
            vec![succeeded("https://cdn.example/unreachable.png")],
        ]);
        let client = client(protocol, 5);

        let err = client
            .generate(&GenerationRequest::new("naked"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::PolicyRejected {
                remediated: true,
                ..
            }
        ));
        assert_eq!(client.protocol().submitted().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_reason_uses_status_code() {
        let protocol = FakeProtocol::scripted(vec![vec![Step::Snapshot(TaskSnapshot {
            status: Some(TaskStatus::Failed),
            raw_status: Some(-1),
            failure_reason: Some("  ".into()),
            ..Default::default()
        })]]);
        let client = client(protocol, 5);

        let err = client
            .generate(&GenerationRequest::new("desert"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Generation task task-1 failed: task failed with status -1"
        );
    }

    // =============================================================================
    // Direct results and persistence
    // =============================================================================

    #[tokio::test]
    async fn test_direct_artifact_skips_polling() {
        let protocol = FakeProtocol {
            direct: true,
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let client = client(protocol, 5).with_store(ArtifactStore::new(dir.path()));

        let generation = client
            .generate(&GenerationRequest::new("inline result"))
            .await
            .unwrap();

        assert_eq!(client.protocol().polls(), 0);
        assert_eq!(generation.task_id, None);
        let saved = generation.saved_path.expect("local copy");
        assert!(
            saved
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("direct_")
        );
    }

    #[tokio::test]
    async fn test_progress_lines_reach_sink() {
        let protocol = FakeProtocol::scripted(vec![vec![
            Step::Snapshot(status(TaskStatus::Processing)),
            succeeded("https://cdn.example/d.png"),
        ]]);
        let recorder = Arc::new(Recorder::default());
        let client = client(protocol, 5).with_sink(recorder.clone());

        client
            .generate(&GenerationRequest::new("forest"))
            .await
            .unwrap();

        let messages = recorder.messages();
        assert_eq!(messages[0], "Task submitted successfully, task ID: task-1");
        assert_eq!(messages[1], "Polling task task-1 (attempt 1/5)");
        assert_eq!(messages[2], "Polling task task-1 (attempt 2/5)");
        assert_eq!(
            messages.last().map(String::as_str),
            Some("Generation succeeded for task task-1")
        );
        assert!(
            recorder
                .0
                .lock()
                .unwrap()
                .iter()
                .all(|e| e.level == LogLevel::Info)
        );
    }
}
