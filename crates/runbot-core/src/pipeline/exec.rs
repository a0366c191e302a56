//! Snippet execution pipeline.
//!
//! Stages the fragment into a request-scoped scratch directory, runs it in
//! an ephemeral container from the resolved environment's image, and relays
//! decoded output incrementally. The whole consume-and-relay step runs
//! under the configured deadline; on expiry the container is killed and a
//! distinct timeout notice replaces the normal exit notice. Exactly one
//! terminal notice is produced per request.

use crate::config::{EngineConfig, EvalConfig};
use crate::engine::ContainerEngine;
use crate::errors::CoreError;
use crate::relay::relay;
use crate::sink::MessageSink;
use crate::types::{Environment, ExecRequest};
use tokio::time::timeout;

/// File name the staged fragment is written under; environment images pick
/// it up from their sandbox working directory.
pub const CODE_FILENAME: &str = "code.snippet";

const WAITING_STATUS: &str = "`Waiting for output`";
const EXITED_NOTICE: &str = "`Exited`";
const TIMED_OUT_NOTICE: &str = "`Evaluation timed out`";

/// Terminal status of one execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Exited,
    TimedOut,
}

/// Run one snippet inside `environment`. The caller has already resolved
/// the environment through the behavior and registry lookups.
pub async fn run_snippet(
    engine: &dyn ContainerEngine,
    sink: &dyn MessageSink,
    request: &ExecRequest,
    environment: &Environment,
    engine_config: &EngineConfig,
    eval_config: &EvalConfig,
) -> Result<ExecStatus, CoreError> {
    // Request-scoped staging; the directory is removed on every exit path
    // when the guard drops.
    let scratch = tempfile::Builder::new()
        .prefix("runbot-eval-")
        .tempdir()?;
    tokio::fs::write(scratch.path().join(CODE_FILENAME), &request.snippet.code).await?;

    log::info!(
        "running {} snippet for {} in '{}'",
        request.snippet.language,
        request.author_id,
        environment.name
    );

    let status = sink.post(WAITING_STATUS).await?;
    let mut running = engine.run(&environment.image, scratch.path()).await?;

    let relayed = timeout(
        engine_config.exec_timeout(),
        relay(sink, &status, &mut running.output, |chunk| {
            String::from_utf8_lossy(&chunk).into_owned()
        }),
    )
    .await;

    match relayed {
        Ok(result) => {
            result?;
            // The relayed output stays; only the exit notice is transient.
            let notice = sink.post(EXITED_NOTICE).await?;
            sink.dispose_after(&notice, eval_config.notice_ttl()).await?;
            Ok(ExecStatus::Exited)
        }
        Err(_elapsed) => {
            // The deadline only stops our reads; the container must be
            // terminated explicitly or it keeps running unobserved.
            if let Err(e) = engine.kill(&running.id).await {
                log::warn!(
                    "failed to kill container {} after timeout: {}",
                    running.id,
                    e
                );
            }
            sink.post(TIMED_OUT_NOTICE).await?;
            Ok(ExecStatus::TimedOut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockEngine, RecordingSink};
    use crate::types::Snippet;

    fn environment() -> Environment {
        Environment {
            id: 1,
            author_id: Some("42".to_string()),
            name: "sci".to_string(),
            image: "runbot_build_sci:42".to_string(),
            dockerfile: "FROM python:3.12".to_string(),
            language: Some("python".to_string()),
        }
    }

    fn request() -> ExecRequest {
        ExecRequest {
            author_id: "42".to_string(),
            snippet: Snippet::new("python", "print(6 * 7)"),
        }
    }

    fn fast_engine_config() -> EngineConfig {
        EngineConfig {
            exec_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn relays_output_and_reports_exit() {
        let engine = MockEngine::new().with_run_output(vec!["42\n", "done\n"]);
        let sink = RecordingSink::new();

        let status = run_snippet(
            &engine,
            &sink,
            &request(),
            &environment(),
            &fast_engine_config(),
            &EvalConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(status, ExecStatus::Exited);
        assert_eq!(sink.edits(), vec!["42\n".to_string(), "done\n".to_string()]);
        assert_eq!(sink.last_post(), Some(EXITED_NOTICE.to_string()));
        assert!(engine.killed().is_empty());
    }

    #[tokio::test]
    async fn stalled_output_times_out_and_kills_the_container() {
        let engine = MockEngine::new()
            .with_run_output(vec!["partial\n"])
            .hanging_run();
        let sink = RecordingSink::new();
        let engine_config = EngineConfig {
            exec_timeout_secs: 1,
        };

        let status = run_snippet(
            &engine,
            &sink,
            &request(),
            &environment(),
            &engine_config,
            &EvalConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(status, ExecStatus::TimedOut);
        // Output observed before the deadline stays relayed.
        assert_eq!(sink.edits(), vec!["partial\n".to_string()]);
        assert_eq!(sink.last_post(), Some(TIMED_OUT_NOTICE.to_string()));
        assert_eq!(engine.killed().len(), 1);
    }

    #[tokio::test]
    async fn exactly_one_terminal_notice() {
        let engine = MockEngine::new().with_run_output(vec!["ok\n"]);
        let sink = RecordingSink::new();

        run_snippet(
            &engine,
            &sink,
            &request(),
            &environment(),
            &fast_engine_config(),
            &EvalConfig::default(),
        )
        .await
        .unwrap();

        let terminal: Vec<_> = sink
            .posts()
            .into_iter()
            .filter(|p| p == EXITED_NOTICE || p == TIMED_OUT_NOTICE)
            .collect();
        assert_eq!(terminal.len(), 1);
    }

    #[tokio::test]
    async fn code_is_staged_for_the_engine() {
        let engine = MockEngine::new().with_run_output(vec![]);
        let sink = RecordingSink::new();

        run_snippet(
            &engine,
            &sink,
            &request(),
            &environment(),
            &fast_engine_config(),
            &EvalConfig::default(),
        )
        .await
        .unwrap();

        let staged = engine.staged_code();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0], "print(6 * 7)");
    }

    #[tokio::test]
    async fn scratch_paths_are_request_scoped() {
        let engine = MockEngine::new().with_run_output(vec![]);
        let sink = RecordingSink::new();

        for _ in 0..2 {
            run_snippet(
                &engine,
                &sink,
                &request(),
                &environment(),
                &fast_engine_config(),
                &EvalConfig::default(),
            )
            .await
            .unwrap();
        }

        let dirs = engine.run_dirs();
        assert_eq!(dirs.len(), 2);
        assert_ne!(dirs[0], dirs[1]);
        // Both are cleaned up once their requests finish.
        assert!(!dirs[0].exists());
        assert!(!dirs[1].exists());
    }
}
