//! Environment build pipeline.
//!
//! Drives a streamed image build, relays each engine event to a transient
//! status message, and commits the environment record once the stream has
//! been classified. Error classification is sticky: one error event fails
//! the build no matter what the engine emits afterwards. Losing the status
//! message mid-build does not lose the build: classification continues on
//! the raw stream and the commit still happens on success.

use crate::config::EvalConfig;
use crate::engine::ContainerEngine;
use crate::errors::CoreError;
use crate::relay::relay;
use crate::sink::MessageSink;
use crate::store::EnvironmentRegistry;
use crate::tag::image_tag;
use crate::types::BuildRequest;
use futures_util::StreamExt;

const BUILDING_STATUS: &str = "Building...";
const BUILD_ERRORED_NOTICE: &str = "Build errored";
const BUILD_SUCCEEDED_NOTICE: &str = "Build succeeded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOutcome {
    pub errored: bool,
}

/// Run one build request to completion. The caller has already validated
/// the build spec and the requester's capability.
pub async fn run_build(
    engine: &dyn ContainerEngine,
    registry: &EnvironmentRegistry,
    sink: &dyn MessageSink,
    request: &BuildRequest,
    config: &EvalConfig,
) -> Result<BuildOutcome, CoreError> {
    let tag = image_tag(&request.env_name, request.author_id.as_deref());
    log::info!(
        "building environment '{}' as {} for {}",
        request.env_name,
        tag,
        request.author_id.as_deref().unwrap_or("library")
    );

    let status = sink.post(BUILDING_STATUS).await?;
    let mut events = engine.build(&request.dockerfile, &tag).await?;

    let mut errored = false;
    let relayed = relay(sink, &status, &mut events, |event| {
        if event.is_error() {
            errored = true;
        }
        event.render()
    })
    .await;

    match relayed {
        Ok(()) => {}
        Err(CoreError::Sink(e)) => {
            // The status message is gone; the build itself is not. Keep
            // draining so the final classification stays trustworthy.
            log::warn!("build status relay lost its sink: {}", e);
            while let Some(event) = events.next().await {
                if event?.is_error() {
                    errored = true;
                }
            }
        }
        Err(other) => return Err(other),
    }

    if !errored {
        // Library records carry a namespaced name; the tag already encodes
        // the owner either way.
        let record_name = match request.author_id {
            Some(_) => request.env_name.clone(),
            None => format!("library/{}", request.env_name),
        };
        registry
            .commit(
                request.author_id.as_deref(),
                &record_name,
                &tag,
                &request.dockerfile,
                request.language.as_deref(),
            )
            .await?;
        log::info!("committed environment '{}' ({})", record_name, tag);
    } else {
        log::info!("build of '{}' reported errors; nothing committed", request.env_name);
    }

    let notice = if errored {
        BUILD_ERRORED_NOTICE
    } else {
        BUILD_SUCCEEDED_NOTICE
    };
    sink.post(notice).await?;
    sink.dispose_after(&status, config.status_ttl()).await?;

    Ok(BuildOutcome { errored })
}
