// src/engine/docker.rs
use bollard::container::LogOutput;
use bollard::models::ContainerCreateBody;
use bollard::query_parameters::{
    BuildImageOptionsBuilder, CreateContainerOptions as BollardCreateContainerOptionsQuery,
    KillContainerOptions as BollardKillContainerOptionsQuery,
    LogsOptions as BollardLogsOptionsQuery,
    StartContainerOptions as BollardStartContainerOptionsQuery,
};
use bollard::{body_full, Docker};
use bytes::Bytes;
use futures_util::stream::StreamExt;
use std::default::Default;
use std::path::Path;
use uuid::Uuid;

use super::{BuildEvent, BuildEventStream, ContainerEngine, RunningContainer};
use crate::errors::EngineError;
use async_trait::async_trait;

/// Mount point of the scratch directory inside a run container. Environment
/// images are expected to pick up the staged fragment from here.
const SANDBOX_DIR: &str = "/sandbox";

pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn new() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    /// Wraps an existing client, used by tests against a scripted daemon.
    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }
}

/// A build context is a tar archive; wrap the Dockerfile text in a
/// single-entry in-memory archive.
fn dockerfile_context(dockerfile: &str) -> Result<Bytes, EngineError> {
    let mut builder = tar::Builder::new(Vec::new());
    let contents = dockerfile.as_bytes();

    let mut header = tar::Header::new_gnu();
    header.set_path("Dockerfile")?;
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();

    builder.append(&header, contents)?;
    Ok(Bytes::from(builder.into_inner()?))
}

fn event_value(info: &bollard::models::BuildInfo) -> Result<serde_json::Value, EngineError> {
    let mut value =
        serde_json::to_value(info).map_err(|e| EngineError::MalformedEvent(e.to_string()))?;
    if let Some(map) = value.as_object_mut() {
        map.retain(|_, v| !v.is_null());
    }
    Ok(value)
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn build(&self, dockerfile: &str, tag: &str) -> Result<BuildEventStream, EngineError> {
        let context = dockerfile_context(dockerfile)?;

        let options = BuildImageOptionsBuilder::default()
            .dockerfile("Dockerfile")
            .t(tag)
            .rm(true)
            .build();

        let stream = self
            .docker
            .build_image(options, None, Some(body_full(context)))
            .map(|item| match item {
                Ok(info) => event_value(&info).map(BuildEvent),
                Err(e) => Err(EngineError::Bollard(e)),
            });

        Ok(Box::pin(stream))
    }

    async fn run(&self, image: &str, scratch_dir: &Path) -> Result<RunningContainer, EngineError> {
        let scratch = scratch_dir.to_str().ok_or_else(|| {
            EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "scratch path is not valid UTF-8",
            ))
        })?;

        let options = Some(BollardCreateContainerOptionsQuery {
            name: Some(format!("runbot-eval-{}", Uuid::new_v4())),
            ..Default::default()
        });

        let config = ContainerCreateBody {
            image: Some(image.to_string()),
            working_dir: Some(SANDBOX_DIR.to_string()),
            host_config: Some(bollard::models::HostConfig {
                binds: Some(vec![format!("{}:{}", scratch, SANDBOX_DIR)]),
                auto_remove: Some(true),
                ..Default::default()
            }),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let container = self.docker.create_container(options, config).await?;
        self.docker
            .start_container(&container.id, None::<BollardStartContainerOptionsQuery>)
            .await?;

        let output = self
            .docker
            .logs(
                &container.id,
                Some(BollardLogsOptionsQuery {
                    stdout: true,
                    stderr: true,
                    follow: true,
                    ..Default::default()
                }),
            )
            .filter_map(|item| async move {
                match item {
                    Ok(LogOutput::StdOut { message })
                    | Ok(LogOutput::StdErr { message })
                    | Ok(LogOutput::Console { message }) => Some(Ok(message)),
                    Ok(_) => None,
                    Err(e) => Some(Err(EngineError::Bollard(e))),
                }
            });

        Ok(RunningContainer {
            id: container.id,
            output: Box::pin(output),
        })
    }

    async fn kill(&self, container_id: &str) -> Result<(), EngineError> {
        self.docker
            .kill_container(container_id, None::<BollardKillContainerOptionsQuery>)
            .await?;
        Ok(())
    }
}
