//! Gateway service: dispatches parsed commands into the core pipelines.
//!
//! This is the boundary between the chat transport and the evaluation
//! core. Every user-addressable condition (unknown name, missing binding,
//! manual mode) is resolved here into a conversational notice; only
//! engine and store faults propagate to the caller.

use crate::commands::{parse_command, Command};
use runbot_core::config::RunbotConfig;
use runbot_core::errors::CoreError;
use runbot_core::pipeline::{run_build, run_snippet};
use runbot_core::sink::MessageSink;
use runbot_core::store::{BehaviorStore, EnvironmentRegistry};
use runbot_core::types::{Behavior, BuildRequest, ExecRequest, Snippet};
use runbot_core::ContainerEngine;
use std::sync::Arc;

/// The resolved identity behind an inbound message. Capability resolution
/// happens upstream; the gateway only consults the flag.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: String,
    pub privileged: bool,
}

impl Caller {
    pub fn new(id: impl Into<String>, privileged: bool) -> Self {
        Self {
            id: id.into(),
            privileged,
        }
    }
}

pub struct EvalGateway {
    engine: Arc<dyn ContainerEngine>,
    registry: EnvironmentRegistry,
    behaviors: BehaviorStore,
    config: RunbotConfig,
}

impl EvalGateway {
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        registry: EnvironmentRegistry,
        behaviors: BehaviorStore,
        config: RunbotConfig,
    ) -> Self {
        Self {
            engine,
            registry,
            behaviors,
            config,
        }
    }

    /// Handle one inbound message. Non-commands are ignored.
    pub async fn handle(
        &self,
        caller: &Caller,
        text: &str,
        sink: &dyn MessageSink,
    ) -> Result<(), CoreError> {
        let Some(command) = parse_command(text) else {
            return Ok(());
        };
        log::debug!("dispatching {:?} for {}", command, caller.id);

        match command {
            Command::Eval { snippet } => self.eval(caller, snippet, sink).await,
            Command::EnvInspect { name } => self.env_inspect(caller, &name, sink).await,
            Command::EnvList => self.env_list(caller, sink).await,
            Command::EnvMap => self.env_map(caller, sink).await,
            Command::EnvSet { language, name } => {
                self.env_set(caller, &language, &name, sink).await
            }
            Command::EnvBuild { name, snippet } => {
                self.env_build(caller, &name, None, snippet, sink).await
            }
            Command::EnvLibraryBuild {
                name,
                language,
                snippet,
            } => {
                self.env_build(caller, &name, Some(language), snippet, sink)
                    .await
            }
            Command::BehaviorShow => self.behavior_show(caller, sink).await,
            Command::BehaviorSet { value } => self.behavior_set(caller, &value, sink).await,
        }
    }

    async fn eval(
        &self,
        caller: &Caller,
        snippet: Snippet,
        sink: &dyn MessageSink,
    ) -> Result<(), CoreError> {
        let (behavior, first_contact) = self.behaviors.fetch_or_init(&caller.id).await?;

        if first_contact {
            sink.post(&format!(
                "Psst\nYou seem to have posted a `code snippet`\n\
                 I can evaluate it if you want\n\
                 Since your behavior was not defined, I set it to `{}`\n\
                 type `!eval behavior set auto` to evaluate snippets automatically",
                behavior
            ))
            .await?;
        }

        if behavior != Behavior::Auto {
            return Ok(());
        }

        let environment = self
            .registry
            .get_by_language(&caller.id, &snippet.language)
            .await?;

        let Some(environment) = environment else {
            let notice = sink
                .post(&format!(
                    "You have no environment associated with the language `{}`",
                    snippet.language
                ))
                .await?;
            sink.dispose_after(&notice, self.config.eval.notice_ttl())
                .await?;
            return Ok(());
        };

        let notice = sink
            .post(&format!(
                "Running your `{}` snippet in `{}`",
                snippet.language, environment.name
            ))
            .await?;
        sink.dispose_after(&notice, self.config.eval.notice_ttl())
            .await?;

        let request = ExecRequest {
            author_id: caller.id.clone(),
            snippet,
        };
        run_snippet(
            self.engine.as_ref(),
            sink,
            &request,
            &environment,
            &self.config.engine,
            &self.config.eval,
        )
        .await?;
        Ok(())
    }

    async fn env_inspect(
        &self,
        caller: &Caller,
        name: &str,
        sink: &dyn MessageSink,
    ) -> Result<(), CoreError> {
        match self.registry.find_by_name(&caller.id, name).await? {
            Some(environment) => {
                sink.post(&format!(
                    "`{}` environment was built from:\n{}",
                    name,
                    code_block(&environment.dockerfile, "dockerfile")
                ))
                .await?;
            }
            None => self.not_found_notice(name, sink).await?,
        }
        Ok(())
    }

    async fn env_list(&self, caller: &Caller, sink: &dyn MessageSink) -> Result<(), CoreError> {
        let names: Vec<String> = self
            .registry
            .list(&caller.id)
            .await?
            .into_iter()
            .filter(|e| !e.is_library())
            .map(|e| e.name)
            .collect();

        sink.post(&format!(
            "You have `{}` saved environments\n{}",
            names.len(),
            code_block(&names.join("\n"), "")
        ))
        .await?;
        Ok(())
    }

    async fn env_map(&self, caller: &Caller, sink: &dyn MessageSink) -> Result<(), CoreError> {
        let bound: Vec<(String, String)> = self
            .registry
            .list(&caller.id)
            .await?
            .into_iter()
            .filter_map(|e| {
                let language = e.bound_language()?.to_string();
                Some((language, e.name))
            })
            .collect();

        let padding = bound.iter().map(|(lang, _)| lang.len()).max().unwrap_or(0);
        let mapping: Vec<String> = bound
            .iter()
            .map(|(lang, name)| format!("{:<width$} ➡ {}", lang, name, width = padding))
            .collect();

        sink.post(&format!(
            "Here is your eval mapping\n{}",
            code_block(&mapping.join("\n"), "")
        ))
        .await?;
        Ok(())
    }

    async fn env_set(
        &self,
        caller: &Caller,
        language: &str,
        name: &str,
        sink: &dyn MessageSink,
    ) -> Result<(), CoreError> {
        // Only the requester's own environments are eligible targets.
        let target = self
            .registry
            .list(&caller.id)
            .await?
            .into_iter()
            .find(|e| e.name == name && !e.is_library());

        let Some(target) = target else {
            self.not_found_notice(name, sink).await?;
            return Ok(());
        };

        self.registry
            .rebind_language(&caller.id, language, target.id)
            .await?;

        sink.post(&format!(
            "Your `{}` snippets will now be evaluated with your `{}` environment",
            language, name
        ))
        .await?;
        Ok(())
    }

    async fn env_build(
        &self,
        caller: &Caller,
        name: &str,
        language: Option<String>,
        snippet: Snippet,
        sink: &dyn MessageSink,
    ) -> Result<(), CoreError> {
        if !caller.privileged {
            log::debug!("dropping privileged build command from {}", caller.id);
            return Ok(());
        }
        if snippet.language != "dockerfile" {
            log::debug!(
                "dropping build of '{}': spec language is `{}`, not `dockerfile`",
                name,
                snippet.language
            );
            return Ok(());
        }

        let library = language.is_some();
        let request = BuildRequest {
            author_id: if library { None } else { Some(caller.id.clone()) },
            env_name: name.to_string(),
            language,
            dockerfile: snippet.code,
        };
        run_build(
            self.engine.as_ref(),
            &self.registry,
            sink,
            &request,
            &self.config.eval,
        )
        .await?;
        Ok(())
    }

    async fn behavior_show(&self, caller: &Caller, sink: &dyn MessageSink) -> Result<(), CoreError> {
        let (behavior, _) = self.behaviors.fetch_or_init(&caller.id).await?;
        let notice = sink
            .post(&format!("your eval behavior is `{}`", behavior))
            .await?;
        sink.dispose_after(&notice, self.config.eval.notice_ttl())
            .await?;
        Ok(())
    }

    async fn behavior_set(
        &self,
        caller: &Caller,
        value: &str,
        sink: &dyn MessageSink,
    ) -> Result<(), CoreError> {
        match self.behaviors.set(&caller.id, value).await? {
            Some(behavior) => {
                let notice = sink
                    .post(&format!(
                        "your eval behavior has been set to `{}`",
                        behavior
                    ))
                    .await?;
                sink.dispose_after(&notice, self.config.eval.notice_ttl())
                    .await?;
            }
            None => {
                log::debug!("ignoring unknown behavior value `{}` from {}", value, caller.id);
            }
        }
        Ok(())
    }

    async fn not_found_notice(&self, name: &str, sink: &dyn MessageSink) -> Result<(), CoreError> {
        let notice = sink
            .post(&format!(
                "You don't have any environment saved under the name `{}`",
                name
            ))
            .await?;
        sink.dispose_after(&notice, self.config.eval.notice_ttl())
            .await?;
        Ok(())
    }
}

fn code_block(content: &str, language: &str) -> String {
    format!("```{}\n{}\n```", language, content)
}
