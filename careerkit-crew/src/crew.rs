//! Crew implementation - runs the three stages against the provider in order

use crate::config::CrewConfig;
use crate::parser::{parse_sections, stage_headings, Sections};
use crate::profile::Profile;
use crate::retry::RetryFailure;
use crate::template::{PromptTask, Stage};
use careerkit_error::{Error, ErrorKind, Result};
use careerkit_llm::{
    ApiKey, ChatMessage, CompletionRequest, FinishReason, LlmProvider, ProviderError, UsageTracker,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a run currently is. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    RunningStage(Stage),
    Parsing,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Validating => write!(f, "validating"),
            RunState::RunningStage(stage) => write!(f, "running stage {} ({})", stage.ordinal(), stage),
            RunState::Parsing => write!(f, "parsing"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Output of a single stage
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub stage: Stage,
    pub text: String,
    pub finish_reason: FinishReason,
    pub elapsed: Duration,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Stage outputs joined in pipeline order
    pub raw_text: String,
    pub sections: Sections,
    pub stages: Vec<StageOutput>,
    pub model: String,
    pub usage: UsageTracker,
}

type StateObserver = Arc<dyn Fn(RunState) + Send + Sync>;

/// The crew - three prompt stages executed strictly in sequence.
///
/// Holds only immutable configuration, so one crew can serve concurrent runs;
/// every run keeps its own state on the stack.
pub struct Crew<P> {
    provider: P,
    config: CrewConfig,
    credential: Option<ApiKey>,
    observer: Option<StateObserver>,
}

impl<P: LlmProvider> Crew<P> {
    /// Create a crew; the configuration is validated here, not at run time.
    pub fn new(config: CrewConfig, provider: P) -> Result<Self> {
        config.validate().map_err(|e| e.with_operation("crew::new"))?;
        Ok(Self {
            provider,
            config,
            credential: None,
            observer: None,
        })
    }

    /// Inject the API credential sent with every request
    pub fn with_credential(mut self, key: ApiKey) -> Self {
        self.credential = Some(key);
        self
    }

    /// Get notified on every state transition
    pub fn with_state_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(RunState) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn config(&self) -> &CrewConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run all three stages for `profile`.
    ///
    /// Fails with a configuration error when no credential is set and with a
    /// validation error on an incomplete profile, both before any remote call.
    /// A failing stage aborts the run and discards earlier stage outputs.
    pub async fn run(&self, profile: &Profile) -> Result<PipelineResult> {
        let started = Instant::now();
        self.transition(RunState::Validating);

        match self.execute(profile).await {
            Ok(result) => {
                self.transition(RunState::Done);
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    total_tokens = result.usage.total_tokens(),
                    degraded = result.sections.is_degraded(),
                    "crew run finished"
                );
                Ok(result)
            }
            Err(err) => {
                self.transition(RunState::Failed);
                tracing::error!(category = %err.category(), error = %err, "crew run failed");
                Err(err)
            }
        }
    }

    async fn execute(&self, profile: &Profile) -> Result<PipelineResult> {
        let api_key = self.require_credential()?;
        profile.validate().map_err(|e| e.with_operation("crew::run"))?;

        let tasks = self.config.stages.tasks_for(profile)?;
        let model = self.provider.default_model().to_string();
        let mut usage = UsageTracker::new();
        let mut outputs: Vec<StageOutput> = Vec::with_capacity(tasks.len());

        for task in &tasks {
            self.transition(RunState::RunningStage(task.stage));
            let output = self.run_stage(task, &outputs, api_key, &model, &mut usage).await?;
            outputs.push(output);
        }

        self.transition(RunState::Parsing);
        let raw_text = outputs
            .iter()
            .map(|o| o.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let sections = parse_sections(&raw_text);

        Ok(PipelineResult {
            raw_text,
            sections,
            stages: outputs,
            model,
            usage,
        })
    }

    fn require_credential(&self) -> Result<&ApiKey> {
        match &self.credential {
            Some(key) if !key.is_blank() => Ok(key),
            _ => Err(Error::config_invalid("no API credential configured")
                .with_operation("crew::run")
                .with_context("provider", self.provider.name())),
        }
    }

    async fn run_stage(
        &self,
        task: &PromptTask,
        previous: &[StageOutput],
        api_key: &ApiKey,
        model: &str,
        usage: &mut UsageTracker,
    ) -> Result<StageOutput> {
        let started = Instant::now();
        tracing::info!(stage = %task.stage, ordinal = task.ordinal, role = %task.role, "stage started");

        let mut request = CompletionRequest::new(vec![
            ChatMessage::system(&task.system_prompt),
            ChatMessage::user(self.user_prompt(task, previous)),
        ])
        .with_model(model)
        .with_temperature(self.config.temperature)
        .with_api_key(api_key.clone());
        if let Some(max) = self.config.token_cap() {
            request = request.with_max_tokens(max);
        }

        let provider = &self.provider;
        let response = self
            .config
            .retry
            .run(move |attempt| {
                let request = request.clone();
                async move {
                    tracing::debug!(attempt, "calling provider");
                    provider.complete(request).await
                }
            })
            .await
            .map_err(|failure| stage_error(task.stage, failure))?;

        usage.track(&response.model, &response.usage);

        let text = response.content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(Error::execution_failed(task.stage.key(), "model returned an empty response")
                .with_operation("crew::run_stage"));
        }
        if response.finish_reason == FinishReason::Length {
            tracing::warn!(stage = %task.stage, "output hit the token cap and may be truncated");
        }

        let elapsed = started.elapsed();
        tracing::info!(
            stage = %task.stage,
            chars = text.chars().count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "stage finished"
        );

        Ok(StageOutput {
            stage: task.stage,
            text: with_heading(task.stage, text.trim()),
            finish_reason: response.finish_reason,
            elapsed,
        })
    }

    fn user_prompt(&self, task: &PromptTask, previous: &[StageOutput]) -> String {
        let mut prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            task.description, task.expected_output
        );

        if self.config.share_context && !previous.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            for output in previous {
                prompt.push_str(&format!("\n{}\n", output.text));
            }
        }

        prompt
    }

    fn transition(&self, state: RunState) {
        tracing::debug!(state = %state, "crew state");
        if let Some(observer) = &self.observer {
            observer(state);
        }
    }
}

/// Make sure a stage's text starts under its own heading so the section
/// parser can find it in the aggregated output.
fn with_heading(stage: Stage, text: &str) -> String {
    if stage_headings(text).contains(&stage) {
        text.to_string()
    } else {
        format!("## {}\n\n{}", stage.title(), text)
    }
}

/// Kind for a provider failure. Transient failures get the retryable kinds,
/// so the error starts out temporary.
fn stage_error_kind(error: &ProviderError) -> ErrorKind {
    match error {
        // A rejected key is a credential problem, not a stage failure.
        ProviderError::AuthenticationFailed => ErrorKind::ConfigInvalid,
        ProviderError::Network(_) => ErrorKind::NetworkFailed,
        ProviderError::RateLimited { .. } => ErrorKind::RateLimited,
        ProviderError::Api { status, .. } if *status >= 500 => ErrorKind::ProviderUnavailable,
        _ => ErrorKind::ExecutionFailed,
    }
}

fn stage_error(stage: Stage, failure: RetryFailure) -> Error {
    let message = match &failure.error {
        ProviderError::AuthenticationFailed => "the provider rejected the API credential".to_string(),
        _ => format!("stage {} failed", stage.ordinal()),
    };
    let mut err = Error::new(stage_error_kind(&failure.error), message)
        .with_operation("crew::run_stage")
        .with_context("stage", stage.key())
        .with_context("attempts", failure.attempts.to_string());
    if failure.exhausted() {
        err = err.persist();
    }
    err.set_source(failure.error)
}
