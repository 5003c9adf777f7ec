//! End-to-end generation: diff, instruction, backend, response.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{BackendError, GenerateError};
use crate::git::{DiffProvider, changed_paths};
use crate::llm::{Backend, ModelResponse, Platform, create_backend};
use crate::prompt::{PromptPair, TaskType, build_prompt};

/// Receives progress from a generation run.
///
/// All methods default to doing nothing.
pub trait Observer {
    fn on_diff(&self, _source: &str, _destination: &str, _diff: &str) {}

    fn on_prompt(&self, _task: TaskType, _prompt: &PromptPair) {}

    fn on_response(&self, _platform: Platform, _response: &ModelResponse) {}
}

/// Observer that ignores everything.
pub struct SilentObserver;

impl Observer for SilentObserver {}

/// Observer that reports through `tracing`: sizes at info, full prompts at debug.
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_diff(&self, source: &str, destination: &str, diff: &str) {
        let files = changed_paths(diff);
        info!(
            source,
            destination,
            files = files.len(),
            bytes = diff.len(),
            "collected diff"
        );
    }

    fn on_prompt(&self, task: TaskType, prompt: &PromptPair) {
        debug!(%task, "system prompt:\n{}", prompt.system);
        debug!(%task, "user prompt:\n{}", prompt.user);
    }

    fn on_response(&self, platform: Platform, response: &ModelResponse) {
        info!(
            %platform,
            model = response.model.as_deref().unwrap_or("unknown"),
            chars = response.content.len(),
            "model response received"
        );
    }
}

/// Run one generation with the diff strategy and platform named in `config`.
pub async fn generate(
    task: TaskType,
    config: &Config,
    observer: &dyn Observer,
) -> Result<String, GenerateError> {
    let provider = config.diff_strategy.provider(&config.workdir);
    generate_with(task, config, provider.as_ref(), create_backend, observer).await
}

/// Compute the diff and pair it with the task instruction.
///
/// Fails with [`GenerateError::NoChanges`] when the diff is blank.
pub fn prepare_prompt(
    task: TaskType,
    config: &Config,
    diff_provider: &dyn DiffProvider,
    observer: &dyn Observer,
) -> Result<PromptPair, GenerateError> {
    let destination = config.destination_or_head();
    let diff = diff_provider.diff(&config.source_ref, config.destination_ref.as_deref())?;
    observer.on_diff(&config.source_ref, destination, &diff);

    if diff.trim().is_empty() {
        return Err(GenerateError::NoChanges {
            source_ref: config.source_ref.clone(),
            destination_ref: destination.to_string(),
        });
    }

    let prompt = build_prompt(task, &diff);
    observer.on_prompt(task, &prompt);
    Ok(prompt)
}

/// Run one generation with an explicit diff provider and backend constructor.
///
/// Steps run in order and the first failure ends the run: diff, instruction,
/// backend construction, backend call (bounded by `config.timeout()`).
pub async fn generate_with<F>(
    task: TaskType,
    config: &Config,
    diff_provider: &dyn DiffProvider,
    backend_factory: F,
    observer: &dyn Observer,
) -> Result<String, GenerateError>
where
    F: FnOnce(&Config) -> Result<Box<dyn Backend>, BackendError>,
{
    let prompt = prepare_prompt(task, config, diff_provider, observer)?;
    let backend = backend_factory(config)?;

    let timeout = config.timeout();
    let response = tokio::time::timeout(timeout, backend.execute(&prompt.system, &prompt.user))
        .await
        .map_err(|_| BackendError::Timeout(timeout.as_secs()))??;

    observer.on_response(backend.platform(), &response);
    Ok(response.content)
}
