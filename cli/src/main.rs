//! CLI entrypoint for AI Boardroom
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use boardroom_application::{
    CompletionGateway, DiscussionOrchestrator, DiscussionProgress, DiscussionStore, NoProgress,
    OrchestratorContext, RateLimiter,
};
use boardroom_domain::{Discussion, DiscussionId, PersonaId, PersonaRegistry};
use boardroom_infrastructure::{
    ConfigLoader, ConfigValidationError, FileLoggingConfig, JsonFileDiscussionStore,
    JsonlConversationLogger, OpenRouterGateway,
};
use boardroom_presentation::{
    Cli, ConsoleFormatter, ProgressReporter, SimpleProgress, formatter_for,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    config.ensure_valid()?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, &config.logging);
    info!("Starting AI Boardroom");

    let registry = Arc::new(config.persona_registry()?);
    let store = Arc::new(
        JsonFileDiscussionStore::open(config.storage.resolved_directory())
            .await
            .context("Failed to open discussion storage")?,
    );

    if cli.list {
        let summaries = store.list().await?;
        print!("{}", ConsoleFormatter::format_listing(&summaries));
        return Ok(());
    }

    // === Dependency Injection ===
    let api_key = config
        .api
        .api_key()
        .ok_or_else(|| ConfigValidationError::MissingApiKey(config.api.api_key_env.clone()))?;
    let gateway = Arc::new(OpenRouterGateway::new(&config.api, api_key)?);

    if cli.models {
        let models = gateway.available_models().await?;
        print!("{}", ConsoleFormatter::format_models(&models));
        return Ok(());
    }

    let mut settings = config.discussion_settings();
    if cli.unbounded {
        settings.unbounded = true;
    }
    if let Some(cap) = cli.max_turns {
        settings.max_turns = Some(cap);
    }
    if settings.unbounded && settings.max_turns.is_none() {
        warn!("Unbounded discussion without --max-turns; stop it with Ctrl+C");
    }

    let limiter = Arc::new(RateLimiter::new(config.rate_limit()));
    let context = OrchestratorContext::new(gateway, registry.clone(), limiter)
        .with_caller_settings(config.caller_settings())
        .with_discussion_settings(settings);

    let progress: Arc<dyn DiscussionProgress> = match (cli.quiet, cli.verbose) {
        (true, _) => Arc::new(NoProgress),
        (false, 0) => Arc::new(ProgressReporter::new()),
        (false, _) => Arc::new(SimpleProgress),
    };
    let mut orchestrator = DiscussionOrchestrator::new(context)
        .with_store(store)
        .with_progress(progress);
    if let Some(path) = &config.logging.conversation_log {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("Failed to open conversation log {}", path.display()))?;
        orchestrator = orchestrator.with_logger(Arc::new(logger));
    }

    let mut discussion = match &cli.resume {
        Some(id) => orchestrator.resume(&DiscussionId::new(id.as_str())).await?,
        None => {
            let Some(topic) = cli.topic.as_deref() else {
                bail!("A topic is required. Use --resume <ID> to continue a stored discussion.");
            };
            let personas = resolve_personas(&registry, &cli.persona)?;
            orchestrator.start(topic, personas).await?
        }
    };

    let outcome = drive(&orchestrator, &mut discussion).await;

    let formatter = formatter_for(cli.output);
    println!("{}", formatter.format(&discussion, &registry));

    if let Err(e) = outcome {
        eprintln!(
            "Discussion paused after {} turns. Resume with: ai-boardroom --resume {}",
            discussion.turns().len(),
            discussion.id()
        );
        return Err(e);
    }
    Ok(())
}

/// Step the discussion until it ends, the turn cap is hit, or the user
/// presses Ctrl+C.
///
/// A failed turn leaves the discussion active so it can be resumed.
async fn drive<G: CompletionGateway + 'static>(
    orchestrator: &DiscussionOrchestrator<G>,
    discussion: &mut Discussion,
) -> Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        // An interrupted turn is dropped before it is recorded
        let step = tokio::select! {
            _ = &mut ctrl_c => None,
            result = orchestrator.step(discussion) => Some(result),
        };
        match step {
            Some(result) => {
                if result?.is_none() {
                    break;
                }
            }
            None => {
                info!("Interrupted, stopping discussion");
                orchestrator.stop(discussion).await;
                break;
            }
        }
    }
    Ok(())
}

/// Map `-p` arguments (ids or roles) onto the registry; the whole board
/// when none are given
fn resolve_personas(registry: &PersonaRegistry, keys: &[String]) -> Result<Vec<PersonaId>> {
    if keys.is_empty() {
        return Ok(registry.ids());
    }
    keys.iter()
        .map(|key| match registry.resolve(key) {
            Some(persona) => Ok(persona.id.clone()),
            None => bail!(
                "Unknown persona '{}'. Available: {}",
                key,
                registry
                    .ids()
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
        .collect()
}

/// Console logging at a level set by `-v`, plus a daily log file when
/// enabled. `RUST_LOG` overrides the level.
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = if logging.file {
        let appender = tracing_appender::rolling::daily(&logging.directory, "ai_boardroom");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    guard
}
