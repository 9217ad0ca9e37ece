use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pipemenu::cli::{Args, Settings};
use pipemenu::config::Config;
use pipemenu::engine::Engine;
use pipemenu::filter::SubstringTokenizer;
use pipemenu::page::MarkupDefault;
use pipemenu::runtime::Runtime;
use pipemenu::source::{spawn_failure_line, Source};
use pipemenu::view::{MenuView, TraceView};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = Config::load().context("loading configuration")?;
    let settings = Settings::merge(args, &config);

    let markup_default = if settings.markup_rows {
        MarkupDefault::Enabled
    } else {
        MarkupDefault::Unspecified
    };
    let engine = Engine::new(
        markup_default,
        settings.event_format,
        Box::new(SubstringTokenizer),
    );
    let mut view = TraceView::default();
    if let Some(prompt) = &settings.prompt {
        view.set_prompt(prompt);
    }

    let mut runtime = Runtime::new(engine, view);
    let outcome = match settings.wrap.as_deref() {
        Some(command_line) => match Source::wrapped(command_line) {
            Ok(source) => runtime.run(source).await,
            Err(err) => {
                tracing::warn!(error = %err, "menu command failed to start");
                let failure = spawn_failure_line(command_line, &err);
                runtime.run_degraded(&failure).await
            }
        },
        None => runtime.run(Source::stdio()).await,
    };
    tracing::info!(?outcome, "menu engine finished");
    Ok(())
}

/// Log to stderr only; stdout may be carrying the event protocol.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}
