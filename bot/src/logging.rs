use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Re-emits warnings and errors as workflow commands, so they show up as
/// annotations on the run summary.
#[derive(Clone, Default)]
pub struct WorkflowCommandLayer;

impl<S: Subscriber> tracing_subscriber::Layer<S> for WorkflowCommandLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Some(command) = workflow_command(event.metadata().level(), &visitor.to_string()) {
            println!("{command}");
        }
    }
}

pub fn workflow_command(level: &Level, message: &str) -> Option<String> {
    let command = match *level {
        Level::ERROR => "error",
        Level::WARN => "warning",
        _ => return None,
    };
    Some(format!("::{command}::{}", escape_data(message)))
}

// https://github.com/actions/toolkit/blob/main/packages/core/src/command.ts
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl fmt::Display for MessageVisitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

/// `RUST_LOG` wins. Otherwise debug logging follows the runner's debug mode.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let runner_debug = std::env::var("RUNNER_DEBUG").is_ok_and(|value| value == "1");
        EnvFilter::new(if runner_debug { "debug" } else { "info" })
    })
}

pub fn init() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(WorkflowCommandLayer)
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
