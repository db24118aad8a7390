use std::process::ExitCode;

use big_diff_energy_bot::{
    api::GithubClient,
    config::{Inputs, RunnerEnv},
    event::Trigger,
    logging,
    runner::{self, Context, Outcome},
};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(outcome) => {
            debug!("Finished with {outcome:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Action failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<Outcome> {
    let env = RunnerEnv::from_env()?;
    let trigger = Trigger::load(&env)?;

    let inputs = Inputs::from_env()?;
    let threshold = inputs.threshold();
    let messages = inputs.messages()?;
    let github = GithubClient::new(inputs.github_token, env.github_api_url.as_deref())?;

    let context = Context {
        host: &github,
        messages: &messages,
        threshold,
    };
    runner::run(&context, &trigger).await
}
