//! Log in, register, and manage linked accounts on a learning platform from
//! the command line.

/// Configuration and argument parsing
mod config;

/// Running commands against the server
mod effect;

use clap::Parser;
use effect::{EffectContext, Outcome};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let config::Config {
        server,
        csrf_token,
        platform_name,
        command,
    } = config::Config::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = match EffectContext::new(&server, csrf_token.as_deref()).await {
        Ok(ctx) => ctx,
        Err(problem) => {
            tracing::error!(?problem, "could not set up HTTP");
            eprintln!("{problem}");
            return ExitCode::FAILURE;
        }
    };

    match command.run(&ctx, &platform_name).await {
        Ok(Outcome::Navigate(url)) => {
            println!("{url}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Show(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(problem) => {
            tracing::error!(?problem, "problem running command");
            eprintln!("{problem}");
            ExitCode::FAILURE
        }
    }
}
