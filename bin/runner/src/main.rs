use flux_agent::{FluxAgent, HostCapabilities, InvokeParams};
use flux_agent_core::MessageGuid;
use flux_agent_runner::{build_agent, config::RunnerConfig, console::ConsoleHost, console::parse_line};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ulid::Ulid;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match RunnerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(agent = %config.agent, "Loaded configuration");

    let agent = match build_agent(&config) {
        Ok(agent) => agent,
        Err(report) => {
            tracing::error!(error = %report, "failed to build agent");
            return ExitCode::FAILURE;
        }
    };

    let host = Arc::new(ConsoleHost);
    let capabilities = HostCapabilities::new()
        .with_message_sender(host.clone())
        .with_tapback_sender(host);
    if let Err(report) = agent.on_init(capabilities).await {
        tracing::error!(error = %report, "agent rejected host capabilities");
        return ExitCode::FAILURE;
    }

    tracing::info!(agent = agent.name(), "Reading messages from stdin");
    serve(agent.as_ref(), &config.default_user).await;

    agent.on_shutdown().await;
    ExitCode::SUCCESS
}

/// Feeds stdin lines to the agent until EOF or Ctrl-C.
async fn serve(agent: &dyn FluxAgent, default_user: &str) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                return;
            }
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                agent.on_error(&e).await;
                return;
            }
        };
        let Some((user, message)) = parse_line(&line, default_user) else {
            continue;
        };

        let params = InvokeParams::new(message, user).with_guid(MessageGuid::new(Ulid::new().to_string()));
        let reply = agent.invoke(params).await;
        for bubble in reply.lines() {
            println!("{bubble}");
        }
    }
}
