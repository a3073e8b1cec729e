use std::sync::Arc;

use sara_assist::cli::ChatRepl;
use sara_assist::config::{AssistantConfig, ProxyConfig};
use sara_assist::conversation::{Orchestrator, TokioDelay, TripScript};
use sara_assist::llm::create_gateway;
use sara_assist::proxy::{ProxyState, proxy_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stderr keeps stdout clean for the chat itself.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let proxy_config = ProxyConfig::from_env()?;
    let assistant_config = AssistantConfig::from_env()?;
    let port = proxy_config.port;

    eprintln!("✈️  Sara v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", proxy_config.model);
    eprintln!("   Proxy: http://127.0.0.1:{}/api/sara", port);
    if proxy_config.api_key.is_none() {
        eprintln!("   Warning: SARA_API_KEY not set — Sara will apologize instead of planning");
    }
    eprintln!("   Commands: /new, /save [path], /quit\n");

    // Spawn the trusted proxy; it is the only place the credential lives.
    let state = Arc::new(ProxyState::new(proxy_config));
    let app = proxy_router(state);
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "proxy server exited");
        }
    });

    let gateway = create_gateway(format!("http://127.0.0.1:{port}/api/sara"));
    let orchestrator = Arc::new(Orchestrator::new(
        assistant_config,
        TripScript::default(),
        gateway,
        Arc::new(TokioDelay),
    ));

    ChatRepl::new(orchestrator).run().await?;

    eprintln!("\nGoodbye! 👋");
    Ok(())
}
