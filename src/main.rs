use tracing::{error, info};

use gauntlet::config::{self, RunnerConfig};
use gauntlet::error::RunnerResult;
use gauntlet::service::{
    compose_dispatcher, compose_surface, ensure_support_compatibility, BuildOutcome, ProjectLoad,
    RunnerServer,
};

#[tokio::main]
async fn main() {
    // The orchestrator launches us with the activation flag; a bare
    // invocation is a human at a shell.
    if !std::env::args().skip(1).any(|arg| arg == "--start") {
        println!("Usage: gauntlet --start");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!(%err, "runner terminated");
        std::process::exit(1);
    }
}

async fn run() -> RunnerResult<()> {
    let config = RunnerConfig::from_env()?;
    ensure_support_compatibility(std::env::var("GAUNTLET_LIB_VERSION").ok().as_deref())?;
    info!(root = %config.project_root.display(), daemon = config.daemon, "starting runner");

    // Building and loading the user project belongs to the external
    // bootstrap; it reports the outcome and hands over populated
    // registries. Nothing is registered here.
    let outcome = if config::flag(std::env::var("GAUNTLET_BUILD_FAILED").ok().as_deref()) {
        BuildOutcome::Failed
    } else {
        BuildOutcome::Success
    };
    let project = ProjectLoad::empty(outcome);

    let surface = compose_surface(project, &config)?;
    let (dispatcher, ctx) = compose_dispatcher(surface)?;

    let server = RunnerServer::bind().await?;
    // Parsed by the orchestrator to connect; keep the exact shape.
    println!("Listening on port {}", server.port());

    server.serve(dispatcher, ctx, config.daemon).await
}
