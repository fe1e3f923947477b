//! p2p-file-share - Main entry point
//!
//! Runs either the orchestrator or an interactive client peer.

use anyhow::{Context, Result};
use p2p_file_share::cli::{ClientArgs, Command, OrchestratorArgs};
use p2p_file_share::{
    generate_peer_id, ClientConfig, CliArgs, Directory, Discovery, OrchestratorClient, OrchestratorConfig,
    PeerAgent, Registry, Shell,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Set up panic handler for unexpected errors
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::capture();

        match panic_info.location() {
            Some(location) => error!(
                "PANIC occurred at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ),
            None => error!("PANIC occurred at unknown location"),
        }
        let payload = panic_info.payload();
        if let Some(s) = payload.downcast_ref::<&str>() {
            error!("Panic message: {}", s);
        } else if let Some(s) = payload.downcast_ref::<String>() {
            error!("Panic message: {}", s);
        } else {
            error!("Panic message: unknown");
        }
        error!("Backtrace:\n{:?}", backtrace);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic handler
    setup_panic_handler();

    // Parse CLI arguments
    let args = CliArgs::parse_args();

    // Initialize logging
    init_logging(&args);
    info!("p2p-file-share starting");
    debug!("CLI arguments: {:?}", args);

    match &args.command {
        Command::Orchestrator(orch_args) => run_orchestrator(orch_args).await,
        Command::Client(client_args) => run_client(client_args, args.is_quiet()).await,
    }
}

/// Initialize logging based on verbosity settings
fn init_logging(args: &CliArgs) {
    let level = args.log_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if args.is_verbose() {
        subscriber.pretty().init();
        info!("Using pretty log format (verbose mode)");
    } else {
        subscriber.compact().init();
    }

    debug!("Logging initialized with level: {:?}", level);
}

/// Resolve on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the orchestrator until interrupted
async fn run_orchestrator(args: &OrchestratorArgs) -> Result<()> {
    let config = OrchestratorConfig::from_args(args);
    config.validate().context("Invalid configuration")?;

    let registry = Arc::new(match config.peer_ttl {
        Some(ttl) => Registry::with_peer_ttl(ttl),
        None => Registry::new(),
    });

    match registry.peer_ttl() {
        Some(ttl) => info!("Expiring peers silent for more than {:?}", ttl),
        None => debug!("Peer expiry disabled"),
    }
    let prune_task = tokio::spawn(registry.clone().run_prune_loop(config.prune_interval.as_secs()));

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to bind orchestrator to {}", config.listen_addr()))?;

    let result = p2p_file_share::server::serve(listener, registry, shutdown_signal()).await;
    prune_task.abort();

    result.context("Orchestrator failed")?;
    info!("p2p-file-share finished");
    Ok(())
}

/// Run a client peer: file server, announcement, interactive shell
async fn run_client(args: &ClientArgs, quiet: bool) -> Result<()> {
    let config = ClientConfig::from_args(args)?;
    config.validate().context("Invalid configuration")?;

    let (shared, downloads) = config.prepare_folders().await?;
    let peer_id = generate_peer_id();
    info!("Client peer id: {}", peer_id);

    let orchestrator = OrchestratorClient::new(config.orchestrator_url.clone(), config.timeout)
        .context("Failed to create orchestrator client")?;
    info!("Using orchestrator at {}", orchestrator.base_url());
    let directory: Arc<dyn Directory> = Arc::new(orchestrator);
    let agent = Arc::new(PeerAgent::new(
        peer_id,
        config.advertised_address(),
        shared,
        directory.clone(),
    ));

    // The file server must accept connections before the orchestrator hands out our address
    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to bind file server to {}", config.listen_addr()))?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(p2p_file_share::peer::server::serve(listener, agent.clone(), async move {
        let _ = stop_rx.await;
    }));

    match agent.announce().await {
        Ok(peer_count) if !quiet => println!("Connected to orchestrator ({} peers online)", peer_count),
        Ok(_) => {}
        Err(e) => {
            warn!("Initial announce failed: {}", e);
            println!("Warning: could not register with orchestrator: {}", e);
        }
    }

    let discovery = Discovery::new(
        directory.clone(),
        agent.clone(),
        downloads,
        config.timeout,
        config.selection,
    )
    .context("Failed to create discovery client")?;
    debug!("Peer selection policy: {}", discovery.policy());
    if !quiet {
        println!("Type 'help' for commands");
    }
    let shell = Shell::new(directory, agent.clone(), discovery);

    let interrupted = tokio::select! {
        result = shell.run(BufReader::new(tokio::io::stdin())) => {
            if let Err(e) = result {
                error!("Shell input failed: {}", e);
            }
            false
        }
        _ = shutdown_signal() => true,
    };

    agent.withdraw().await;
    let _ = stop_tx.send(());
    match server_task.await {
        Ok(Err(e)) => warn!("File server stopped with error: {}", e),
        Err(e) => warn!("File server task failed: {}", e),
        Ok(Ok(())) => {}
    }

    info!("p2p-file-share finished");
    if interrupted {
        // A blocked stdin read keeps the runtime alive on drop
        std::process::exit(0);
    }
    Ok(())
}
