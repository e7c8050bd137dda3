//! Doorward - two-factor door access controller
//!
//! Subcommands:
//! - `run`   - run the controller on emulated peripherals driven from stdin
//! - `check` - validate configuration and enrollment data
//! - `send`  - send a remote lamp/fan command to a running controller

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use doorward_biometric::{FaceNormalizer, KnnClassifier, KnnFaceClassifier};
use doorward_cli::emulator::{self, FaceLibrary};
use doorward_controller::{ControllerConfig, DoorController, MockDevices, RemoteControl};
use doorward_core::{EnrollmentData, TokenVerifier};
use doorward_network::{RemoteClient, RemoteClientConfig, RemoteCommand};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Face-and-token door access controller
#[derive(Parser, Debug)]
#[command(name = "doorward", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the controller on emulated peripherals driven from stdin
    Run {
        /// Path to TOML configuration file
        #[arg(short, long, default_value = "config/doorward.toml")]
        config: PathBuf,
    },

    /// Load configuration and enrollment data and print a summary
    Check {
        /// Path to TOML configuration file
        #[arg(short, long, default_value = "config/doorward.toml")]
        config: PathBuf,
    },

    /// Send one remote command (led_on, led_off, fan_on, fan_off)
    Send {
        command: RemoteCommand,

        /// Controller remote-control address
        #[arg(short, long, default_value = "127.0.0.1:7300")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { config } => run(&config).await,
        Command::Check { config } => check(&config),
        Command::Send { command, addr } => send(command, addr).await,
    }
}

/// Configuration and enrollment data loaded at startup.
struct Startup {
    config: ControllerConfig,
    enrollment: Arc<EnrollmentData>,
    classifier: KnnFaceClassifier,
    verifier: TokenVerifier,
}

fn load(path: &Path) -> anyhow::Result<Startup> {
    let config = ControllerConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;

    let enrollment =
        EnrollmentData::load(&config.enrollment).context("Failed to load enrollment data")?;

    let model = KnnClassifier::from_enrollment(&enrollment, config.classifier.neighbors)
        .context("Failed to build face classifier")?;
    if model.len() < model.k() {
        warn!(
            enrolled = model.len(),
            neighbors = model.k(),
            "fewer enrolled faces than neighbours, no face will be recognised"
        );
    }
    let classifier =
        KnnFaceClassifier::new(FaceNormalizer::new(config.classifier.face_side), model);

    let registry = enrollment
        .registry()
        .context("Failed to build identity registry")?;
    let verifier = TokenVerifier::new(Arc::new(registry));

    Ok(Startup {
        config,
        enrollment: Arc::new(enrollment),
        classifier,
        verifier,
    })
}

async fn run(path: &Path) -> anyhow::Result<()> {
    let Startup {
        config,
        enrollment,
        classifier,
        verifier,
    } = load(path)?;

    info!(
        config = %path.display(),
        identities = verifier.registry().len(),
        neighbors = config.classifier.neighbors,
        token_timeout_ms = config.session.token_read_timeout_ms,
        remote_enabled = config.remote.enabled,
        "doorward starting"
    );

    let (parts, rig) = MockDevices::assemble(classifier, config.session.actuator_pulse());
    let mut controller = DoorController::new(parts, verifier, config.session);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let remote = if config.remote.enabled {
        let remote = RemoteControl::start(
            config.remote.server.clone(),
            controller.facade(),
            shutdown_rx.clone(),
        )
        .await
        .context("Failed to start remote control")?;
        info!(addr = %remote.local_addr(), "remote control ready");
        Some(remote)
    } else {
        None
    };

    // Handle shutdown on Ctrl+C
    let signal_tx = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = signal_tx.send(true);
        }
    });

    let faces = FaceLibrary::new(enrollment, config.classifier.face_side)?;
    tokio::spawn(emulator::drive(
        emulator::spawn_stdin_reader(),
        rig,
        faces,
        controller.facade(),
        Arc::clone(&shutdown_tx),
    ));

    let result = controller.run(shutdown_rx).await;

    let _ = shutdown_tx.send(true);
    if let Some(remote) = remote
        && let Err(e) = remote.join().await
    {
        error!(error = %e, "remote control stopped with error");
    }

    result.context("Door controller stopped")?;
    info!("doorward shutdown complete");
    Ok(())
}

fn check(path: &Path) -> anyhow::Result<()> {
    let Startup {
        config,
        enrollment,
        classifier,
        verifier,
    } = load(path)?;

    println!("configuration: {}", path.display());
    println!(
        "enrollment:    {} rows, {} values per face",
        enrollment.len(),
        enrollment.dimension()
    );

    let identities: Vec<&str> = verifier
        .registry()
        .identities()
        .into_iter()
        .map(|identity| identity.as_str())
        .collect();
    println!(
        "identities:    {} ({})",
        identities.len(),
        identities.join(", ")
    );
    println!(
        "classifier:    k={} over {} vectors, {}x{} samples",
        classifier.model().k(),
        classifier.model().len(),
        config.classifier.face_side,
        config.classifier.face_side
    );
    if config.remote.enabled {
        println!("remote:        {}", config.remote.server.bind_addr);
    } else {
        println!("remote:        disabled");
    }
    Ok(())
}

async fn send(command: RemoteCommand, addr: SocketAddr) -> anyhow::Result<()> {
    let mut client = RemoteClient::new(RemoteClientConfig {
        server_addr: addr,
        ..RemoteClientConfig::default()
    });
    client
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {addr}"))?;

    let reply = client.send(command).await.context("No reply from controller")?;
    println!("{reply}");
    client.close();
    Ok(())
}
