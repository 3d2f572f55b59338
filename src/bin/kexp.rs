use std::net::SocketAddr;
use std::process;

use ::config::{Environment, File};
use kexp::certificate::AmazonCertificateVerifier;
use kexp::config::Config;
use kexp::skill::Skill;
use kexp::verification::RequestVerifier;
use kexp::version::VERSION;
use kexp::web::{AppState, router};
use tokio::net::TcpListener;
use tracing::metadata::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(err) = app().await {
        error!("Error: {err}");
        let mut cause = err.source();
        while let Some(c) = cause {
            error!("Cause: {c}");
            cause = c.source();
        }
        process::exit(1);
    }
}

async fn app() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(version = VERSION, "kexp");

    let config: Config = ::config::Config::builder()
        .add_source(
            File::with_name(&format!("{}.toml", std::env!("CARGO_PKG_NAME"))).required(false),
        )
        .add_source(
            Environment::default()
                .prefix(std::env!("CARGO_PKG_NAME"))
                .separator("__"),
        )
        .build()?
        .try_deserialize()?;

    let certificates = AmazonCertificateVerifier::new(config.verification.certificate_timeout())?;
    let verifier = RequestVerifier::new(config.verification.timestamp_tolerance(), certificates);
    let skill = Skill::new(config.stream);

    let app = router(AppState::new(verifier, skill));

    // Start the web server
    let addr: SocketAddr = config.fulfillment.into();
    info!("Server started on http://{addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
