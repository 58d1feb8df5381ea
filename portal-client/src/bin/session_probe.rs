use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common_auth::{DecoderConfig, FileTokenStore, TokenDecoder};
use common_security::{navigation, Affordances};
use portal_client::{
    load_portal_config, ApiClient, PublicClient, RouteGuard, SessionContext, SessionMetrics,
};

#[derive(Parser, Debug)]
#[command(about = "Inspect or change the persisted intranet session", long_about = None)]
struct Options {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the restored session and what it may reach (default)
    Status {
        /// Path to run through the route guard
        #[arg(long, default_value = "/index/novedades")]
        path: String,
    },
    /// Sign in and persist the issued token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "PORTAL_PASSWORD")]
        password: String,
    },
    /// Ask the backend for a fresh token for the current session
    Refresh,
    /// Erase the persisted session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let opts = Options::parse();
    let config = load_portal_config()?;
    let metrics = SessionMetrics::new()?;

    let client = ApiClient::new(&config.api_url, config.request_timeout)
        .context("Failed to build authenticated client")?;
    let session = SessionContext::builder(client)
        .with_store(FileTokenStore::new(&config.token_dir))
        .with_decoder(TokenDecoder::new(
            DecoderConfig::new().with_leeway(config.token_leeway_seconds),
        ))
        .with_metrics(metrics.clone())
        .bootstrap();

    match opts.command.unwrap_or(Command::Status {
        path: "/index/novedades".to_string(),
    }) {
        Command::Status { path } => print_status(&session, &path),
        Command::Login { username, password } => {
            let public = PublicClient::new(&config.api_url, config.request_timeout)
                .context("Failed to build public client")?;
            let identity = session.sign_in(&public, &username, &password).await?;
            println!("signed in as user {} ({})", identity.id, identity.role);
            print_status(&session, RouteGuard::default().landing_path(Some(&identity)));
        }
        Command::Refresh => {
            let identity = session.refresh().await?;
            println!("token refreshed for user {}", identity.id);
        }
        Command::Logout => {
            session.logout();
            println!("session cleared");
        }
    }

    session.shutdown();
    print!("{}", metrics.render()?);
    Ok(())
}

fn print_status(session: &SessionContext, path: &str) {
    let identity = session.identity();
    match &identity {
        Some(identity) => println!(
            "authenticated: user {} role {} sector {} profile_incomplete {}",
            identity.id,
            identity.role,
            identity.sector.as_deref().unwrap_or("-"),
            identity.profile_incomplete
        ),
        None => println!("unauthenticated"),
    }

    let guard = RouteGuard::default();
    println!("{path}: {:?}", guard.navigate(identity.as_ref(), path));
    for entry in navigation(identity.as_ref()) {
        println!("  nav {} -> {}", entry.label, entry.path);
    }
    println!("  {:?}", Affordances::for_identity(identity.as_ref()));
}
