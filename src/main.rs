use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::Level;

use chatworld::client::AuthClient;
use chatworld::config::ClientConfig;
use chatworld::gate::AccessGate;
use chatworld::session::SessionController;
use chatworld::shell::{self, Command, ShellError, Status};
use chatworld::store::{CredentialStore, FileStore};

#[derive(Parser, Debug)]
#[command(name = "chatworld", about = "ChatWorld terminal client")]
struct Cli {
    /// API root, e.g. http://localhost:5001/api.
    #[arg(long, env = "CHATWORLD_API_URL")]
    api_url: Option<String>,

    /// File the fallback bearer token is persisted in.
    #[arg(long, env = "CHATWORLD_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Log request and session activity to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, ShellError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_base_url(url)?;
    }
    if let Some(path) = cli.token_file {
        config.token_path = path;
    }

    let store: Arc<dyn CredentialStore> = Arc::new(FileStore::new(config.token_path.clone()));
    let client = AuthClient::new(config, store)?;
    tracing::debug!(base_url = client.base_url(), "starting session");

    let session = SessionController::bootstrap(Arc::new(client)).await;
    let gate = AccessGate::default();

    let mut stdout = std::io::stdout().lock();
    let status = shell::run(cli.command.unwrap_or(Command::Home), &session, &gate, &mut stdout).await?;

    Ok(match status {
        Status::Success => ExitCode::SUCCESS,
        Status::Failure => ExitCode::FAILURE,
    })
}
