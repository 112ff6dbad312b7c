use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use w3cli_relayer::client::{ClientError, RelayClient, RelayResponse};

#[derive(Parser)]
#[command(name = "relayer-cli")]
#[command(about = "Talk to a w3cli relayer over its Unix socket", long_about = None)]
struct Cli {
    /// Relay socket to connect to.
    #[arg(short, long, env = "RELAYER_SOCKET_PATH")]
    socket: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current w3 identity
    Whoami,
    /// Start an email login
    Login {
        #[arg(long)]
        email: String,
    },
    /// Create the configured space
    SpaceCreate,
    /// Upload a file from the relay's rewards directory
    Up {
        #[arg(long)]
        file: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = RelayClient::new(cli.socket);

    let result = match &cli.command {
        Commands::Whoami => client.whoami().await,
        Commands::Login { email } => client.login(email).await,
        Commands::SpaceCreate => client.space_create().await,
        Commands::Up { file } => client.upload(file).await,
    };

    print_response(result)
}

fn print_response(result: Result<RelayResponse, ClientError>) -> ExitCode {
    match result {
        Ok(res) if res.status.is_success() => {
            print!("{}", res.text());
            ExitCode::SUCCESS
        }
        Ok(res) => {
            eprintln!("Error: relay returned status {}", res.status);
            eprintln!("{}", res.text());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
