use std::error::Error;

use clap::{Parser, Subcommand};
use room_token::caller::{CallerContext, TokenRequest};
use room_token::config::{self, IssuerConfig};
use room_token::inspect::inspect_token;
use room_token::{build_issuer, serve};
use sentry_utils::init_sentry;

/// Room Token - LiveKit access token issuer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the callable token endpoint
    Serve {
        /// Address to listen on, overrides ROOM_TOKEN_BIND
        #[arg(short, long)]
        bind: Option<String>,

        /// Sentry DSN, overrides SENTRY_DSN
        #[arg(short, long)]
        sentry_dsn: Option<String>,
    },
    /// Issue a token with the configured keys and print it
    Mint {
        /// Room to grant
        #[arg(short, long)]
        room: Option<String>,

        /// Caller uid
        #[arg(short, long)]
        uid: Option<String>,

        /// Caller email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Verify a token with the configured keys and print its claims
    Inspect {
        /// The jwt to inspect
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = IssuerConfig::from_env()?;

    match args.command {
        Commands::Serve { bind, sentry_dsn } => {
            if let Some(bind) = bind {
                config.bind_addr = config::parse_bind_addr(&bind)?;
            }
            if sentry_dsn.is_some() {
                config.sentry_dsn = sentry_dsn;
            }

            let _guard = init_sentry(config.sentry_dsn.clone());
            serve(config, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("main: failed to listen for ctrl-c: {e}");
                }
            })
            .await?;
        }
        Commands::Mint { room, uid, email } => {
            let caller = CallerContext::from_parts(email, uid);
            let request = TokenRequest { room_name: room };

            let token = build_issuer(&config).issue(caller.as_ref(), &request)?;
            println!("{token}");
        }
        Commands::Inspect { token } => {
            let keys = config
                .signing_keys
                .ok_or("LIVEKIT_API_KEY and LIVEKIT_API_SECRET must be set to inspect tokens")?;

            let summary = inspect_token(&keys, &token)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
