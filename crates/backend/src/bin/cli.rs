use anyhow::Context;
use clap::{Parser, Subcommand};

use session_backend::auth::{AuthRuntime, Identity, SignInOutcome};
use session_backend::config::AppConfig;

#[derive(Parser)]
#[command(name = "session-cli")]
#[command(about = "Operator tool for issuing and inspecting session tokens")]
#[command(
    long_about = "Runs the same sign-in and session logic as the server, against the \
    configured user directory.\n\n\
    Configuration is read from the environment (and a .env file): JWT_SECRET, \
    GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET, GRAFBASE_API_URL, GRAFBASE_API_KEY."
)]
struct Cli {
    /// Print results as pretty JSON instead of compact JSON.
    #[arg(long, env = "SESSION_CLI_PRETTY")]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign an identity in and print the issued token
    ///
    /// Registers the user in the directory if they are not there yet,
    /// exactly as a Google sign-in would.
    SignIn {
        /// Email address of the identity.
        #[arg(short, long, value_name = "EMAIL")]
        email: String,

        /// Display name to register a new user with.
        #[arg(short, long, value_name = "TEXT")]
        name: Option<String>,

        /// Avatar URL to register a new user with.
        #[arg(short, long, value_name = "URL")]
        image: Option<String>,
    },

    /// Decode a token and print the session it resolves to
    Inspect {
        /// The token to inspect.
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_backend=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let runtime = AuthRuntime::new(config.auth, config.directory.connect());

    match cli.command {
        Commands::SignIn { email, name, image } => {
            let identity = Identity {
                name,
                email: Some(email),
                image,
            };
            match runtime.sign_in(&identity).await? {
                SignInOutcome::Admitted { token } => println!("{}", token),
                SignInOutcome::Denied => anyhow::bail!("Sign-in denied"),
            }
        }
        Commands::Inspect { token } => {
            let session = runtime
                .session(&token)
                .await
                .context("Failed to resolve session")?;
            let output = if cli.pretty {
                serde_json::to_string_pretty(&session)?
            } else {
                serde_json::to_string(&session)?
            };
            println!("{}", output);
        }
    }

    Ok(())
}
