//! Invest API check
//!
//! Resolves Invest API client settings from the environment and command line,
//! configures the client without touching the network and prints what every
//! call would be sent with.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use eyre::{Result, WrapErr};
use invest_api::{ClientRegistry, InvestApiClient, InvestApiSettings, RetryPolicy};
use tracing::info;

#[derive(Parser)]
#[command(name = "invest-check")]
#[command(about = "Inspect the Invest API client configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure a client from INVEST_* variables and show the result
    Show {
        /// Client name (empty for the default client)
        #[arg(short, long, default_value = "")]
        name: String,

        /// Use the sandbox host regardless of INVEST_SANDBOX
        #[arg(short, long)]
        sandbox: bool,

        /// Override INVEST_APP_NAME
        #[arg(short, long)]
        app_name: Option<String>,

        /// Use the grpc-web transport regardless of INVEST_WEB_CLIENT
        #[arg(short, long)]
        web: bool,
    },

    /// Print the retry schedule applied to every call
    Retry,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            name,
            sandbox,
            app_name,
            web,
        } => {
            let env_settings = InvestApiSettings::from_env()
                .wrap_err("Failed to load Invest API settings from the environment")?;

            let sandbox = env_settings.sandbox || sandbox;
            let web = env_settings.web_client || web;
            let app_name = app_name.or(env_settings.app_name);
            let access_token = env_settings.access_token;

            let mut registry = ClientRegistry::new();
            let client = registry
                .add_named_client(
                    &name,
                    |settings| {
                        settings.sandbox = sandbox;
                        settings.access_token = access_token;
                        settings.app_name = app_name;
                    },
                    web,
                )
                .wrap_err("Failed to configure Invest API client")?;

            info!(client = %client.name(), "Client configured, no connection made");
            print_client(client);
        }
        Commands::Retry => print_retry_policy(&RetryPolicy::DEFAULT),
    }

    Ok(())
}

fn print_client(client: &InvestApiClient) {
    let name = if client.name().is_empty() {
        "<default>"
    } else {
        client.name()
    };

    println!("client:     {}", name);
    println!("endpoint:   {}", client.endpoint());
    println!("transport:  {}", client.transport_kind());
    println!("headers:    authorization: Bearer <redacted>");
    println!("            x-app-name: {}", client.app_name());
    println!("max inbound message size: unbounded");
    print_retry_policy(client.retry_policy());
}

fn print_retry_policy(policy: &RetryPolicy) {
    println!(
        "retry:      {} attempts on {:?}, backoff {:?}..{:?} x{}",
        policy.max_attempts,
        policy.retryable_status_codes,
        policy.initial_backoff,
        policy.max_backoff,
        policy.backoff_multiplier
    );
    for retry in 1..policy.max_attempts {
        println!("  retry {}: up to {:?}", retry, policy.backoff(retry));
    }
}
