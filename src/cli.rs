use crate::client::DeliveryClient;
use crate::host::InMemoryHost;
use crate::load_config::load_config;
use crate::project::project;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for kontent-source: project a CMS content model into graph nodes.
#[derive(Parser)]
#[clap(
    name = "kontent-source",
    version,
    about = "Project a Kontent project's content types and items into typed graph nodes"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full type + item projection using the given config file
    Project {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Project { config } => {
            let config = load_config(config)?;
            config.trace_loaded();
            let client = DeliveryClient::new(&config);
            let host = InMemoryHost::new("kontent-source");
            println!("Projection starting...");
            match project(&client, &host).await {
                Ok(report) => {
                    println!("Projection complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Projection failed: {}", e);
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
