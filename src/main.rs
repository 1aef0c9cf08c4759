use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};

mod config;
mod dcs_api;
mod discord;
mod models;
mod publisher;
mod reconciler;
mod render;
mod status_bot;
mod status_files;
#[cfg(test)]
mod testing;
mod traits;

use config::{Args, Mode};
use dcs_api::DcsApiClient;
use discord::DiscordClient;
use status_bot::{StatusBot, create_messages};
use status_files::LocalSource;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let file = config::load_file(&args.config)?;

    match config::resolve(args, file)? {
        Mode::CreateMessages(create) => {
            info!("Create bot messages");
            let discord = DiscordClient::new(create.token)?;
            let ids = create_messages(&discord, &create.channel, create.count).await?;

            println!("Message IDs created:");
            for id in ids {
                println!("{id}");
            }
        }
        Mode::Run(run) => {
            info!("Updating {} server status messages", run.servers.len());
            let source = LocalSource::new(DcsApiClient::new(run.username, run.password)?);
            let discord = DiscordClient::new(run.token)?;

            StatusBot::new(source, discord, run.servers, run.policy)
                .run()
                .await?;
        }
    }

    Ok(())
}
