use anyhow::Context;
use clap::Parser;
use commonware_codec::Encode;
use commonware_utils::hex;
use plinko_client::{Client, ClientConfig, GameSessionClient};
use plinko_types::plinko::DEFAULT_INITIAL_BALANCE;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Create a plinko player account", long_about = None)]
struct Args {
    /// Path to the YAML client configuration
    #[arg(short, long)]
    config: String,

    #[arg(short, long, default_value_t = DEFAULT_INITIAL_BALANCE)]
    balance: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();
    let config = ClientConfig::load(&args.config)
        .context("failed to load config")?
        .validate()
        .context("invalid config")?;

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let client = Client::new(&config.url).context("failed to create client")?;
    let session = GameSessionClient::new(client, config.signer.clone(), config.session, None);

    let player = session
        .initialize_player(args.balance, &config.call_options())
        .await
        .context("failed to initialize player")?;
    info!(balance = player.balance, "player account ready");
    println!("{}", hex(&player.id.encode()));

    Ok(())
}
