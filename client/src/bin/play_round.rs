use anyhow::Context;
use clap::{Parser, ValueEnum};
use commonware_codec::Encode;
use commonware_utils::hex;
use plinko_client::{Client, ClientConfig, GameSessionClient};
use plinko_types::plinko::{Outcome, DEFAULT_INITIAL_BALANCE};
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoundResult {
    Win,
    Lose,
}

impl From<RoundResult> for Outcome {
    fn from(result: RoundResult) -> Self {
        match result {
            RoundResult::Win => Outcome::Win,
            RoundResult::Lose => Outcome::Lose,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Play a single plinko round", long_about = None)]
struct Args {
    /// Path to the YAML client configuration
    #[arg(short, long)]
    config: String,

    #[arg(long, default_value_t = DEFAULT_INITIAL_BALANCE)]
    balance: u64,

    #[arg(long, default_value_t = 50)]
    bet: u64,

    #[arg(long, value_enum, default_value_t = RoundResult::Win)]
    result: RoundResult,
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

    // Initialize player
    let player = session
        .initialize_player(args.balance, &config.call_options())
        .await
        .context("failed to initialize player")?;
    info!(player = hex(&player.id.encode()), balance = player.balance, "initialized player");

    // Place bet
    let game = session
        .place_bet(&player.id, args.bet, &config.call_options())
        .await
        .context("failed to place bet")?;
    info!(game = hex(&game.id.encode()), bet = game.bet_amount, "placed bet");

    // Settle
    let outcome = Outcome::from(args.result);
    let player = session
        .determine_result(&game.id, &player.id, outcome, &config.call_options())
        .await
        .context("failed to determine result")?;
    info!(?outcome, balance = player.balance, "round complete");

    Ok(())
}
