use crate::{
    registry::{AccountRegistry, Snapshot},
    CallOptions, Client, Error, Result,
};
use commonware_codec::Encode;
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    PrivateKeyExt, Signer,
};
use commonware_utils::hex;
use plinko_types::{
    api::Receipt,
    execution::{AccountId, Event, Instruction, Key, Transaction, Value},
    plinko::{GameAccount, GameResult, Outcome, PlayerAccount, ProgramError},
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Client-side checks applied before a bet is submitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BetPolicy {
    /// Fetch the player first and refuse bets larger than its balance.
    #[default]
    RequireSufficientBalance,
    /// Leave every balance check to the program.
    Unchecked,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SessionConfig {
    pub bet_policy: BetPolicy,
}

/// Check that the receipt reports the change read back from the program.
fn confirmed_by(events: &[Event], expected: impl Fn(&Event) -> bool) -> Result<()> {
    if events.iter().any(expected) {
        Ok(())
    } else {
        Err(Error::UnexpectedResponse)
    }
}

/// Drives player and game accounts on behalf of a single signer.
///
/// Every confirmed record is cached in the [AccountRegistry]. The registry is
/// only written once all remote steps of an operation have succeeded, so a
/// failed, expired or cancelled call leaves it untouched.
pub struct GameSessionClient {
    client: Client,
    signer: PrivateKey,
    public: PublicKey,
    config: SessionConfig,
    registry: Arc<AccountRegistry>,

    /// Next nonce of the signer, if known. Holding the lock serializes submissions.
    nonce: Mutex<Option<u64>>,
}

impl GameSessionClient {
    pub fn new(
        client: Client,
        signer: PrivateKey,
        config: SessionConfig,
        registry: Option<Arc<AccountRegistry>>,
    ) -> Self {
        let public = signer.public_key();
        Self {
            client,
            signer,
            public,
            config,
            registry: registry.unwrap_or_default(),
            nonce: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<AccountRegistry> {
        &self.registry
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Create a player account under a freshly generated identifier.
    pub async fn initialize_player(
        &self,
        initial_balance: u64,
        call: &CallOptions,
    ) -> Result<PlayerAccount> {
        let account = PrivateKey::from_rng(&mut OsRng);
        self.initialize_player_with(&account, initial_balance, call)
            .await
    }

    /// Create a player account identified by `account`, which co-signs the creation.
    pub async fn initialize_player_with(
        &self,
        account: &PrivateKey,
        initial_balance: u64,
        call: &CallOptions,
    ) -> Result<PlayerAccount> {
        let id = account.public_key();
        let player = call
            .run(async {
                let instruction = Instruction::InitializePlayer {
                    account: id.clone(),
                    initial_balance,
                };
                let events = self.submit(instruction, Some(account)).await?;

                let player = self.query_player(&id).await?;
                if player.player != self.public || player.balance != initial_balance {
                    return Err(Error::UnexpectedResponse);
                }
                confirmed_by(&events, |event| {
                    matches!(
                        event,
                        Event::PlayerInitialized { account, player: owner, balance }
                            if *account == player.id
                                && *owner == player.player
                                && *balance == player.balance
                    )
                })?;
                Ok(player)
            })
            .await?;

        self.registry.put(player.clone());
        info!(balance = player.balance, "player initialized");
        Ok(player)
    }

    /// Stake `bet_amount` from `player_id` on a new game account.
    pub async fn place_bet(
        &self,
        player_id: &AccountId,
        bet_amount: u64,
        call: &CallOptions,
    ) -> Result<GameAccount> {
        if bet_amount == 0 {
            return Err(Error::InvalidArgument("bet amount must be positive"));
        }
        let game_key = PrivateKey::from_rng(&mut OsRng);
        let game_id = game_key.public_key();

        let (game, player) = call
            .run(async {
                if self.config.bet_policy == BetPolicy::RequireSufficientBalance {
                    // An unknown player is the program's verdict, whatever the policy
                    let player = match self.query_player(player_id).await {
                        Err(Error::NotFound(_)) => {
                            return Err(Error::RemoteRejected(ProgramError::AccountNotFound))
                        }
                        result => result?,
                    };
                    if bet_amount > player.balance {
                        return Err(Error::InvalidArgument("bet amount exceeds player balance"));
                    }
                }

                let instruction = Instruction::PlaceBet {
                    player_account: player_id.clone(),
                    game_account: game_id.clone(),
                    bet_amount,
                };
                let events = self.submit(instruction, Some(&game_key)).await?;

                let game = self.query_game(&game_id).await?;
                if game.bet_amount != bet_amount
                    || game.result != GameResult::Pending
                    || game.player != self.public
                    || game.player_account != *player_id
                {
                    return Err(Error::UnexpectedResponse);
                }
                let player = self.query_player(player_id).await?;
                confirmed_by(&events, |event| {
                    matches!(
                        event,
                        Event::BetPlaced { game: id, bet_amount: stake, balance, .. }
                            if *id == game.id
                                && *stake == game.bet_amount
                                && *balance == player.balance
                    )
                })?;
                Ok((game, player))
            })
            .await?;

        self.registry
            .put_all([Snapshot::Game(game.clone()), Snapshot::Player(player.clone())]);
        info!(bet_amount, balance = player.balance, "bet placed");
        Ok(game)
    }

    /// Settle `game_id` with `outcome`, crediting `player_id` on a win.
    pub async fn determine_result(
        &self,
        game_id: &AccountId,
        player_id: &AccountId,
        outcome: Outcome,
        call: &CallOptions,
    ) -> Result<PlayerAccount> {
        let (game, player) = call
            .run(async {
                let instruction = Instruction::DetermineResult {
                    game_account: game_id.clone(),
                    player_account: player_id.clone(),
                    outcome,
                };
                let events = self.submit(instruction, None).await?;

                let game = self.query_game(game_id).await?;
                if game.result != GameResult::from(outcome) || game.player_account != *player_id {
                    return Err(Error::UnexpectedResponse);
                }
                let player = self.query_player(player_id).await?;
                let payout = outcome.payout(game.bet_amount);
                confirmed_by(&events, |event| {
                    matches!(
                        event,
                        Event::ResultDetermined { game: id, outcome: settled, payout: credited, balance, .. }
                            if *id == game.id
                                && *settled == outcome
                                && Some(*credited) == payout
                                && *balance == player.balance
                    )
                })?;
                Ok((game, player))
            })
            .await?;

        self.registry
            .put_all([Snapshot::Game(game), Snapshot::Player(player.clone())]);
        info!(?outcome, balance = player.balance, "result determined");
        Ok(player)
    }

    /// Read the current player record from the program and cache it.
    pub async fn fetch_player(&self, id: &AccountId, call: &CallOptions) -> Result<PlayerAccount> {
        let player = call.run(self.query_player(id)).await?;
        self.registry.put(player.clone());
        Ok(player)
    }

    /// Read the current game record from the program and cache it.
    pub async fn fetch_game(&self, id: &AccountId, call: &CallOptions) -> Result<GameAccount> {
        let game = call.run(self.query_game(id)).await?;
        self.registry.put(game.clone());
        Ok(game)
    }

    async fn query_player(&self, id: &AccountId) -> Result<PlayerAccount> {
        match self.client.query_state(&Key::Player(id.clone())).await? {
            Some(Value::Player(player)) if player.id == *id => Ok(player),
            Some(_) => Err(Error::UnexpectedResponse),
            None => Err(Error::NotFound(format!("player {}", hex(&id.encode())))),
        }
    }

    async fn query_game(&self, id: &AccountId) -> Result<GameAccount> {
        match self.client.query_state(&Key::Game(id.clone())).await? {
            Some(Value::Game(game)) if game.id == *id => Ok(game),
            Some(_) => Err(Error::UnexpectedResponse),
            None => Err(Error::NotFound(format!("game {}", hex(&id.encode())))),
        }
    }

    /// Sign and submit `instruction` with the next nonce.
    ///
    /// The cached nonce is taken for the duration of the round trip. If the
    /// round trip is abandoned or fails in transit, the next submission reloads
    /// it from the program.
    async fn submit(
        &self,
        instruction: Instruction,
        cosigner: Option<&PrivateKey>,
    ) -> Result<Vec<Event>> {
        let mut cached = self.nonce.lock().await;
        let nonce = match cached.take() {
            Some(nonce) => nonce,
            None => self.client.query_nonce(&self.public).await?,
        };

        let transaction = match cosigner {
            Some(account) => {
                Transaction::sign_with_cosigner(&self.signer, account, nonce, instruction)
            }
            None => Transaction::sign(&self.signer, nonce, instruction),
        };
        debug!(nonce, "submitting transaction");

        match self.client.submit(&transaction).await? {
            Receipt::Accepted { nonce: next, events } => {
                *cached = Some(next);
                Ok(events)
            }
            Receipt::Rejected(error) => {
                // Another writer advanced the nonce; reload it next time
                if error != ProgramError::NonceMismatch {
                    *cached = Some(nonce);
                }
                warn!(%error, nonce, "transaction rejected");
                Err(Error::RemoteRejected(error))
            }
        }
    }
}
