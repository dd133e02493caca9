use super::super::*;
use plinko_types::{
    execution::AccountId,
    plinko::{GameAccount, Outcome, PlayerAccount},
};
use tracing::debug;

impl<'a, S: State> Layer<'a, S> {
    fn load_player(&self, id: &AccountId) -> Result<PlayerAccount, ProgramError> {
        match self.get(&Key::Player(id.clone())) {
            Some(Value::Player(player)) => Ok(player),
            _ => Err(ProgramError::AccountNotFound),
        }
    }

    fn load_game(&self, id: &AccountId) -> Result<GameAccount, ProgramError> {
        match self.get(&Key::Game(id.clone())) {
            Some(Value::Game(game)) => Ok(game),
            _ => Err(ProgramError::AccountNotFound),
        }
    }

    /// An identifier names exactly one account, whatever its kind.
    fn ensure_unused(&self, id: &AccountId) -> Result<(), ProgramError> {
        if self.exists(&Key::Player(id.clone())) || self.exists(&Key::Game(id.clone())) {
            return Err(ProgramError::AccountExists);
        }
        Ok(())
    }

    pub(in crate::layer) fn handle_initialize_player(
        &mut self,
        public: &PublicKey,
        account: &AccountId,
        initial_balance: u64,
    ) -> Result<Vec<Event>, ProgramError> {
        if initial_balance == 0 {
            return Err(ProgramError::InvalidInitialBalance);
        }
        self.ensure_unused(account)?;

        let player = PlayerAccount::new(account.clone(), public.clone(), initial_balance);
        self.insert(Key::Player(account.clone()), Value::Player(player));
        debug!(balance = initial_balance, "initialized player account");

        Ok(vec![Event::PlayerInitialized {
            account: account.clone(),
            player: public.clone(),
            balance: initial_balance,
        }])
    }

    pub(in crate::layer) fn handle_place_bet(
        &mut self,
        public: &PublicKey,
        player_account: &AccountId,
        game_account: &AccountId,
        bet_amount: u64,
    ) -> Result<Vec<Event>, ProgramError> {
        let mut player = self.load_player(player_account)?;
        Self::owned_by(&player.player, public)?;
        if bet_amount == 0 {
            return Err(ProgramError::InvalidBet);
        }
        if player.balance < bet_amount {
            return Err(ProgramError::InsufficientBalance);
        }
        self.ensure_unused(game_account)?;

        // The stake leaves the balance now; settlement only ever credits
        player.balance -= bet_amount;
        let balance = player.balance;
        let game = GameAccount::new(
            game_account.clone(),
            public.clone(),
            player_account.clone(),
            bet_amount,
        );
        self.insert(Key::Player(player_account.clone()), Value::Player(player));
        self.insert(Key::Game(game_account.clone()), Value::Game(game));
        debug!(bet_amount, balance, "placed bet");

        Ok(vec![Event::BetPlaced {
            game: game_account.clone(),
            player: public.clone(),
            bet_amount,
            balance,
        }])
    }

    pub(in crate::layer) fn handle_determine_result(
        &mut self,
        public: &PublicKey,
        game_account: &AccountId,
        player_account: &AccountId,
        outcome: Outcome,
    ) -> Result<Vec<Event>, ProgramError> {
        let mut game = self.load_game(game_account)?;
        let mut player = self.load_player(player_account)?;
        Self::owned_by(&game.player, public)?;
        Self::owned_by(&player.player, public)?;
        if game.player_account != *player_account {
            return Err(ProgramError::Unauthorized);
        }
        if game.result.is_settled() {
            return Err(ProgramError::AlreadySettled);
        }

        let payout = outcome
            .payout(game.bet_amount)
            .ok_or(ProgramError::Overflow)?;
        player.balance = player
            .balance
            .checked_add(payout)
            .ok_or(ProgramError::Overflow)?;
        game.result = outcome.into();

        let balance = player.balance;
        self.insert(Key::Game(game_account.clone()), Value::Game(game));
        self.insert(Key::Player(player_account.clone()), Value::Player(player));
        debug!(?outcome, payout, balance, "determined result");

        Ok(vec![Event::ResultDetermined {
            game: game_account.clone(),
            player: public.clone(),
            outcome,
            payout,
            balance,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mocks::create_account_keypair, Memory};
    use commonware_cryptography::ed25519::PrivateKey;
    use plinko_types::plinko::GameResult;

    struct Fixture {
        state: Memory,
        signer: PrivateKey,
        nonce: u64,
    }

    impl Fixture {
        fn new() -> Self {
            let (signer, _) = create_account_keypair(1);
            Self {
                state: Memory::default(),
                signer,
                nonce: 0,
            }
        }

        fn run(&mut self, tx: Transaction) -> Result<Vec<Event>, ProgramError> {
            let mut layer = Layer::new(&self.state);
            let (nonce, events) = layer.execute(&tx)?;
            let changes = layer.commit();
            self.state.apply(changes);
            self.nonce = nonce;
            Ok(events)
        }

        fn initialize(&mut self, seed: u64, balance: u64) -> Result<AccountId, ProgramError> {
            let (account, id) = create_account_keypair(seed);
            let tx = Transaction::sign_with_cosigner(
                &self.signer,
                &account,
                self.nonce,
                Instruction::InitializePlayer {
                    account: id.clone(),
                    initial_balance: balance,
                },
            );
            self.run(tx).map(|_| id)
        }

        fn bet(
            &mut self,
            player: &AccountId,
            seed: u64,
            bet_amount: u64,
        ) -> Result<AccountId, ProgramError> {
            let (game, id) = create_account_keypair(seed);
            let tx = Transaction::sign_with_cosigner(
                &self.signer,
                &game,
                self.nonce,
                Instruction::PlaceBet {
                    player_account: player.clone(),
                    game_account: id.clone(),
                    bet_amount,
                },
            );
            self.run(tx).map(|_| id)
        }

        fn settle(
            &mut self,
            game: &AccountId,
            player: &AccountId,
            outcome: Outcome,
        ) -> Result<Vec<Event>, ProgramError> {
            let tx = Transaction::sign(
                &self.signer,
                self.nonce,
                Instruction::DetermineResult {
                    game_account: game.clone(),
                    player_account: player.clone(),
                    outcome,
                },
            );
            self.run(tx)
        }

        fn balance(&self, player: &AccountId) -> u64 {
            match self.state.get(&Key::Player(player.clone())) {
                Some(Value::Player(player)) => player.balance,
                _ => panic!("Expected player account"),
            }
        }

        fn result(&self, game: &AccountId) -> GameResult {
            match self.state.get(&Key::Game(game.clone())) {
                Some(Value::Game(game)) => game.result,
                _ => panic!("Expected game account"),
            }
        }
    }

    #[test]
    fn test_initialize_player() {
        let mut fixture = Fixture::new();
        let player = fixture.initialize(10, 100).unwrap();
        assert_eq!(fixture.balance(&player), 100);

        // Zero balance is refused
        assert_eq!(
            fixture.initialize(11, 0),
            Err(ProgramError::InvalidInitialBalance)
        );

        // Duplicate identifier is refused
        assert_eq!(fixture.initialize(10, 500), Err(ProgramError::AccountExists));
        assert_eq!(fixture.balance(&player), 100);
    }

    #[test]
    fn test_place_bet_deducts_stake() {
        let mut fixture = Fixture::new();
        let player = fixture.initialize(10, 100).unwrap();
        let game = fixture.bet(&player, 20, 50).unwrap();
        assert_eq!(fixture.balance(&player), 50);
        assert_eq!(fixture.result(&game), GameResult::Pending);
    }

    #[test]
    fn test_place_bet_rejections() {
        let mut fixture = Fixture::new();
        let player = fixture.initialize(10, 100).unwrap();

        assert_eq!(fixture.bet(&player, 20, 0), Err(ProgramError::InvalidBet));
        assert_eq!(
            fixture.bet(&player, 20, 101),
            Err(ProgramError::InsufficientBalance)
        );
        let (_, missing) = create_account_keypair(99);
        assert_eq!(
            fixture.bet(&missing, 20, 10),
            Err(ProgramError::AccountNotFound)
        );

        // A game cannot reuse the player's identifier
        assert_eq!(fixture.bet(&player, 10, 10), Err(ProgramError::AccountExists));

        // Nothing was debited by the rejected bets
        assert_eq!(fixture.balance(&player), 100);
    }

    #[test]
    fn test_place_bet_foreign_player() {
        let mut fixture = Fixture::new();
        let player = fixture.initialize(10, 100).unwrap();

        let mut other = Fixture::new();
        other.state = fixture.state;
        other.signer = create_account_keypair(2).0;
        assert_eq!(other.bet(&player, 20, 10), Err(ProgramError::Unauthorized));
    }

    #[test]
    fn test_settlement() {
        let mut fixture = Fixture::new();
        let player = fixture.initialize(10, 100).unwrap();

        // Win credits twice the stake
        let game = fixture.bet(&player, 20, 50).unwrap();
        let events = fixture.settle(&game, &player, Outcome::Win).unwrap();
        assert!(matches!(
            events.as_slice(),
            [Event::ResultDetermined {
                payout: 100,
                balance: 150,
                ..
            }]
        ));
        assert_eq!(fixture.result(&game), GameResult::Win);
        assert_eq!(fixture.balance(&player), 150);

        // Lose leaves the post-placement balance unchanged
        let game = fixture.bet(&player, 21, 30).unwrap();
        assert_eq!(fixture.balance(&player), 120);
        fixture.settle(&game, &player, Outcome::Lose).unwrap();
        assert_eq!(fixture.result(&game), GameResult::Lose);
        assert_eq!(fixture.balance(&player), 120);
    }

    #[test]
    fn test_settlement_credits_staking_player_only() {
        let mut fixture = Fixture::new();
        let staker = fixture.initialize(10, 100).unwrap();
        let other = fixture.initialize(11, 100).unwrap();
        let game = fixture.bet(&staker, 20, 50).unwrap();

        // Same signer, different player account
        assert_eq!(
            fixture.settle(&game, &other, Outcome::Win),
            Err(ProgramError::Unauthorized)
        );
        assert_eq!(fixture.result(&game), GameResult::Pending);
        assert_eq!(fixture.balance(&staker), 50);
        assert_eq!(fixture.balance(&other), 100);

        // The staking player can still settle
        fixture.settle(&game, &staker, Outcome::Win).unwrap();
        assert_eq!(fixture.balance(&staker), 150);
        assert_eq!(fixture.balance(&other), 100);
    }

    #[test]
    fn test_settlement_is_final() {
        let mut fixture = Fixture::new();
        let player = fixture.initialize(10, 100).unwrap();
        let game = fixture.bet(&player, 20, 50).unwrap();
        fixture.settle(&game, &player, Outcome::Win).unwrap();

        assert_eq!(
            fixture.settle(&game, &player, Outcome::Win),
            Err(ProgramError::AlreadySettled)
        );
        assert_eq!(
            fixture.settle(&game, &player, Outcome::Lose),
            Err(ProgramError::AlreadySettled)
        );
        assert_eq!(fixture.result(&game), GameResult::Win);
        assert_eq!(fixture.balance(&player), 150);
    }

    #[test]
    fn test_settlement_overflow() {
        let mut fixture = Fixture::new();
        let player = fixture.initialize(10, u64::MAX).unwrap();
        let game = fixture.bet(&player, 20, 1).unwrap();
        assert_eq!(
            fixture.settle(&game, &player, Outcome::Win),
            Err(ProgramError::Overflow)
        );
        assert_eq!(fixture.result(&game), GameResult::Pending);
    }
}
