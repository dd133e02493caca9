use commonware_cryptography::ed25519::PublicKey;
use plinko_types::{
    execution::{Event, Instruction, Key, Transaction, Value},
    plinko::ProgramError,
};
use std::collections::BTreeMap;

use crate::state::{load_account, validate_and_increment_nonce, State};

mod handlers;

/// Stages the changes of a single transaction on top of a [State].
///
/// Nothing reaches the underlying state until [Layer::commit] is called, so a
/// rejected transaction is discarded by dropping the layer.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Value>,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
        }
    }

    /// Check signatures and the signer's nonce, staging the incremented nonce.
    pub fn prepare(&mut self, transaction: &Transaction) -> Result<u64, ProgramError> {
        if !transaction.verify() {
            return Err(ProgramError::InvalidSignature);
        }
        let mut account = load_account(&*self, &transaction.public);
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        let next = account.nonce;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        );

        Ok(next)
    }

    pub fn apply(&mut self, transaction: &Transaction) -> Result<Vec<Event>, ProgramError> {
        if let Some(created) = transaction.instruction.created_account() {
            if transaction.cosigner() != Some(created) {
                return Err(ProgramError::MissingCosigner);
            }
        }

        match &transaction.instruction {
            Instruction::InitializePlayer {
                account,
                initial_balance,
            } => self.handle_initialize_player(&transaction.public, account, *initial_balance),
            Instruction::PlaceBet {
                player_account,
                game_account,
                bet_amount,
            } => self.handle_place_bet(
                &transaction.public,
                player_account,
                game_account,
                *bet_amount,
            ),
            Instruction::DetermineResult {
                game_account,
                player_account,
                outcome,
            } => self.handle_determine_result(
                &transaction.public,
                game_account,
                player_account,
                *outcome,
            ),
        }
    }

    /// Run a transaction, returning the signer's next nonce and the emitted events.
    pub fn execute(&mut self, transaction: &Transaction) -> Result<(u64, Vec<Event>), ProgramError> {
        let nonce = self.prepare(transaction)?;
        let events = self.apply(transaction)?;
        Ok((nonce, events))
    }

    pub fn commit(self) -> Vec<(Key, Value)> {
        self.pending.into_iter().collect()
    }

    fn exists(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    fn owned_by(owner: &PublicKey, signer: &PublicKey) -> Result<(), ProgramError> {
        if owner != signer {
            return Err(ProgramError::Unauthorized);
        }
        Ok(())
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    fn get(&self, key: &Key) -> Option<Value> {
        self.pending
            .get(key)
            .cloned()
            .or_else(|| self.state.get(key))
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mocks::create_account_keypair, Memory};
    use commonware_cryptography::Signer;
    use plinko_types::plinko::{GameResult, Outcome};

    fn initialize(state: &mut Memory, signer_seed: u64, account_seed: u64, balance: u64) {
        let (signer, _) = create_account_keypair(signer_seed);
        let (account, account_public) = create_account_keypair(account_seed);
        let nonce = crate::nonce(&*state, &signer.public_key());
        let tx = Transaction::sign_with_cosigner(
            &signer,
            &account,
            nonce,
            Instruction::InitializePlayer {
                account: account_public,
                initial_balance: balance,
            },
        );
        let mut layer = Layer::new(&*state);
        layer.execute(&tx).unwrap();
        let changes = layer.commit();
        state.apply(changes);
    }

    #[test]
    fn test_nonce_validation() {
        let state = Memory::default();
        let mut layer = Layer::new(&state);
        let (signer, _) = create_account_keypair(1);
        let (account, account_public) = create_account_keypair(2);
        let instruction = Instruction::InitializePlayer {
            account: account_public,
            initial_balance: 100,
        };

        // Wrong nonce should fail
        let tx = Transaction::sign_with_cosigner(&signer, &account, 1, instruction.clone());
        assert_eq!(layer.prepare(&tx), Err(ProgramError::NonceMismatch));

        // Correct nonce should succeed
        let tx = Transaction::sign_with_cosigner(&signer, &account, 0, instruction);
        assert_eq!(layer.prepare(&tx), Ok(1));
    }

    #[test]
    fn test_invalid_signature() {
        let state = Memory::default();
        let mut layer = Layer::new(&state);
        let (signer, _) = create_account_keypair(1);
        let (account, account_public) = create_account_keypair(2);
        let mut tx = Transaction::sign_with_cosigner(
            &signer,
            &account,
            0,
            Instruction::InitializePlayer {
                account: account_public,
                initial_balance: 100,
            },
        );
        tx.nonce = 7;
        assert_eq!(layer.execute(&tx), Err(ProgramError::InvalidSignature));
        assert!(layer.commit().is_empty());
    }

    #[test]
    fn test_staged_writes_stay_pending() {
        let mut state = Memory::default();
        initialize(&mut state, 1, 2, 100);
        let (_, player_id) = create_account_keypair(2);
        let key = Key::Player(player_id);
        let Some(Value::Player(mut player)) = state.get(&key) else {
            panic!("Expected player account");
        };

        // Reads see the staged write; the state does not until commit
        player.balance = 7;
        let mut layer = Layer::new(&state);
        layer.insert(key.clone(), Value::Player(player.clone()));
        assert_eq!(layer.get(&key), Some(Value::Player(player.clone())));
        let changes = layer.commit();
        assert!(matches!(state.get(&key), Some(Value::Player(p)) if p.balance == 100));

        state.apply(changes);
        assert_eq!(state.get(&key), Some(Value::Player(player)));
    }

    #[test]
    fn test_creation_requires_cosigner() {
        let state = Memory::default();
        let mut layer = Layer::new(&state);
        let (signer, _) = create_account_keypair(1);
        let (_, account_public) = create_account_keypair(2);

        // Signed only by the player, not by the new account
        let tx = Transaction::sign(
            &signer,
            0,
            Instruction::InitializePlayer {
                account: account_public,
                initial_balance: 100,
            },
        );
        assert_eq!(layer.execute(&tx), Err(ProgramError::MissingCosigner));
    }

    #[test]
    fn test_full_round() {
        let mut state = Memory::default();
        initialize(&mut state, 1, 2, 100);

        let (signer, signer_public) = create_account_keypair(1);
        let (_, player_id) = create_account_keypair(2);
        let (game, game_id) = create_account_keypair(3);

        // Place a bet
        let tx = Transaction::sign_with_cosigner(
            &signer,
            &game,
            1,
            Instruction::PlaceBet {
                player_account: player_id.clone(),
                game_account: game_id.clone(),
                bet_amount: 50,
            },
        );
        let mut layer = Layer::new(&state);
        let (nonce, events) = layer.execute(&tx).unwrap();
        assert_eq!(nonce, 2);
        assert_eq!(
            events,
            vec![Event::BetPlaced {
                game: game_id.clone(),
                player: signer_public.clone(),
                bet_amount: 50,
                balance: 50,
            }]
        );
        let changes = layer.commit();
        state.apply(changes);

        // Settle as a win
        let tx = Transaction::sign(
            &signer,
            2,
            Instruction::DetermineResult {
                game_account: game_id.clone(),
                player_account: player_id.clone(),
                outcome: Outcome::Win,
            },
        );
        let mut layer = Layer::new(&state);
        layer.execute(&tx).unwrap();
        let changes = layer.commit();
        state.apply(changes);

        let Some(Value::Player(player)) = state.get(&Key::Player(player_id)) else {
            panic!("Expected player account");
        };
        assert_eq!(player.balance, 150);
        let Some(Value::Game(game)) = state.get(&Key::Game(game_id)) else {
            panic!("Expected game account");
        };
        assert_eq!(game.result, GameResult::Win);
    }
}
