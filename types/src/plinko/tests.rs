use super::*;
use crate::{
    api::Receipt,
    execution::{Event, Instruction, Key, Transaction, Value},
};
use commonware_codec::{DecodeExt, Encode, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, PrivateKeyExt, Signer};
use rand::{rngs::StdRng, SeedableRng};

fn keypair(seed: u64) -> PrivateKey {
    let mut rng = StdRng::seed_from_u64(seed);
    PrivateKey::from_rng(&mut rng)
}

#[test]
fn test_game_result_tags() {
    // Tag 1 is a win, matching the program's result byte
    assert_eq!(GameResult::Win.encode().as_ref(), &[1u8]);
    assert_eq!(GameResult::Lose.encode().as_ref(), &[2u8]);
    assert_eq!(GameResult::default(), GameResult::Pending);
    assert!(GameResult::read(&mut &[3u8][..]).is_err());
}

#[test]
fn test_outcome_payout() {
    assert_eq!(Outcome::Win.payout(50), Some(100));
    assert_eq!(Outcome::Lose.payout(50), Some(0));
    assert_eq!(Outcome::Win.payout(u64::MAX), None);
    assert_eq!(GameResult::from(Outcome::Win), GameResult::Win);
    assert!(GameResult::from(Outcome::Lose).is_settled());
}

#[test]
fn test_game_account_rejects_zero_bet() {
    let owner = keypair(1).public_key();
    let id = keypair(2).public_key();
    let player_account = keypair(3).public_key();
    let mut game = GameAccount::new(id, owner, player_account.clone(), 50);
    let decoded = GameAccount::decode(game.encode()).unwrap();
    assert_eq!(decoded.result, GameResult::Pending);
    assert_eq!(decoded.player_account, player_account);

    game.bet_amount = 0;
    assert!(GameAccount::decode(game.encode()).is_err());
}

#[test]
fn test_value_tags_distinguish_accounts() {
    let owner = keypair(1).public_key();
    let id = keypair(2).public_key();
    let player = Value::Player(PlayerAccount::new(id.clone(), owner.clone(), 100));
    let game = Value::Game(GameAccount::new(id.clone(), owner, keypair(3).public_key(), 10));

    assert_eq!(Value::decode(player.encode()).unwrap(), player);
    assert_eq!(Value::decode(game.encode()).unwrap(), game);
    assert_ne!(Key::Player(id.clone()).encode(), Key::Game(id).encode());
}

#[test]
fn test_transaction_cosignature() {
    let signer = keypair(1);
    let account = keypair(2);
    let instruction = Instruction::InitializePlayer {
        account: account.public_key(),
        initial_balance: 100,
    };

    let tx = Transaction::sign_with_cosigner(&signer, &account, 0, instruction.clone());
    assert!(tx.verify());
    assert_eq!(tx.cosigner(), Some(&account.public_key()));
    assert_eq!(instruction.created_account(), Some(&account.public_key()));

    // Survives the wire
    let decoded = Transaction::decode(tx.encode()).unwrap();
    assert_eq!(decoded, tx);
    assert!(decoded.verify());

    // A cosignature over a different nonce does not verify
    let mut forged = tx.clone();
    forged.nonce = 1;
    assert!(!forged.verify());

    let plain = Transaction::sign(&signer, 0, instruction);
    assert!(plain.verify());
    assert!(plain.cosigner().is_none());
}

#[test]
fn test_receipt_encoding() {
    let owner = keypair(1).public_key();
    let game = keypair(2).public_key();
    let accepted = Receipt::Accepted {
        nonce: 3,
        events: vec![Event::ResultDetermined {
            game,
            player: owner,
            outcome: Outcome::Win,
            payout: 100,
            balance: 150,
        }],
    };
    assert_eq!(Receipt::decode(accepted.encode()).unwrap(), accepted);

    let rejected = Receipt::Rejected(ProgramError::AlreadySettled);
    let decoded = Receipt::decode(rejected.encode()).unwrap();
    assert!(!decoded.is_accepted());
    assert_eq!(decoded, rejected);
    assert_eq!(ProgramError::AlreadySettled.to_string(), "game already settled");
}
