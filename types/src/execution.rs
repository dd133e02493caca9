use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    Signer, Verifier,
};
use commonware_utils::union;

use crate::plinko::{GameAccount, Outcome, PlayerAccount};

pub const NAMESPACE: &[u8] = b"_PLINKO";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";

/// Identifier of a player or game account.
///
/// Accounts are named by a freshly generated ed25519 key whose owner must
/// co-sign the transaction that creates the account.
pub type AccountId = PublicKey;

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

/// Signature by the key of an account created in the same transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cosignature {
    pub public: PublicKey,
    pub signature: ed25519::Signature,
}

impl Write for Cosignature {
    fn write(&self, writer: &mut impl BufMut) {
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Cosignature {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            public: PublicKey::read(reader)?,
            signature: ed25519::Signature::read(reader)?,
        })
    }
}

impl EncodeSize for Cosignature {
    fn encode_size(&self) -> usize {
        self.public.encode_size() + self.signature.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
    pub cosigner: Option<Cosignature>,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            Some(&transaction_namespace(NAMESPACE)),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
            cosigner: None,
        }
    }

    /// Sign a transaction that creates the account owned by `account`.
    pub fn sign_with_cosigner(
        private: &ed25519::PrivateKey,
        account: &ed25519::PrivateKey,
        nonce: u64,
        instruction: Instruction,
    ) -> Self {
        let namespace = transaction_namespace(NAMESPACE);
        let payload = Self::payload(&nonce, &instruction);
        let signature = private.sign(Some(&namespace), &payload);
        let cosigner = Cosignature {
            public: account.public_key(),
            signature: account.sign(Some(&namespace), &payload),
        };

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
            cosigner: Some(cosigner),
        }
    }

    /// Verify the signer's signature and, if present, the cosignature.
    pub fn verify(&self) -> bool {
        let namespace = transaction_namespace(NAMESPACE);
        let payload = Self::payload(&self.nonce, &self.instruction);
        if !self
            .public
            .verify(Some(&namespace), &payload, &self.signature)
        {
            return false;
        }
        match &self.cosigner {
            Some(cosigner) => {
                cosigner
                    .public
                    .verify(Some(&namespace), &payload, &cosigner.signature)
            }
            None => true,
        }
    }

    pub fn cosigner(&self) -> Option<&PublicKey> {
        self.cosigner.as_ref().map(|cosigner| &cosigner.public)
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
        match &self.cosigner {
            Some(cosigner) => {
                true.write(writer);
                cosigner.write(writer);
            }
            None => false.write(writer),
        }
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;
        let cosigner = if bool::read(reader)? {
            Some(Cosignature::read(reader)?)
        } else {
            None
        };

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
            cosigner,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
            + bool::SIZE
            + self
                .cosigner
                .as_ref()
                .map_or(0, |cosigner| cosigner.encode_size())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Create a player account owned by the signer.
    /// Binary: [0] [account:32] [initialBalance:u64 BE]
    InitializePlayer { account: AccountId, initial_balance: u64 },

    /// Place a bet, creating a game account and debiting the player account.
    /// Binary: [1] [playerAccount:32] [gameAccount:32] [betAmount:u64 BE]
    PlaceBet {
        player_account: AccountId,
        game_account: AccountId,
        bet_amount: u64,
    },

    /// Settle a pending game and credit the payout.
    /// Binary: [2] [gameAccount:32] [playerAccount:32] [outcome:u8]
    DetermineResult {
        game_account: AccountId,
        player_account: AccountId,
        outcome: Outcome,
    },
}

impl Instruction {
    /// Account this instruction creates, which must co-sign the transaction.
    pub fn created_account(&self) -> Option<&AccountId> {
        match self {
            Self::InitializePlayer { account, .. } => Some(account),
            Self::PlaceBet { game_account, .. } => Some(game_account),
            Self::DetermineResult { .. } => None,
        }
    }
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::InitializePlayer {
                account,
                initial_balance,
            } => {
                0u8.write(writer);
                account.write(writer);
                initial_balance.write(writer);
            }
            Self::PlaceBet {
                player_account,
                game_account,
                bet_amount,
            } => {
                1u8.write(writer);
                player_account.write(writer);
                game_account.write(writer);
                bet_amount.write(writer);
            }
            Self::DetermineResult {
                game_account,
                player_account,
                outcome,
            } => {
                2u8.write(writer);
                game_account.write(writer);
                player_account.write(writer);
                outcome.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            0 => Self::InitializePlayer {
                account: AccountId::read(reader)?,
                initial_balance: u64::read(reader)?,
            },
            1 => Self::PlaceBet {
                player_account: AccountId::read(reader)?,
                game_account: AccountId::read(reader)?,
                bet_amount: u64::read(reader)?,
            },
            2 => Self::DetermineResult {
                game_account: AccountId::read(reader)?,
                player_account: AccountId::read(reader)?,
                outcome: Outcome::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::InitializePlayer { .. } => AccountId::SIZE + u64::SIZE,
                Self::PlaceBet { .. } => AccountId::SIZE * 2 + u64::SIZE,
                Self::DetermineResult { .. } => AccountId::SIZE * 2 + Outcome::SIZE,
            }
    }
}

/// Nonce account used for replay protection of a signer's transactions.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Nonce account of a signer (tag 0)
    Account(PublicKey),

    // Plinko accounts (tags 10-11)
    Player(AccountId),
    Game(AccountId),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }
            Self::Player(id) => {
                10u8.write(writer);
                id.write(writer);
            }
            Self::Game(id) => {
                11u8.write(writer);
                id.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Account(PublicKey::read(reader)?),
            10 => Self::Player(AccountId::read(reader)?),
            11 => Self::Game(AccountId::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE + PublicKey::SIZE
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    /// Nonce account (tag 0)
    Account(Account),

    // Plinko accounts (tags 10-11)
    Player(PlayerAccount),
    Game(GameAccount),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Player(player) => {
                10u8.write(writer);
                player.write(writer);
            }
            Self::Game(game) => {
                11u8.write(writer);
                game.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Account(Account::read(reader)?),
            10 => Self::Player(PlayerAccount::read(reader)?),
            11 => Self::Game(GameAccount::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::Player(player) => player.encode_size(),
                Self::Game(game) => game.encode_size(),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PlayerInitialized {
        account: AccountId,
        player: PublicKey,
        balance: u64,
    },
    BetPlaced {
        game: AccountId,
        player: PublicKey,
        bet_amount: u64,
        balance: u64,
    },
    ResultDetermined {
        game: AccountId,
        player: PublicKey,
        outcome: Outcome,
        payout: u64,
        balance: u64,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::PlayerInitialized {
                account,
                player,
                balance,
            } => {
                20u8.write(writer);
                account.write(writer);
                player.write(writer);
                balance.write(writer);
            }
            Self::BetPlaced {
                game,
                player,
                bet_amount,
                balance,
            } => {
                21u8.write(writer);
                game.write(writer);
                player.write(writer);
                bet_amount.write(writer);
                balance.write(writer);
            }
            Self::ResultDetermined {
                game,
                player,
                outcome,
                payout,
                balance,
            } => {
                22u8.write(writer);
                game.write(writer);
                player.write(writer);
                outcome.write(writer);
                payout.write(writer);
                balance.write(writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            20 => Self::PlayerInitialized {
                account: AccountId::read(reader)?,
                player: PublicKey::read(reader)?,
                balance: u64::read(reader)?,
            },
            21 => Self::BetPlaced {
                game: AccountId::read(reader)?,
                player: PublicKey::read(reader)?,
                bet_amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            22 => Self::ResultDetermined {
                game: AccountId::read(reader)?,
                player: PublicKey::read(reader)?,
                outcome: Outcome::read(reader)?,
                payout: u64::read(reader)?,
                balance: u64::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::PlayerInitialized { .. } => PublicKey::SIZE * 2 + u64::SIZE,
                Self::BetPlaced { .. } => PublicKey::SIZE * 2 + u64::SIZE * 2,
                Self::ResultDetermined { .. } => {
                    PublicKey::SIZE * 2 + Outcome::SIZE + u64::SIZE * 2
                }
            }
    }
}
