use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::WIN_PAYOUT_MULTIPLIER;
use crate::AccountId;

/// Result recorded on a game account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GameResult {
    #[default]
    Pending = 0,
    Win = 1,
    Lose = 2,
}

impl GameResult {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Write for GameResult {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameResult {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Win),
            2 => Ok(Self::Lose),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for GameResult {
    const SIZE: usize = 1;
}

/// Settlement outcome submitted with `DetermineResult`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Outcome {
    Win = 1,
    Lose = 2,
}

impl Outcome {
    /// Amount credited to the player when a game with `bet_amount` settles
    /// with this outcome. `None` on overflow.
    pub fn payout(&self, bet_amount: u64) -> Option<u64> {
        match self {
            Self::Win => bet_amount.checked_mul(WIN_PAYOUT_MULTIPLIER),
            Self::Lose => Some(0),
        }
    }
}

impl From<Outcome> for GameResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Self::Win,
            Outcome::Lose => Self::Lose,
        }
    }
}

impl Write for Outcome {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Outcome {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            1 => Ok(Self::Win),
            2 => Ok(Self::Lose),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Outcome {
    const SIZE: usize = 1;
}

/// Player account holding a chip balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerAccount {
    pub id: AccountId,
    pub player: PublicKey,
    pub balance: u64,
}

impl PlayerAccount {
    pub fn new(id: AccountId, player: PublicKey, balance: u64) -> Self {
        Self {
            id,
            player,
            balance,
        }
    }
}

impl Write for PlayerAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.player.write(writer);
        self.balance.write(writer);
    }
}

impl Read for PlayerAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: AccountId::read(reader)?,
            player: PublicKey::read(reader)?,
            balance: u64::read(reader)?,
        })
    }
}

impl EncodeSize for PlayerAccount {
    fn encode_size(&self) -> usize {
        self.id.encode_size() + self.player.encode_size() + self.balance.encode_size()
    }
}

/// Game account created by a single bet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameAccount {
    pub id: AccountId,
    pub player: PublicKey,
    /// Player account the stake was taken from. Only it can be credited.
    pub player_account: AccountId,
    pub bet_amount: u64,
    pub result: GameResult,
}

impl GameAccount {
    pub fn new(
        id: AccountId,
        player: PublicKey,
        player_account: AccountId,
        bet_amount: u64,
    ) -> Self {
        Self {
            id,
            player,
            player_account,
            bet_amount,
            result: GameResult::Pending,
        }
    }
}

impl Write for GameAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.player.write(writer);
        self.player_account.write(writer);
        self.bet_amount.write(writer);
        self.result.write(writer);
    }
}

impl Read for GameAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = AccountId::read(reader)?;
        let player = PublicKey::read(reader)?;
        let player_account = AccountId::read(reader)?;
        let bet_amount = u64::read(reader)?;
        if bet_amount == 0 {
            return Err(Error::Invalid("GameAccount", "bet amount must be positive"));
        }
        let result = GameResult::read(reader)?;

        Ok(Self {
            id,
            player,
            player_account,
            bet_amount,
            result,
        })
    }
}

impl EncodeSize for GameAccount {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.player.encode_size()
            + self.player_account.encode_size()
            + self.bet_amount.encode_size()
            + self.result.encode_size()
    }
}
