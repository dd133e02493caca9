use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};

/// Reason the plinko program refused a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProgramError {
    InvalidInitialBalance = 1,
    InsufficientBalance = 2,
    Unauthorized = 3,
    AccountExists = 4,
    AccountNotFound = 5,
    AlreadySettled = 6,
    InvalidBet = 7,
    MissingCosigner = 8,
    InvalidSignature = 9,
    NonceMismatch = 10,
    Overflow = 11,
}

impl ProgramError {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramError::InvalidInitialBalance => write!(f, "invalid initial balance"),
            ProgramError::InsufficientBalance => write!(f, "insufficient balance"),
            ProgramError::Unauthorized => write!(f, "unauthorized access"),
            ProgramError::AccountExists => write!(f, "account already exists"),
            ProgramError::AccountNotFound => write!(f, "account not found"),
            ProgramError::AlreadySettled => write!(f, "game already settled"),
            ProgramError::InvalidBet => write!(f, "bet amount must be greater than zero"),
            ProgramError::MissingCosigner => write!(f, "new account did not co-sign"),
            ProgramError::InvalidSignature => write!(f, "invalid signature"),
            ProgramError::NonceMismatch => write!(f, "nonce mismatch"),
            ProgramError::Overflow => write!(f, "balance overflow"),
        }
    }
}

impl std::error::Error for ProgramError {}

impl Write for ProgramError {
    fn write(&self, writer: &mut impl BufMut) {
        self.code().write(writer);
    }
}

impl Read for ProgramError {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let error = match u8::read(reader)? {
            1 => Self::InvalidInitialBalance,
            2 => Self::InsufficientBalance,
            3 => Self::Unauthorized,
            4 => Self::AccountExists,
            5 => Self::AccountNotFound,
            6 => Self::AlreadySettled,
            7 => Self::InvalidBet,
            8 => Self::MissingCosigner,
            9 => Self::InvalidSignature,
            10 => Self::NonceMismatch,
            11 => Self::Overflow,
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(error)
    }
}

impl FixedSize for ProgramError {
    const SIZE: usize = 1;
}
