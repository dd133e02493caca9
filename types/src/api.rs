use crate::{
    execution::Event,
    plinko::{ProgramError, MAX_RECEIPT_EVENTS},
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};

/// Response of the program to a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Receipt {
    /// The transaction was executed and its changes committed.
    Accepted { nonce: u64, events: Vec<Event> },
    /// The transaction was refused and nothing was changed.
    Rejected(ProgramError),
}

impl Receipt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl Write for Receipt {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Accepted { nonce, events } => {
                0u8.write(writer);
                nonce.write(writer);
                events.write(writer);
            }
            Self::Rejected(error) => {
                1u8.write(writer);
                error.write(writer);
            }
        }
    }
}

impl Read for Receipt {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Accepted {
                nonce: u64::read(reader)?,
                events: Vec::<Event>::read_range(reader, 0..=MAX_RECEIPT_EVENTS)?,
            }),
            1 => Ok(Self::Rejected(ProgramError::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Receipt {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Accepted { nonce, events } => nonce.encode_size() + events.encode_size(),
            Self::Rejected(error) => error.encode_size(),
        }
    }
}
