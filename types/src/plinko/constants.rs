/// Multiplier applied to the stake when a game is settled as a win.
///
/// The stake leaves the player balance when the bet is placed, so a win
/// returns the stake plus an equal amount of winnings.
pub const WIN_PAYOUT_MULTIPLIER: u64 = 2;

/// Balance granted by the command line tools when none is requested.
pub const DEFAULT_INITIAL_BALANCE: u64 = 100;

/// Maximum number of events carried by a single receipt.
pub const MAX_RECEIPT_EVENTS: usize = 8;
