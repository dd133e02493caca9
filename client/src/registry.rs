use crate::{Error, Result};
use commonware_codec::Encode;
use commonware_utils::hex;
use plinko_types::{
    execution::AccountId,
    plinko::{GameAccount, PlayerAccount},
};
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::warn;

/// Last confirmed record of an account, as fetched from the program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Snapshot {
    Player(PlayerAccount),
    Game(GameAccount),
}

impl Snapshot {
    pub fn id(&self) -> &AccountId {
        match self {
            Self::Player(player) => &player.id,
            Self::Game(game) => &game.id,
        }
    }
}

impl From<PlayerAccount> for Snapshot {
    fn from(player: PlayerAccount) -> Self {
        Self::Player(player)
    }
}

impl From<GameAccount> for Snapshot {
    fn from(game: GameAccount) -> Self {
        Self::Game(game)
    }
}

fn not_found(id: &AccountId) -> Error {
    Error::NotFound(hex(&id.encode()))
}

/// Local cache of account snapshots keyed by account identifier.
///
/// Safe to share between sessions. Entries are replaced whole, so readers
/// never observe a partially updated record.
#[derive(Default)]
pub struct AccountRegistry {
    accounts: RwLock<HashMap<AccountId, Snapshot>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<AccountId, Snapshot>> {
        self.accounts.read().unwrap_or_else(|e| {
            warn!("Recovering poisoned registry lock: {}", e);
            e.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<AccountId, Snapshot>> {
        self.accounts.write().unwrap_or_else(|e| {
            warn!("Recovering poisoned registry lock: {}", e);
            e.into_inner()
        })
    }

    /// Insert or overwrite the snapshot stored under its identifier.
    pub fn put(&self, snapshot: impl Into<Snapshot>) {
        let snapshot = snapshot.into();
        self.write().insert(snapshot.id().clone(), snapshot);
    }

    /// Store several snapshots at once; readers see all of them or none.
    pub fn put_all(&self, snapshots: impl IntoIterator<Item = Snapshot>) {
        let mut accounts = self.write();
        for snapshot in snapshots {
            accounts.insert(snapshot.id().clone(), snapshot);
        }
    }

    pub fn get(&self, id: &AccountId) -> Result<Snapshot> {
        self.read().get(id).cloned().ok_or_else(|| not_found(id))
    }

    /// Fetch a cached player record. A game cached under `id` is reported as missing.
    pub fn player(&self, id: &AccountId) -> Result<PlayerAccount> {
        match self.get(id)? {
            Snapshot::Player(player) => Ok(player),
            Snapshot::Game(_) => Err(not_found(id)),
        }
    }

    /// Fetch a cached game record. A player cached under `id` is reported as missing.
    pub fn game(&self, id: &AccountId) -> Result<GameAccount> {
        match self.get(id)? {
            Snapshot::Game(game) => Ok(game),
            Snapshot::Player(_) => Err(not_found(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
