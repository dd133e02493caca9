use commonware_cryptography::ed25519::PublicKey;
use plinko_types::{
    execution::{Account, Key, Value},
    plinko::ProgramError,
};
use std::collections::HashMap;

pub trait State {
    fn get(&self, key: &Key) -> Option<Value>;
    fn insert(&mut self, key: Key, value: Value);

    /// Write staged changes. Accounts are never removed, so every change is an insert.
    fn apply(&mut self, changes: Vec<(Key, Value)>) {
        for (key, value) in changes {
            self.insert(key, value);
        }
    }
}

/// In-memory program state.
#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl State for Memory {
    fn get(&self, key: &Key) -> Option<Value> {
        self.state.get(key).cloned()
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.state.insert(key, value);
    }
}

pub fn nonce<S: State>(state: &S, public: &PublicKey) -> u64 {
    load_account(state, public).nonce
}

pub(crate) fn load_account<S: State>(state: &S, public: &PublicKey) -> Account {
    match state.get(&Key::Account(public.clone())) {
        Some(Value::Account(account)) => account,
        _ => Account::default(),
    }
}

pub(crate) fn validate_and_increment_nonce(
    account: &mut Account,
    provided_nonce: u64,
) -> Result<(), ProgramError> {
    if account.nonce != provided_nonce {
        return Err(ProgramError::NonceMismatch);
    }
    account.nonce += 1;
    Ok(())
}
