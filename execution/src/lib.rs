pub mod state_transition;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use layer::Layer;
pub use state::{nonce, Memory, State};
pub use state_transition::execute_state_transition;
