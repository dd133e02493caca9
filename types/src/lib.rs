pub mod api;
pub mod execution;
pub mod plinko;

pub use execution::{AccountId, NAMESPACE};
