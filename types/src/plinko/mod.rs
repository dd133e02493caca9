mod account;
mod constants;
mod error;

pub use account::*;
pub use constants::*;
pub use error::*;

#[cfg(test)]
mod tests;
