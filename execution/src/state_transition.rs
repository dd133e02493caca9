use crate::{Layer, State};
use plinko_types::{api::Receipt, execution::Transaction};
use tracing::{debug, warn};

/// Execute a single transaction against the state.
///
/// Changes are applied only when the transaction is accepted. A rejected
/// transaction leaves every account untouched, including the signer's nonce.
pub fn execute_state_transition<S: State>(state: &mut S, transaction: &Transaction) -> Receipt {
    let mut layer = Layer::new(&*state);
    match layer.execute(transaction) {
        Ok((nonce, events)) => {
            let changes = layer.commit();
            state.apply(changes);
            debug!(nonce, events = events.len(), "transaction accepted");
            Receipt::Accepted { nonce, events }
        }
        Err(error) => {
            warn!(?error, nonce = transaction.nonce, "transaction rejected");
            Receipt::Rejected(error)
        }
    }
}
