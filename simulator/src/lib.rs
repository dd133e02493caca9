use axum::{
    body::Bytes,
    extract::State as AxumState,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use commonware_codec::{DecodeExt, Encode};
use commonware_utils::from_hex;
use plinko_execution::{execute_state_transition, Memory, State};
use plinko_types::{
    api::Receipt,
    execution::{Key, Transaction, Value},
};
use std::sync::{Arc, RwLock};
use tower_http::cors::{Any, CorsLayer};

/// Runs the plinko program in memory, one transaction at a time.
#[derive(Clone, Default)]
pub struct Simulator {
    state: Arc<RwLock<Memory>>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, transaction: &Transaction) -> Receipt {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Recovering poisoned state lock in submit: {}", e);
                e.into_inner()
            }
        };
        execute_state_transition(&mut *state, transaction)
    }

    pub fn query_state(&self, key: &Key) -> Option<Value> {
        let state = match self.state.read() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Recovering poisoned state lock in query_state: {}", e);
                e.into_inner()
            }
        };
        state.get(key)
    }
}

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        // Configure CORS
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/submit", post(submit))
            .route("/state/:query", get(query_state))
            .layer(cors)
            .with_state(self.simulator.clone())
    }
}

async fn submit(AxumState(simulator): AxumState<Arc<Simulator>>, body: Bytes) -> impl IntoResponse {
    let transaction = match Transaction::decode(&mut body.as_ref()) {
        Ok(transaction) => transaction,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    let receipt = simulator.submit(&transaction);
    (StatusCode::OK, receipt.encode().to_vec()).into_response()
}

async fn query_state(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    axum::extract::Path(query): axum::extract::Path<String>,
) -> impl IntoResponse {
    let raw = match from_hex(&query) {
        Some(raw) => raw,
        None => return StatusCode::BAD_REQUEST.into_response(),
    };
    let key = match Key::decode(&mut raw.as_slice()) {
        Ok(key) => key,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    match simulator.query_state(&key) {
        Some(value) => (StatusCode::OK, value.encode().to_vec()).into_response(),
        None => (StatusCode::NOT_FOUND, vec![]).into_response(),
    }
}
