use crate::{Error, Result};
use commonware_codec::{DecodeExt, Encode};
use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::hex;
use plinko_types::{
    api::Receipt,
    execution::{Key, Transaction, Value},
};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Timeout for connections and requests
const TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn join_hex_path(base: &Url, prefix: &str, bytes: &[u8]) -> Result<Url> {
    Ok(base.join(&format!("{prefix}/{}", hex(bytes)))?)
}

/// Plinko program API client
#[derive(Clone)]
pub struct Client {
    pub base_url: Url,
    pub http_client: HttpClient,
}

impl Client {
    /// Create a new client
    #[allow(clippy::result_large_err)]
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidScheme(scheme.to_string()));
            }
        }

        let http_client = HttpClient::builder()
            .timeout(TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(60)) // Keep connections alive
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Submit a transaction and wait for the program's receipt
    pub async fn submit(&self, transaction: &Transaction) -> Result<Receipt> {
        let url = self.base_url.join("submit")?;
        debug!(nonce = transaction.nonce, "Submitting to {}", url);

        let response = self
            .http_client
            .post(url)
            .body(transaction.encode().to_vec())
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Failed(response.status()));
        }
        let buf = response.bytes().await?.to_vec();
        Ok(Receipt::decode(&mut buf.as_slice())?)
    }

    /// Query state by key
    pub async fn query_state(&self, key: &Key) -> Result<Option<Value>> {
        // Make request
        let url = join_hex_path(&self.base_url, "state", &key.encode())?;
        let response = self.http_client.get(url).send().await?;

        // Parse response
        match response.status() {
            reqwest::StatusCode::OK => {
                let buf = response.bytes().await?.to_vec();
                Ok(Some(Value::decode(&mut buf.as_slice())?))
            }
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Error::Failed(response.status())),
        }
    }

    /// Query the next nonce expected from `public` (zero for unseen signers)
    pub async fn query_nonce(&self, public: &PublicKey) -> Result<u64> {
        match self.query_state(&Key::Account(public.clone())).await? {
            Some(Value::Account(account)) => Ok(account.nonce),
            None => Ok(0),
            Some(_) => Err(Error::UnexpectedResponse),
        }
    }
}
