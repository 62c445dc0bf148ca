//! Test harness: a churn authority served over HTTP on a loopback port.

use churn_authority::{api, AuthorityConfig, ChurnAuthority, QuorumRegistry, StaticRanking};
use churn_client::{AuthorityClient, AuthorizationVerifier, ChurnFlow, ClientConfig};
use churn_core::{KeyPair, OperatorAddress, PublicKey, QuorumId};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// One quorum's setup: id, capacity and incumbents ranked weakest last.
pub struct QuorumSetup {
    pub id: QuorumId,
    pub capacity: usize,
    pub incumbents: Vec<OperatorAddress>,
}

impl QuorumSetup {
    pub fn new(id: QuorumId, capacity: usize, incumbents: Vec<OperatorAddress>) -> Self {
        Self {
            id,
            capacity,
            incumbents,
        }
    }
}

/// A running authority. The server task stops when this is dropped.
pub struct TestAuthority {
    pub addr: SocketAddr,
    pub authority: Arc<ChurnAuthority>,
    server: JoinHandle<()>,
}

impl TestAuthority {
    /// Serve an authority over `quorums` with default config.
    pub async fn start(quorums: Vec<QuorumSetup>) -> std::io::Result<Self> {
        Self::start_with(quorums, AuthorityConfig::default()).await
    }

    pub async fn start_with(quorums: Vec<QuorumSetup>, config: AuthorityConfig) -> std::io::Result<Self> {
        let mut capacities = BTreeMap::new();
        let mut ranking = StaticRanking::default();
        for quorum in quorums {
            capacities.insert(quorum.id, quorum.capacity);
            ranking = ranking.with_quorum(quorum.id, quorum.incumbents);
        }
        let registry = QuorumRegistry::new(capacities, Arc::new(ranking));
        let authority = ChurnAuthority::new(KeyPair::generate(), registry, &config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
        Self::serve(Arc::new(authority)).await
    }

    /// Serve an already-built authority.
    pub async fn serve(authority: Arc<ChurnAuthority>) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = api::build_router(authority.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self {
            addr,
            authority,
            server,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn public_key(&self) -> PublicKey {
        self.authority.public_key()
    }

    /// A client flow that checks replies against this authority's key.
    pub fn flow(&self) -> churn_client::Result<ChurnFlow> {
        let client = AuthorityClient::new(ClientConfig::new(self.base_url()))?;
        Ok(ChurnFlow::new(
            client,
            AuthorizationVerifier::new(Some(self.public_key())),
        ))
    }
}

impl Drop for TestAuthority {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// An operator identity: hex address and signing key.
pub struct TestOperator {
    pub address: String,
    pub key: KeyPair,
}

impl TestOperator {
    /// Operator whose address is twenty copies of `byte`.
    pub fn new(byte: u8) -> Self {
        Self {
            address: OperatorAddress::from_bytes([byte; 20]).to_hex(),
            key: KeyPair::generate(),
        }
    }
}

/// Address with `prefix` followed by zero bytes, e.g. `0xabcd0000…`.
pub fn address_with_prefix(prefix: &[u8]) -> OperatorAddress {
    let mut bytes = [0u8; 20];
    bytes[..prefix.len()].copy_from_slice(prefix);
    OperatorAddress::from_bytes(bytes)
}
