//! HTTP API for the churn authority.

use crate::authority::ChurnAuthority;
use crate::error::{DenialReason, Error};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use churn_core::{ChurnReply, ChurnRequest, ErrorBody};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

type AppState = Arc<ChurnAuthority>;

/// Path of the churn endpoint.
pub const CHURN_PATH: &str = "/api/v1/churn";

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/authority", get(authority_info))
        .route(CHURN_PATH, post(churn))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct AuthorityInfo {
    public_key: String,
    quorums: Vec<u8>,
}

async fn authority_info(State(authority): State<AppState>) -> Json<AuthorityInfo> {
    Json(AuthorityInfo {
        public_key: authority.public_key().to_hex(),
        quorums: authority.registry().quorum_ids().collect(),
    })
}

async fn churn(
    State(authority): State<AppState>,
    Json(request): Json<ChurnRequest>,
) -> Result<Json<ChurnReply>, ApiError> {
    // Deciding takes std locks and may block in the ranking source.
    tokio::task::spawn_blocking(move || authority.handle(&request))
        .await
        .map_err(|e| ApiError(Error::Handler(e.to_string())))?
        .map(Json)
        .map_err(ApiError)
}

/// An authority error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            Error::AdmissionDenied(DenialReason::MalformedRequest(_)) => {
                (StatusCode::BAD_REQUEST, "malformed_request")
            }
            Error::AdmissionDenied(_) => (StatusCode::FORBIDDEN, "admission_denied"),
            _ => {
                tracing::error!("churn request failed: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{RankingError, RankingSource};
    use crate::{AuthorityConfig, QuorumRegistry};
    use churn_core::{KeyPair, OperatorAddress, QuorumId, QuorumSet};
    use std::collections::BTreeMap;
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[test]
    fn denial_maps_to_forbidden() {
        let response = ApiError(DenialReason::UnknownQuorum(7).into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn malformed_maps_to_bad_request() {
        let response =
            ApiError(DenialReason::MalformedRequest("empty".to_string()).into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_map_to_500() {
        let response = ApiError(Error::LockPoisoned).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = ApiError(Error::Handler("task panicked".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Ranking that blocks its caller until released.
    struct GatedRanking {
        entered: tokio::sync::mpsc::UnboundedSender<()>,
        release: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl RankingSource for GatedRanking {
        fn ranked_incumbents(&self, _quorum: QuorumId) -> std::result::Result<Vec<OperatorAddress>, RankingError> {
            let _ = self.entered.send(());
            let release = self.release.lock().map_err(|e| RankingError(e.to_string()))?;
            let _ = release.recv_timeout(Duration::from_secs(10));
            Ok(vec![])
        }
    }

    async fn http(addr: SocketAddr, method: &str, path: &str, body: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let head = format!(
            "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(body.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    // Single-threaded runtime: a handler blocking inline would stall /health.
    #[tokio::test(flavor = "current_thread")]
    async fn blocked_ranking_does_not_stall_the_server() {
        let (entered_tx, mut entered_rx) = tokio::sync::mpsc::unbounded_channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let ranking = GatedRanking {
            entered: entered_tx,
            release: Mutex::new(release_rx),
        };
        let registry = QuorumRegistry::new(BTreeMap::from([(0, 3)]), Arc::new(ranking));
        let authority =
            ChurnAuthority::new(KeyPair::generate(), registry, &AuthorityConfig::default()).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(Arc::new(authority))).await.unwrap();
        });

        let key = KeyPair::generate();
        let request = ChurnRequest::new_signed(
            OperatorAddress::from_bytes([7; 20]),
            &key,
            QuorumSet::parse("0").unwrap(),
            [7; 32],
        );
        let body = serde_json::to_string(&request).unwrap();
        let pending = tokio::spawn(async move { http(addr, "POST", CHURN_PATH, &body).await });

        tokio::time::timeout(Duration::from_secs(5), entered_rx.recv())
            .await
            .unwrap()
            .unwrap();
        let health = tokio::time::timeout(Duration::from_secs(2), http(addr, "GET", "/health", ""))
            .await
            .expect("health must answer while a churn request is blocked");
        assert!(health.starts_with("HTTP/1.1 200"), "{health}");

        release_tx.send(()).unwrap();
        let churned = pending.await.unwrap();
        assert!(churned.starts_with("HTTP/1.1 200"), "{churned}");
    }
}
