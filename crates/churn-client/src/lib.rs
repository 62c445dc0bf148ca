//! Churn Client - operator side of quorum admission
//!
//! An operator that wants to join full quorums asks the churn authority for
//! an approval and turns the answer into the parameters of the registry's
//! `registerOperatorWithChurn` call.
//!
//! # Example
//!
//! ```no_run
//! use churn_client::{AuthorityClient, AuthorizationVerifier, ChurnFlow, ClientConfig};
//! use churn_core::KeyPair;
//!
//! # async fn run() -> churn_client::Result<()> {
//! let client = AuthorityClient::new(ClientConfig::new("churner:8090"))?;
//! let flow = ChurnFlow::new(client, AuthorizationVerifier::default());
//! let params = flow
//!     .register_params("0x00000000000000000000000000000000000000aa", &KeyPair::generate(), "0,1")
//!     .await?;
//! println!("{}", churn_client::output::render(&params));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod flow;
pub mod mapper;
pub mod output;
pub mod request;
pub mod verify;

pub use client::{AuthorityClient, ClientConfig, DEFAULT_TIMEOUT};
pub use error::{Error, Result, Stage};
pub use flow::ChurnFlow;
pub use mapper::map_reply;
pub use request::{build_churn_request, build_churn_request_with_salt};
pub use verify::AuthorizationVerifier;
