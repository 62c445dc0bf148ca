//! One admission attempt: build, call, verify, map.

use crate::client::AuthorityClient;
use crate::error::Result;
use crate::mapper::map_reply;
use crate::request::build_churn_request;
use crate::verify::AuthorizationVerifier;
use churn_core::{unix_now, KeyPair, RegistrationParams};
use tracing::info;

/// Runs the admission flow against one authority.
///
/// Any failure aborts the attempt. Input errors surface before the network
/// is touched, and nothing is returned unless the reply passes validation.
pub struct ChurnFlow {
    client: AuthorityClient,
    verifier: AuthorizationVerifier,
}

impl ChurnFlow {
    pub fn new(client: AuthorityClient, verifier: AuthorizationVerifier) -> Self {
        Self { client, verifier }
    }

    /// Obtain registration parameters for `operator_address` joining
    /// `quorums` (e.g. `"0,1"`).
    pub async fn register_params(
        &self,
        operator_address: &str,
        key_pair: &KeyPair,
        quorums: &str,
    ) -> Result<RegistrationParams> {
        let request = build_churn_request(operator_address, key_pair, quorums)?;
        info!(
            "requesting churn approval for {} on quorums {:?} from {}",
            request.operator_address(),
            request.quorum_ids(),
            self.client.churn_url()
        );

        let reply = self.client.churn(&request).await?;
        let params = map_reply(&reply)?;
        self.verifier.verify(&request, &reply, unix_now())?;

        info!(
            "churn approved with {} eviction(s), expiry {}",
            params.operator_kick_params.len(),
            params.churn_approver_signature.expiry
        );
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::error::{Error, Stage};
    use std::time::Duration;

    fn unreachable_flow() -> ChurnFlow {
        // Port 9 (discard) is not expected to serve HTTP; input errors must
        // fail before any connection is attempted.
        let client = AuthorityClient::new(
            ClientConfig::new("127.0.0.1:9").with_timeout(Duration::from_millis(200)),
        )
        .unwrap();
        ChurnFlow::new(client, AuthorizationVerifier::default())
    }

    #[tokio::test]
    async fn bad_quorums_fail_before_network() {
        let flow = unreachable_flow();
        let key = KeyPair::generate();
        let address = "0x00000000000000000000000000000000000000aa";
        for quorums in ["255", "", "0,,1", "-1"] {
            let err = flow.register_params(address, &key, quorums).await.unwrap_err();
            assert!(matches!(err, Error::Request(_)), "{quorums:?}: {err:?}");
            assert_eq!(err.stage(), Stage::Build);
        }
    }

    #[tokio::test]
    async fn bad_address_fails_before_network() {
        let err = unreachable_flow()
            .register_params("not-an-address", &KeyPair::generate(), "0")
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Build);
    }
}
