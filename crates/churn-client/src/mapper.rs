//! Reply to on-chain parameter mapping.

use crate::error::{Error, Result};
use churn_core::quorum::check_quorum_id;
use churn_core::{
    ChurnApproverSignature, ChurnReply, Error as CoreError, OperatorAddress, OperatorKickParam,
    RegistrationParams, SALT_LENGTH, U256,
};

/// Convert an authority reply into registration parameters.
///
/// Pure: the same reply always maps to the same parameters. Nothing is
/// produced if any eviction names a quorum id at or above the sentinel.
pub fn map_reply(reply: &ChurnReply) -> Result<RegistrationParams> {
    let mut operator_kick_params = Vec::with_capacity(reply.operators_to_churn.len());
    for entry in &reply.operators_to_churn {
        let quorum_number =
            check_quorum_id(u64::from(entry.quorum_id)).map_err(Error::Validation)?;
        if entry.operator.is_empty() {
            return Err(Error::Protocol(format!(
                "eviction for quorum {} names no operator",
                quorum_number
            )));
        }
        operator_kick_params.push(OperatorKickParam::new(
            quorum_number,
            OperatorAddress::from_slice(&entry.operator),
        ));
    }

    let approval = &reply.signature_with_salt_and_expiry;
    let salt: [u8; SALT_LENGTH] = approval.salt.as_slice().try_into().map_err(|_| {
        Error::Protocol(format!(
            "approval salt is {} bytes, expected {}",
            approval.salt.len(),
            SALT_LENGTH
        ))
    })?;
    let expiry = u64::try_from(approval.expiry)
        .map(U256::from)
        .map_err(|_| Error::Validation(CoreError::ExpiryOutOfRange(approval.expiry)))?;

    Ok(RegistrationParams {
        operator_kick_params,
        churn_approver_signature: ChurnApproverSignature {
            signature: approval.signature.clone(),
            salt,
            expiry,
        },
    })
}
