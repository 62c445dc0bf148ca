//! Human-readable rendering of registration parameters.

use churn_core::RegistrationParams;
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

/// Render parameters as the block printed by `register-param-gen`.
pub fn render(params: &RegistrationParams) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let kick_params = params
        .operator_kick_params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let sig = &params.churn_approver_signature;

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "operatorKickParams: [{}]", kick_params);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "fields needed for churnApproverSignature");
    let _ = writeln!(out, "Signature: {}", hex::encode(&sig.signature));
    let _ = writeln!(out, "Salt: {}", hex::encode(sig.salt));
    let _ = writeln!(out, "Expiry: {}", sig.expiry);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "abi.encode(operatorKickParams): 0x{}",
        hex::encode(params.abi_encode_kick_params())
    );
    let _ = writeln!(
        out,
        "abi.encode(churnApproverSignature): 0x{}",
        hex::encode(params.abi_encode_signature())
    );
    let _ = writeln!(out, "{}", rule);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use churn_core::{ChurnApproverSignature, OperatorAddress, OperatorKickParam, U256};

    #[test]
    fn renders_all_fields() {
        let params = RegistrationParams {
            operator_kick_params: vec![OperatorKickParam::new(
                2,
                OperatorAddress::from_bytes([0xab; 20]),
            )],
            churn_approver_signature: ChurnApproverSignature {
                signature: vec![0x01, 0x02],
                salt: [0x11; 32],
                expiry: U256::from(1_700_000_900),
            },
        };
        let text = render(&params);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "-".repeat(80));
        assert_eq!(
            lines[1],
            format!("operatorKickParams: [{{quorumNumber: 2, operator: 0x{}}}]", "ab".repeat(20))
        );
        assert!(lines.contains(&"Signature: 0102"));
        assert!(lines.contains(&format!("Salt: {}", "11".repeat(32)).as_str()));
        assert!(lines.contains(&"Expiry: 1700000900"));
        assert_eq!(lines.iter().filter(|l| **l == "-".repeat(80)).count(), 4);
    }

    #[test]
    fn free_admission_renders_empty_list() {
        let params = RegistrationParams {
            operator_kick_params: vec![],
            churn_approver_signature: ChurnApproverSignature {
                signature: vec![],
                salt: [0; 32],
                expiry: U256::ZERO,
            },
        };
        assert!(render(&params).contains("operatorKickParams: []\n"));
    }
}
