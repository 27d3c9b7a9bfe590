//! Post-processing of an aggregated view

use crate::domain::governance::{ProposalResult, ResolvedView};

/// Attach the canonical identifier and classify the result code
///
/// Pure and idempotent. Tallies and weights stay in base units; event order
/// and content are untouched.
pub fn normalize(mut view: ResolvedView) -> ResolvedView {
    view.proposal.id = view.proposal_id.clone();

    let result = ProposalResult::from_code(view.proposal.result_code);
    if result.is_anomaly() && view.result != Some(result) {
        tracing::warn!(
            proposal_id = %view.proposal_id,
            code = view.proposal.result_code,
            "unrecognized proposal result code"
        );
    }
    view.result = Some(result);
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::governance::{Classification, Proposal};
    use alloy_primitives::{Address, U256};

    fn view(code: u8) -> ResolvedView {
        ResolvedView {
            proposal_id: "136".to_string(),
            classification: Classification::ProposalId("136".to_string()),
            proposal: Proposal {
                id: String::new(),
                result_code: code,
                target: None,
                proposer: None,
                fee_recipient: Address::repeat_byte(0x22),
                fee: None,
                start_time: 1_556_000_000,
                yes_count: U256::from(1_500_000_000_000_000_000u128),
                no_count: U256::ZERO,
            },
            applications: vec![],
            votes: vec![],
            removed_votes: vec![],
            result: None,
        }
    }

    #[test]
    fn test_normalize_maps_result_codes() {
        assert_eq!(normalize(view(0)).result, Some(ProposalResult::Pending));
        assert_eq!(normalize(view(1)).result, Some(ProposalResult::Approved));
        assert_eq!(normalize(view(2)).result, Some(ProposalResult::Rejected));
        assert_eq!(
            normalize(view(7)).result,
            Some(ProposalResult::Unrecognized(7))
        );
    }

    #[test]
    fn test_normalize_stamps_identifier_and_keeps_base_units() {
        let normalized = normalize(view(1));
        assert_eq!(normalized.proposal.id, "136");
        assert_eq!(
            normalized.proposal.yes_count,
            U256::from(1_500_000_000_000_000_000u128)
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for code in [0, 1, 2, 9] {
            let once = normalize(view(code));
            let twice = normalize(once.clone());
            assert_eq!(once, twice);
        }
    }
}
