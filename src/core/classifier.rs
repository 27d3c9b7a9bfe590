//! Query classification

use crate::domain::governance::{ChainClient, Classification};

/// Decide whether `input` names an account or a proposal
///
/// Never fails: anything that is not an address is passed on as a proposal
/// identifier and validated by the contract call.
pub fn classify(client: &dyn ChainClient, input: &str) -> Classification {
    let trimmed = input.trim();
    if client.is_valid_address(trimmed) {
        Classification::Address(trimmed.to_string())
    } else {
        Classification::ProposalId(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::governance::{ContractKind, EventFilter, LogRecord, Record};

    struct AddressOnly;

    #[async_trait::async_trait]
    impl ChainClient for AddressOnly {
        async fn call_read_only(
            &self,
            _contract: ContractKind,
            _method: &str,
            _args: &[String],
        ) -> anyhow::Result<Record> {
            anyhow::bail!("not used")
        }

        async fn get_past_events(
            &self,
            _contract: ContractKind,
            _event: &str,
            _filter: &EventFilter,
            _from_block: u64,
        ) -> anyhow::Result<Vec<LogRecord>> {
            anyhow::bail!("not used")
        }
    }

    #[test]
    fn test_classify_address() {
        let classified = classify(&AddressOnly, "  0x36fAa1e49fF125ac72ceae0d5a2E35bC9aDD6591\n");
        assert_eq!(
            classified,
            Classification::Address("0x36fAa1e49fF125ac72ceae0d5a2E35bC9aDD6591".to_string())
        );
    }

    #[test]
    fn test_classify_proposal_id() {
        assert_eq!(
            classify(&AddressOnly, " 136 "),
            Classification::ProposalId("136".to_string())
        );
        // Not validated here; the contract call rejects it later
        assert_eq!(
            classify(&AddressOnly, "not-a-number"),
            Classification::ProposalId("not-a-number".to_string())
        );
    }
}
