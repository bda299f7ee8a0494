use crate::{contract::TokenContract, utils};
use anyhow::Result;
use tracing::info;

/// Result of one balance query, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReading {
    pub account: String,
    pub raw: i128,
    pub formatted: String,
    pub latest_ledger: u32,
}

/// Ask the contract for `account`'s balance and format it for display.
pub async fn query_balance(contract: &dyn TokenContract, account: &str) -> Result<BalanceReading> {
    let call = contract.balance(account).await?;
    info!(
        "Balance for {}: raw={} (ledger {})",
        account, call.result, call.latest_ledger
    );
    Ok(BalanceReading {
        account: account.to_string(),
        raw: call.result,
        formatted: utils::format_balance(call.result),
        latest_ledger: call.latest_ledger,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractError, SimulatedCall};
    use async_trait::async_trait;

    struct FixedContract(i128);

    #[async_trait]
    impl TokenContract for FixedContract {
        async fn balance(&self, _account: &str) -> Result<SimulatedCall<i128>, ContractError> {
            Ok(SimulatedCall {
                result: self.0,
                latest_ledger: 42,
                min_resource_fee: None,
            })
        }
    }

    struct FailingContract;

    #[async_trait]
    impl TokenContract for FailingContract {
        async fn balance(&self, _account: &str) -> Result<SimulatedCall<i128>, ContractError> {
            Err(ContractError::Simulation("contract not deployed".to_string()))
        }
    }

    #[test]
    fn test_query_balance_formats_result() {
        let reading = tokio_test::block_on(query_balance(&FixedContract(123_456_789), "GABC")).unwrap();
        assert_eq!(reading.formatted, "12.35");
        assert_eq!(reading.raw, 123_456_789);
        assert_eq!(reading.account, "GABC");
        assert_eq!(reading.latest_ledger, 42);
    }

    #[test]
    fn test_query_balance_zero() {
        let reading = tokio_test::block_on(query_balance(&FixedContract(0), "GABC")).unwrap();
        assert_eq!(reading.formatted, "0.00");
    }

    #[test]
    fn test_query_balance_propagates_failure() {
        let err = tokio_test::block_on(query_balance(&FailingContract, "GABC")).unwrap_err();
        assert!(err.to_string().contains("not deployed"));
    }
}
