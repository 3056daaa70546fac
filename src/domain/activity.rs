use serde::{Deserialize, Serialize};

/// A shielded-pool event observed by the indexer.
///
/// Field elements (`precommitment_hash`, `spent_nullifier`, commitments,
/// labels) travel as decimal strings and are compared as strings; the
/// discovery engine never needs them as numbers. Activities arrive in
/// ascending block order; that ordering is a contract the engine relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activity {
    Deposit(DepositActivity),
    Withdrawal(WithdrawalActivity),
    CrosschainDeposit(DepositActivity),
    CrosschainWithdrawal(WithdrawalActivity),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositActivity {
    pub precommitment_hash: String,
    /// Absent until the deposit is activated on-chain.
    pub amount: Option<String>,
    /// Absent until the deposit is activated on-chain.
    pub label: Option<String>,
    pub origin_transaction_hash: String,
    pub destination_transaction_hash: Option<String>,
    pub origin_chain_id: u64,
    pub destination_chain_id: Option<u64>,
    pub block_number: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalActivity {
    pub spent_nullifier: String,
    pub new_commitment: Option<String>,
    pub amount: String,
    pub refund_commitment: Option<String>,
    pub origin_transaction_hash: String,
    pub destination_transaction_hash: Option<String>,
    pub origin_chain_id: u64,
    pub destination_chain_id: Option<u64>,
    pub block_number: u64,
    pub timestamp: u64,
}

impl Activity {
    pub fn block_number(&self) -> u64 {
        match self {
            Activity::Deposit(d) | Activity::CrosschainDeposit(d) => d.block_number,
            Activity::Withdrawal(w) | Activity::CrosschainWithdrawal(w) => w.block_number,
        }
    }

    /// The deposit payload, for both same-chain and cross-chain deposits.
    pub fn as_deposit(&self) -> Option<&DepositActivity> {
        match self {
            Activity::Deposit(d) | Activity::CrosschainDeposit(d) => Some(d),
            _ => None,
        }
    }

    /// The withdrawal payload, for both same-chain and cross-chain withdrawals.
    pub fn as_withdrawal(&self) -> Option<&WithdrawalActivity> {
        match self {
            Activity::Withdrawal(w) | Activity::CrosschainWithdrawal(w) => Some(w),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_tag_roundtrip() {
        let activity = Activity::CrosschainDeposit(DepositActivity {
            precommitment_hash: "123".to_string(),
            amount: None,
            label: None,
            origin_transaction_hash: "0xdead".to_string(),
            destination_transaction_hash: None,
            origin_chain_id: 1,
            destination_chain_id: Some(10),
            block_number: 5,
            timestamp: 1_700_000_000,
        });

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "CROSSCHAIN_DEPOSIT");
        assert_eq!(json["precommitmentHash"], "123");

        let back: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(back, activity);
    }

    #[test]
    fn test_withdrawal_payload_accessor() {
        let activity = Activity::Withdrawal(WithdrawalActivity {
            spent_nullifier: "42".to_string(),
            new_commitment: Some("43".to_string()),
            amount: "400000".to_string(),
            refund_commitment: None,
            origin_transaction_hash: "0xbeef".to_string(),
            destination_transaction_hash: None,
            origin_chain_id: 1,
            destination_chain_id: None,
            block_number: 9,
            timestamp: 1_700_000_001,
        });

        assert!(activity.as_deposit().is_none());
        assert_eq!(activity.as_withdrawal().unwrap().spent_nullifier, "42");
        assert_eq!(activity.block_number(), 9);
    }
}
