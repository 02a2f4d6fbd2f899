//! Wire types for the Qubic RPC service
//! Field names follow the upstream camelCase JSON; amounts are `U256`.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::utils::decoder::{
    deserialize_amount, deserialize_opt_amount, serialize_amount, serialize_opt_amount,
};

// ============================================
// Tick / network
// ============================================

/// Latest tick as reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickInfo {
    pub tick: u64,
    #[serde(default)]
    pub duration: u64,
    pub epoch: u32,
    #[serde(default)]
    pub initial_tick: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TickInfoResponse {
    pub tick_info: TickInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedTick {
    pub tick_number: u64,
    pub epoch: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickInterval {
    pub first_tick: u64,
    pub last_tick: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochIntervals {
    pub epoch: u32,
    #[serde(default)]
    pub intervals: Vec<TickInterval>,
}

/// Archive processing status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub last_processed_tick: ProcessedTick,
    #[serde(default)]
    pub skipped_ticks: Vec<TickInterval>,
    #[serde(default)]
    pub processed_tick_intervals_per_epoch: Vec<EpochIntervals>,
}

// ============================================
// Balances / assets
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub id: String,
    #[serde(deserialize_with = "deserialize_amount", serialize_with = "serialize_amount")]
    pub balance: U256,
    #[serde(default)]
    pub valid_for_tick: u64,
    #[serde(default)]
    pub latest_incoming_transfer_tick: u64,
    #[serde(default)]
    pub latest_outgoing_transfer_tick: u64,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_amount",
        serialize_with = "serialize_opt_amount"
    )]
    pub incoming_amount: Option<U256>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_amount",
        serialize_with = "serialize_opt_amount"
    )]
    pub outgoing_amount: Option<U256>,
    #[serde(default)]
    pub number_of_incoming_transfers: u64,
    #[serde(default)]
    pub number_of_outgoing_transfers: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    pub balance: Balance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedAsset {
    pub issuer_identity: String,
    pub name: String,
    #[serde(default)]
    pub number_of_decimal_places: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedAssetData {
    pub owner_identity: String,
    #[serde(default)]
    pub managing_contract_index: u32,
    #[serde(deserialize_with = "deserialize_amount", serialize_with = "serialize_amount")]
    pub number_of_units: U256,
    pub issued_asset: IssuedAsset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedAsset {
    pub data: OwnedAssetData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OwnedAssetsResponse {
    #[serde(default)]
    pub owned_assets: Vec<OwnedAsset>,
}

// ============================================
// Transactions
// ============================================

/// One ledger transaction, flattened with its settlement flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub source_id: String,
    pub dest_id: String,
    /// `None` when the service omitted the field; such entries never aggregate
    #[serde(
        default,
        deserialize_with = "deserialize_opt_amount",
        serialize_with = "serialize_opt_amount"
    )]
    pub amount: Option<U256>,
    pub tick_number: u64,
    #[serde(default)]
    pub input_type: u32,
    #[serde(default)]
    pub input_size: u32,
    #[serde(default)]
    pub input_hex: String,
    #[serde(default)]
    pub signature_hex: String,
    #[serde(default)]
    pub tx_id: String,
    /// `Some(false)` = recorded but funds did not move
    #[serde(default)]
    pub money_flew: Option<bool>,
}

impl Transaction {
    /// Plain transfer between two identities
    pub fn transfer(source: &str, dest: &str, amount: u64, tick: u64) -> Self {
        Self {
            source_id: source.to_string(),
            dest_id: dest.to_string(),
            amount: Some(U256::from(amount)),
            tick_number: tick,
            money_flew: Some(true),
            ..Default::default()
        }
    }

    pub fn with_money_flew(mut self, flew: Option<bool>) -> Self {
        self.money_flew = flew;
        self
    }

    /// Settled amount, or `None` if the transfer must be ignored by aggregation
    #[inline]
    pub fn settled_amount(&self) -> Option<U256> {
        if self.money_flew == Some(false) {
            return None;
        }
        self.amount
    }
}

/// v2 envelope: `{ transaction: {...}, timestamp, moneyFlew }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionRecord {
    pub transaction: Transaction,
    #[serde(default)]
    pub money_flew: Option<bool>,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        let mut tx = record.transaction;
        if record.money_flew.is_some() {
            tx.money_flew = record.money_flew;
        }
        tx
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TickTransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdentityTransferGroup {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdentityTransfersResponse {
    #[serde(default)]
    pub transactions: Vec<IdentityTransferGroup>,
}

/// Inclusive tick range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub start: u64,
    pub end: u64,
}

impl TickRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn ticks(&self) -> impl Iterator<Item = u64> {
        self.start..=self.end
    }
}

// ============================================
// Hashes / quorum
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashDigest {
    pub hex_digest: String,
}

/// Kept loosely typed; the dashboard only renders it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumTickData {
    #[serde(default)]
    pub quorum_tick_structure: serde_json::Value,
    #[serde(default)]
    pub quorum_diff_per_computor: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuorumTickResponse {
    pub quorum_tick_data: QuorumTickData,
}

// ============================================
// Smart contracts / events
// ============================================

/// Read-only contract function call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartContractQuery {
    pub contract_index: u32,
    pub input_type: u32,
    pub input_size: u32,
    /// base64 payload
    pub request_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartContractResponse {
    /// base64 payload
    #[serde(default)]
    pub response_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDecodeRequest {
    pub tick_number: u64,
    pub event_type: u32,
    /// hex-encoded raw event
    pub event_data: String,
}
