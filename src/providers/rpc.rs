//! Endpoint Client - typed accessors for the Qubic RPC
//!
//! Each accessor validates its identifiers (fail fast, nothing is queued),
//! builds the URL/body and delegates to the shared `RpcGateway`.
//! Errors propagate; degrading to empty is the caller's choice.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::*;
use crate::providers::gateway::RpcGateway;
use crate::providers::transport::{ApiRequest, HttpTransport, Transport};
use crate::utils::constants::*;
use crate::utils::decoder::require_identifier;

pub struct EndpointClient<T: Transport = HttpTransport> {
    gateway: Arc<RpcGateway<T>>,
    rpc_url: String,
    events_url: String,
}

impl<T: Transport> EndpointClient<T> {
    pub fn new(gateway: Arc<RpcGateway<T>>, rpc_url: &str, events_url: &str) -> Self {
        Self {
            gateway,
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            events_url: events_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn gateway(&self) -> &Arc<RpcGateway<T>> {
        &self.gateway
    }

    fn rpc(&self, path: &str) -> String {
        format!("{}{}", self.rpc_url, path)
    }

    async fn fetch_as<R: DeserializeOwned>(&self, request: ApiRequest) -> AppResult<R> {
        let payload = self.gateway.fetch(&request).await?;
        serde_json::from_value(payload).map_err(|e| {
            AppError::with_source(
                crate::models::errors::ErrorCode::RpcInvalidResponse,
                format!("Unexpected response shape from {}", request.url),
                e,
            )
        })
    }

    // ============================================
    // Foundational reads (always propagate)
    // ============================================

    pub async fn tick_info(&self) -> AppResult<TickInfo> {
        let resp: TickInfoResponse = self.fetch_as(ApiRequest::get(self.rpc(PATH_TICK_INFO))).await?;
        Ok(resp.tick_info)
    }

    pub async fn balance(&self, identity: &str) -> AppResult<Balance> {
        let identity = require_identifier(identity, "identity")?;
        let resp: BalanceResponse = self
            .fetch_as(ApiRequest::get(self.rpc(&path_balance(identity))))
            .await?;
        Ok(resp.balance)
    }

    pub async fn owned_assets(&self, identity: &str) -> AppResult<Vec<OwnedAsset>> {
        let identity = require_identifier(identity, "identity")?;
        let resp: OwnedAssetsResponse = self
            .fetch_as(ApiRequest::get(self.rpc(&path_owned_assets(identity))))
            .await?;
        Ok(resp.owned_assets)
    }

    pub async fn network_status(&self) -> AppResult<NetworkStatus> {
        self.fetch_as(ApiRequest::get(self.rpc(PATH_STATUS))).await
    }

    // ============================================
    // Transactions
    // ============================================

    /// Approved transactions of one tick, settlement flag merged in
    pub async fn tick_transactions(&self, tick: u64) -> AppResult<Vec<Transaction>> {
        if tick == 0 {
            return Err(AppError::missing_identifier("tick"));
        }
        let resp: TickTransactionsResponse = self
            .fetch_as(ApiRequest::get(self.rpc(&path_tick_transactions(tick))))
            .await?;
        Ok(resp.transactions.into_iter().map(Transaction::from).collect())
    }

    pub async fn identity_transfers(&self, identity: &str, range: TickRange) -> AppResult<Vec<Transaction>> {
        let identity = require_identifier(identity, "identity")?;
        if range.is_empty() {
            return Err(AppError::invalid_argument(format!(
                "tick range {}..={} is empty",
                range.start, range.end
            )));
        }
        let resp: IdentityTransfersResponse = self
            .fetch_as(ApiRequest::get(
                self.rpc(&path_identity_transfers(identity, range.start, range.end)),
            ))
            .await?;
        Ok(resp
            .transactions
            .into_iter()
            .flat_map(|group| group.transactions)
            .map(Transaction::from)
            .collect())
    }

    // ============================================
    // Hashes / quorum
    // ============================================

    pub async fn chain_hash(&self, tick: u64) -> AppResult<HashDigest> {
        if tick == 0 {
            return Err(AppError::missing_identifier("tick"));
        }
        self.fetch_as(ApiRequest::get(self.rpc(&path_chain_hash(tick)))).await
    }

    pub async fn store_hash(&self, tick: u64) -> AppResult<HashDigest> {
        if tick == 0 {
            return Err(AppError::missing_identifier("tick"));
        }
        self.fetch_as(ApiRequest::get(self.rpc(&path_store_hash(tick)))).await
    }

    pub async fn quorum_tick_data(&self, tick: u64) -> AppResult<QuorumTickData> {
        if tick == 0 {
            return Err(AppError::missing_identifier("tick"));
        }
        let resp: QuorumTickResponse = self
            .fetch_as(ApiRequest::get(self.rpc(&path_quorum_tick_data(tick))))
            .await?;
        Ok(resp.quorum_tick_data)
    }

    // ============================================
    // POST reads
    // ============================================

    /// Read-only contract call; identical queries share a cache entry
    pub async fn query_smart_contract(&self, query: &SmartContractQuery) -> AppResult<SmartContractResponse> {
        if query.contract_index == 0 {
            return Err(AppError::missing_identifier("contractIndex"));
        }
        let body = serde_json::to_value(query)?;
        self.fetch_as(ApiRequest::post(self.rpc(PATH_QUERY_SMART_CONTRACT), body))
            .await
    }

    /// Event decoding on the auxiliary service, never cached
    pub async fn decode_event(&self, request: &EventDecodeRequest) -> AppResult<serde_json::Value> {
        require_identifier(&request.event_data, "eventData")?;
        let body = serde_json::to_value(request)?;
        let url = format!("{}{}", self.events_url, PATH_DECODE_EVENTS);
        self.gateway
            .fetch(&ApiRequest::post(url, body).bypass_cache())
            .await
    }
}
