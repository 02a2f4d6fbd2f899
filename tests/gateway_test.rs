//! Request pipeline, analytics and HTTP API over a scripted transport

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tower::ServiceExt;

use qubic_pulse::api::{create_router, AppState};
use qubic_pulse::models::types::{EventDecodeRequest, SmartContractQuery};
use qubic_pulse::{
    AnalyticsService, ApiRequest, AppError, AppResult, Degrade, EndpointClient, ErrorCode, PulseConfig,
    RpcGateway, TickInfo, TickPoller, Transport,
};

// ============================================
// Scripted transport
// ============================================

type Responder = dyn Fn(&ApiRequest, usize) -> AppResult<Value> + Send + Sync;

/// Records every call (url, virtual time) and answers via `responder`;
/// the second argument is the 1-based call number.
struct MockTransport {
    responder: Box<Responder>,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
    latency: Duration,
}

impl MockTransport {
    fn new<F>(responder: F) -> (Self, Arc<Mutex<Vec<(String, Instant)>>>)
    where
        F: Fn(&ApiRequest, usize) -> AppResult<Value> + Send + Sync + 'static,
    {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mock = Self {
            responder: Box::new(responder),
            calls: calls.clone(),
            latency: Duration::ZERO,
        };
        (mock, calls)
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> AppResult<Value> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((request.url.clone(), Instant::now()));
            calls.len()
        };
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.responder)(request, n)
    }
}

fn config() -> PulseConfig {
    let mut cfg = PulseConfig::builtin();
    cfg.rpc_url = "http://ledger.test".to_string();
    cfg.events_url = "http://events.test".to_string();
    cfg.analytics.display_divisor = 1;
    cfg
}

fn client_with<F>(responder: F) -> (Arc<EndpointClient<MockTransport>>, Arc<Mutex<Vec<(String, Instant)>>>)
where
    F: Fn(&ApiRequest, usize) -> AppResult<Value> + Send + Sync + 'static,
{
    slow_client_with(Duration::ZERO, responder)
}

/// Same as `client_with`, each transport call taking `latency` of virtual time
fn slow_client_with<F>(
    latency: Duration,
    responder: F,
) -> (Arc<EndpointClient<MockTransport>>, Arc<Mutex<Vec<(String, Instant)>>>)
where
    F: Fn(&ApiRequest, usize) -> AppResult<Value> + Send + Sync + 'static,
{
    let cfg = config();
    let (mock, calls) = MockTransport::new(responder);
    let gateway = Arc::new(RpcGateway::new(mock.with_latency(latency), &cfg));
    let client = Arc::new(EndpointClient::new(gateway, &cfg.rpc_url, &cfg.events_url));
    (client, calls)
}

fn call_count(calls: &Arc<Mutex<Vec<(String, Instant)>>>) -> usize {
    calls.lock().unwrap().len()
}

fn tick_info_payload() -> Value {
    json!({"tickInfo": {"tick": 5000, "duration": 1, "epoch": 150, "initialTick": 4000}})
}

fn tick_txs(txs: &[(&str, &str, u64)], tick: u64) -> Value {
    let records: Vec<Value> = txs
        .iter()
        .map(|(src, dst, amount)| {
            json!({
                "transaction": {
                    "sourceId": src,
                    "destId": dst,
                    "amount": amount.to_string(),
                    "tickNumber": tick
                },
                "moneyFlew": true
            })
        })
        .collect();
    json!({ "transactions": records })
}

// ============================================
// Cache
// ============================================

#[tokio::test(start_paused = true)]
async fn test_cached_read_hits_network_once() {
    let (client, calls) = client_with(|_, _| Ok(tick_info_payload()));

    let first = client.tick_info().await.unwrap();
    let second = client.tick_info().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.tick, 5000);
    assert_eq!(call_count(&calls), 1);

    let stats = client.gateway().cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_identical_reads_share_one_call() {
    let (client, calls) = slow_client_with(Duration::from_millis(50), |_, _| Ok(tick_info_payload()));

    let (a, b, c) = tokio::join!(client.tick_info(), client.tick_info(), client.tick_info());
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(call_count(&calls), 1);
    assert_eq!(client.gateway().dispatched(), 1);

    // all three missed up front; the two queued duplicates were answered on their turn
    let stats = client.gateway().cache_stats();
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hits, 2);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_read_still_fills_cache() {
    let (client, calls) = slow_client_with(Duration::from_millis(200), |_, _| Ok(tick_info_payload()));

    let caller = {
        let client = client.clone();
        tokio::spawn(async move { client.tick_info().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(call_count(&calls), 1);
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());

    tokio::time::sleep(Duration::from_secs(1)).await;

    let info = client.tick_info().await.unwrap();
    assert_eq!(info.tick, 5000);
    assert_eq!(call_count(&calls), 1);
    assert_eq!(client.gateway().dispatched(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_is_refetched() {
    let (client, calls) = client_with(|_, _| Ok(tick_info_payload()));

    client.tick_info().await.unwrap();
    tokio::time::advance(Duration::from_secs(16)).await;
    client.tick_info().await.unwrap();

    assert_eq!(call_count(&calls), 2);
}

#[tokio::test(start_paused = true)]
async fn test_identical_contract_queries_share_cache_but_events_do_not() {
    let (client, calls) = client_with(|req, _| {
        if req.url.starts_with("http://events.test") {
            Ok(json!({"decoded": true}))
        } else {
            Ok(json!({"responseData": "AAAA"}))
        }
    });

    let query = SmartContractQuery {
        contract_index: 1,
        input_type: 1,
        input_size: 0,
        request_data: String::new(),
    };
    client.query_smart_contract(&query).await.unwrap();
    client.query_smart_contract(&query).await.unwrap();
    assert_eq!(call_count(&calls), 1);

    let event = EventDecodeRequest {
        tick_number: 4900,
        event_type: 0,
        event_data: "AQID".to_string(),
    };
    client.decode_event(&event).await.unwrap();
    client.decode_event(&event).await.unwrap();
    assert_eq!(call_count(&calls), 3);
}

// ============================================
// Validation / errors
// ============================================

#[tokio::test(start_paused = true)]
async fn test_invalid_input_never_reaches_transport() {
    let (client, calls) = client_with(|_, _| Ok(json!({})));

    let err = client.balance("   ").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingIdentifier);

    let err = client.tick_transactions(0).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingIdentifier);

    assert_eq!(call_count(&calls), 0);
    assert_eq!(client.gateway().dispatched(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_upstream_error_keeps_status_and_body() {
    let (client, _) = client_with(|_, _| Err(AppError::upstream(500, "internal boom")));

    let err = client.balance("WALLETA").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RpcUpstream);
    assert_eq!(err.upstream_status, Some(500));
    assert_eq!(err.message, "internal boom");
}

#[tokio::test(start_paused = true)]
async fn test_shape_mismatch_is_invalid_response() {
    let (client, _) = client_with(|_, _| Ok(json!({"unexpected": 1})));

    let err = client.tick_info().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RpcInvalidResponse);
}

// ============================================
// 429 handling
// ============================================

#[tokio::test(start_paused = true)]
async fn test_rate_limit_retries_once_after_cooldown() {
    let (client, calls) = client_with(|_, n| {
        if n == 1 {
            Err(AppError::rate_limited())
        } else {
            Ok(tick_info_payload())
        }
    });

    let info = client.tick_info().await.unwrap();
    assert_eq!(info.tick, 5000);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].1 - calls[0].1 >= config().rate_limit_cooldown);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_rate_limit_is_surfaced() {
    let (client, calls) = client_with(|_, _| Err(AppError::rate_limited()));

    let err = client.tick_info().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RpcRateLimited);
    assert_eq!(err.upstream_status, Some(429));
    assert_eq!(call_count(&calls), 2);
}

// ============================================
// Serial queue
// ============================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_reads_are_spaced_in_submission_order() {
    let (client, calls) = client_with(|req, _| {
        let id = req.url.rsplit('/').next().unwrap_or_default().to_string();
        Ok(json!({"balance": {"id": id, "balance": "1000"}}))
    });

    let (a, b, c) = tokio::join!(
        client.balance("WALLETA"),
        client.balance("WALLETB"),
        client.balance("WALLETC"),
    );
    assert_eq!(a.unwrap().id, "WALLETA");
    assert_eq!(b.unwrap().id, "WALLETB");
    assert_eq!(c.unwrap().id, "WALLETC");

    let calls = calls.lock().unwrap();
    let urls: Vec<&str> = calls.iter().map(|(u, _)| u.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "http://ledger.test/v1/balances/WALLETA",
            "http://ledger.test/v1/balances/WALLETB",
            "http://ledger.test/v1/balances/WALLETC",
        ]
    );
    let min = config().min_interval;
    for pair in calls.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= min);
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_request_does_not_block_the_next() {
    let (client, _) = client_with(|req, _| {
        if req.url.ends_with("/BROKEN") {
            Err(AppError::upstream(500, "nope"))
        } else {
            Ok(json!({"balance": {"id": "GOOD", "balance": "7"}}))
        }
    });

    let (bad, good) = tokio::join!(client.balance("BROKEN"), client.balance("GOOD"));
    assert!(bad.is_err());
    assert_eq!(good.unwrap().balance, alloy_primitives::U256::from(7));
}

// ============================================
// Analytics over the pipeline
// ============================================

fn ledger_with_whales(req: &ApiRequest, _: usize) -> AppResult<Value> {
    if req.url.contains("/v2/ticks/4900/") {
        Ok(tick_txs(&[("A", "B", 500), ("B", "C", 300)], 4900))
    } else if req.url.contains("/v2/ticks/4899/") {
        Err(AppError::upstream(404, "tick not found"))
    } else if req.url.contains("/v2/ticks/") {
        Ok(json!({"transactions": []}))
    } else {
        Ok(tick_info_payload())
    }
}

#[tokio::test(start_paused = true)]
async fn test_whale_activity_over_safe_window() {
    let (client, calls) = client_with(ledger_with_whales);
    let analytics = AnalyticsService::new(client, config().analytics);

    let whales = analytics.whale_activity(5000, 2, 6).await.unwrap();
    assert_eq!(whales.len(), 3);
    assert_eq!(whales[0].label, "Whale #1");
    assert_eq!(whales[0].volume, 800.0);

    // 4899 answered 404 and counted as empty
    let urls: Vec<String> = calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].contains("/v2/ticks/4899/"));
    assert!(urls[1].contains("/v2/ticks/4900/"));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_tick_is_not_ready() {
    let (client, calls) = client_with(ledger_with_whales);
    let analytics = AnalyticsService::new(client, config().analytics);

    let err = analytics.whale_activity(0, 10, 6).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TickNotReady);

    let err = analytics.whale_activity(5000, 0, 6).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);

    assert_eq!(call_count(&calls), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failing_source_degrades_to_empty() {
    let (client, _) = client_with(|_, _| Err(AppError::upstream(503, "maintenance")));
    let analytics = AnalyticsService::new(client, config().analytics);

    let result = analytics.trade_pressure(5000, 3).await;
    assert!(result.is_err());

    let (pressure, degraded) = result.degrade_flagged("pressure");
    assert!(degraded);
    assert_eq!(pressure.buys + pressure.sells + pressure.neutral, 0);

    let alerts = analytics
        .whale_alerts(5000, 3, &analytics.alert_policy())
        .await
        .degrade("alerts");
    assert!(alerts.is_empty());
}

// ============================================
// HTTP API
// ============================================

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn app_with<F>(responder: F, tick: u64) -> axum::Router
where
    F: Fn(&ApiRequest, usize) -> AppResult<Value> + Send + Sync + 'static,
{
    let (client, _) = client_with(responder);
    let analytics = Arc::new(AnalyticsService::new(client, config().analytics));
    let (tx, ticks) = TickPoller::channel();
    if tick > 0 {
        tx.send(TickInfo {
            tick,
            epoch: 150,
            ..Default::default()
        })
        .unwrap();
    }
    create_router(Arc::new(AppState::new(analytics, ticks)))
}

#[tokio::test(start_paused = true)]
async fn test_api_whales_endpoint() {
    let app = app_with(ledger_with_whales, 5000);

    let (status, body) = get_json(app, "/v1/whales?window=2&top=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["degraded"], false);

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["label"], "Whale #1");
}

#[tokio::test(start_paused = true)]
async fn test_api_widget_degrades_instead_of_failing() {
    let app = app_with(|_, _| Err(AppError::upstream(500, "down")), 5000);

    let (status, body) = get_json(app, "/v1/alerts?window=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], true);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_api_tick_not_ready_before_first_poll() {
    let app = app_with(ledger_with_whales, 0);

    let (status, body) = get_json(app, "/v1/tick").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "TICK_NOT_READY");
}

#[tokio::test(start_paused = true)]
async fn test_api_balance_propagates_upstream_errors() {
    let app = app_with(|_, _| Err(AppError::upstream(404, "unknown identity")), 5000);

    let (status, body) = get_json(app, "/v1/balances/NOBODY").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "RPC_UPSTREAM");
    assert_eq!(body["error"]["upstream_status"], 404);
}

#[tokio::test(start_paused = true)]
async fn test_api_health_reports_tick() {
    let app = app_with(ledger_with_whales, 5000);

    let (status, body) = get_json(app, "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["current_tick"], 5000);
}
