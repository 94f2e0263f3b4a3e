//! Axum REST API handlers.
//!
//! One engine instance sits behind a [`Mutex`]: every mutating request holds
//! the lock for the whole engine call, so requests apply one at a time and
//! each is all-or-nothing. Oracle readings are fetched before the lock is
//! taken and are never reused across requests.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use reach_token::{
    Address, ContractInfo, CurveParameters, Error as EngineError, FixedPoint, Host, MemoryHost,
    OracleReading, Proposal, ProposalStatus, PurchaseOrder, PurchaseReceipt, ReachToken,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::sync::{mpsc::UnboundedSender, Mutex};
use tracing::{error, warn};

use crate::db;
use crate::errors::Result;
use crate::events::{EventRecord, NewEvent};
use crate::oracle::OracleSource;
use crate::recorder::EventBatch;

pub type Engine = ReachToken<MemoryHost>;

pub struct ApiState {
    pub pool: SqlitePool,
    pub engine: Mutex<Engine>,
    pub oracle: OracleSource,
    pub events_tx: UnboundedSender<EventBatch>,
}

impl ApiState {
    /// Hand everything the engine emitted to the recorder. Runs after the
    /// engine has committed, so failures are logged and never surface to the
    /// caller.
    fn publish(&self, engine: &mut Engine, timestamp: u64) {
        let batch: EventBatch = engine
            .events_mut()
            .drain()
            .iter()
            .filter_map(|event| match NewEvent::from_engine(event, timestamp as i64) {
                Ok(row) => Some(row),
                Err(e) => {
                    error!(topic = event.topic(), "Event could not be encoded, dropped: {e}");
                    None
                }
            })
            .collect();
        if !batch.is_empty() && self.events_tx.send(batch).is_err() {
            warn!("Event recorder is gone; events dropped");
        }
    }
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(get_info))
        .route("/price", get(get_price))
        .route("/quote", get(get_quote))
        .route("/purchase", post(purchase))
        .route("/parameters", put(update_parameters))
        .route("/pause", post(pause))
        .route("/unpause", post(unpause))
        .route("/balances/:wallet", put(set_balance))
        .route("/proposals", post(create_proposal))
        .route("/proposals/:id", get(get_proposal))
        .route("/proposals/:id/votes", post(vote))
        .route("/proposals/:id/votes/:wallet", get(has_voted))
        .route("/proposals/:id/execute", post(execute_proposal))
        .route("/proposals/:id/events", get(get_proposal_events))
        .route("/events", get(get_all_events))
        .with_state(state)
}

fn now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CallerRequest {
    pub caller: Address,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub amount: FixedPoint,
}

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub buyer: Address,
    pub token_amount: FixedPoint,
    pub payment_sent: FixedPoint,
    #[serde(default)]
    pub min_tokens_out: FixedPoint,
}

#[derive(Deserialize)]
pub struct ParametersRequest {
    pub caller: Address,
    pub params: CurveParameters,
}

#[derive(Deserialize)]
pub struct BalanceRequest {
    pub caller: Address,
    pub amount: FixedPoint,
}

#[derive(Deserialize)]
pub struct CreateProposalRequest {
    pub caller: Address,
    pub description: String,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub wallet: Address,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct InfoResponse {
    #[serde(flatten)]
    pub info: ContractInfo,
    pub oracle: OracleReading,
}

#[derive(Serialize)]
pub struct PriceResponse {
    pub curve_price: FixedPoint,
    pub current_price: FixedPoint,
    pub tokens_sold: FixedPoint,
    pub oracle: OracleReading,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub amount: FixedPoint,
    pub payment_required: FixedPoint,
    pub oracle: OracleReading,
}

#[derive(Serialize)]
pub struct PausedResponse {
    pub paused: bool,
}

#[derive(Serialize)]
pub struct ProposalCreatedResponse {
    pub id: u64,
}

#[derive(Serialize)]
pub struct ProposalResponse {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub status: ProposalStatus,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub proposal_id: u64,
    pub vote_count: u64,
}

#[derive(Serialize)]
pub struct HasVotedResponse {
    pub proposal_id: u64,
    pub wallet: Address,
    pub has_voted: bool,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub proposal_id: u64,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

// ─────────────────────────────────────────────────────────
// Handlers — pricing
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /info`
pub async fn get_info(State(state): State<Arc<ApiState>>) -> Result<Json<InfoResponse>> {
    let reading = state.oracle.fetch_reading().await?;
    let engine = state.engine.lock().await;
    Ok(Json(InfoResponse {
        info: engine.contract_info(&reading)?,
        oracle: reading,
    }))
}

/// `GET /price`
pub async fn get_price(State(state): State<Arc<ApiState>>) -> Result<Json<PriceResponse>> {
    let reading = state.oracle.fetch_reading().await?;
    let engine = state.engine.lock().await;
    Ok(Json(PriceResponse {
        curve_price: engine.curve_price()?,
        current_price: engine.current_price(&reading)?,
        tokens_sold: engine.tokens_sold(),
        oracle: reading,
    }))
}

/// `GET /quote?amount=<tokens>`
///
/// Payment-currency cost of `amount` tokens at the current sale position.
pub async fn get_quote(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>> {
    let reading = state.oracle.fetch_reading().await?;
    let engine = state.engine.lock().await;
    Ok(Json(QuoteResponse {
        amount: query.amount,
        payment_required: engine.quote_payment(query.amount, &reading)?,
        oracle: reading,
    }))
}

/// `POST /purchase`
pub async fn purchase(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<PurchaseReceipt>> {
    let reading = state.oracle.fetch_reading().await?;
    let now = now();
    let mut engine = state.engine.lock().await;
    let order = PurchaseOrder {
        token_amount: req.token_amount,
        payment_sent: req.payment_sent,
        min_tokens_out: req.min_tokens_out,
    };
    let receipt = engine.buy_tokens(&req.buyer, order, &reading)?;
    state.publish(&mut engine, now);
    Ok(Json(receipt))
}

/// `PUT /parameters`
pub async fn update_parameters(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<ParametersRequest>,
) -> Result<Json<CurveParameters>> {
    let now = now();
    let mut engine = state.engine.lock().await;
    engine.update_price_parameters(&req.caller, req.params)?;
    state.publish(&mut engine, now);
    Ok(Json(*engine.parameters()))
}

// ─────────────────────────────────────────────────────────
// Handlers — host administration
// ─────────────────────────────────────────────────────────

/// `POST /pause`
pub async fn pause(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<PausedResponse>> {
    let now = now();
    let mut engine = state.engine.lock().await;
    engine.pause(&req.caller)?;
    state.publish(&mut engine, now);
    Ok(Json(PausedResponse { paused: true }))
}

/// `POST /unpause`
pub async fn unpause(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<PausedResponse>> {
    let now = now();
    let mut engine = state.engine.lock().await;
    engine.unpause(&req.caller)?;
    state.publish(&mut engine, now);
    Ok(Json(PausedResponse { paused: false }))
}

/// `PUT /balances/:wallet`
///
/// Owner-only stand-in for the token's transfer bookkeeping.
pub async fn set_balance(
    State(state): State<Arc<ApiState>>,
    Path(wallet): Path<String>,
    Json(req): Json<BalanceRequest>,
) -> Result<StatusCode> {
    let mut engine = state.engine.lock().await;
    if !engine.host().is_owner(&req.caller) {
        return Err(EngineError::Unauthorized.into());
    }
    engine.host_mut().set_balance(Address::new(wallet), req.amount);
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────
// Handlers — governance
// ─────────────────────────────────────────────────────────

/// `POST /proposals`
pub async fn create_proposal(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<CreateProposalRequest>,
) -> Result<(StatusCode, Json<ProposalCreatedResponse>)> {
    let now = now();
    let mut engine = state.engine.lock().await;
    let id = engine.create_proposal(&req.caller, &req.description, now)?;
    state.publish(&mut engine, now);
    Ok((StatusCode::CREATED, Json(ProposalCreatedResponse { id })))
}

/// `GET /proposals/:id`
pub async fn get_proposal(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<u64>,
) -> Result<Json<ProposalResponse>> {
    let engine = state.engine.lock().await;
    let proposal = engine.get_proposal(id)?;
    let status = proposal.status(now());
    Ok(Json(ProposalResponse { proposal, status }))
}

/// `POST /proposals/:id/votes`
pub async fn vote(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<u64>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    let now = now();
    let mut engine = state.engine.lock().await;
    let vote_count = engine.vote(&req.wallet, id, now)?;
    state.publish(&mut engine, now);
    Ok(Json(VoteResponse {
        proposal_id: id,
        vote_count,
    }))
}

/// `GET /proposals/:id/votes/:wallet`
pub async fn has_voted(
    State(state): State<Arc<ApiState>>,
    Path((id, wallet)): Path<(u64, String)>,
) -> Json<HasVotedResponse> {
    let wallet = Address::new(wallet);
    let engine = state.engine.lock().await;
    Json(HasVotedResponse {
        proposal_id: id,
        has_voted: engine.has_voted(id, &wallet),
        wallet,
    })
}

/// `POST /proposals/:id/execute`
pub async fn execute_proposal(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<u64>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<ProposalResponse>> {
    let now = now();
    let mut engine = state.engine.lock().await;
    engine.execute_proposal(&req.caller, id, now)?;
    state.publish(&mut engine, now);
    let proposal = engine.get_proposal(id)?;
    Ok(Json(ProposalResponse {
        status: proposal.status(now),
        proposal,
    }))
}

// ─────────────────────────────────────────────────────────
// Handlers — recorded events
// ─────────────────────────────────────────────────────────

/// `GET /proposals/:id/events`
pub async fn get_proposal_events(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<u64>,
) -> Result<Json<EventsResponse>> {
    let key = i64::try_from(id).map_err(|_| EngineError::NotFound)?;
    let events = db::get_events_for_proposal(&state.pool, key).await?;
    Ok(Json(EventsResponse {
        proposal_id: id,
        count: events.len(),
        events,
    }))
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

// ─────────────────────────────────────────────────────────
// Handler tests
// ─────────────────────────────────────────────────────────
