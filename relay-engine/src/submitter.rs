use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use relay_data::{
    model::trade_event::TradeEvent,
    shared::subscription_models::Symbol,
};

use crate::{
    amount::{ScaledAmount, UnitScale},
    chain::{CallPayload, CallStatus, CallStatusStream, ChainClient, OrderCall, OrderSide},
    error::{ChainError, PayloadError},
    nonce::NonceTracker,
    signer::{SignerAccount, SignerId},
};

/*----- */
// Submitter config
/*----- */
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    pub unit: UnitScale,
    pub max_in_flight: usize,
    pub submission_timeout: Duration,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            unit: UnitScale::new(12),
            max_in_flight: 512,
            submission_timeout: Duration::from_secs(60),
        }
    }
}

/*----- */
// Submission request
/*----- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Created,
    Dispatched,
    Included,
    Rejected,
    TimedOut,
}

#[derive(Debug)]
pub struct SubmissionRequest {
    pub id: Uuid,
    pub signer: SignerId,
    pub nonce: u64,
    pub payload: CallPayload,
    pub submitted_at: DateTime<Utc>,
    pub state: SubmissionState,
}

impl SubmissionRequest {
    fn new(signer: SignerId, nonce: u64, payload: CallPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            signer,
            nonce,
            payload,
            submitted_at: Utc::now(),
            state: SubmissionState::Created,
        }
    }
}

/*----- */
// Signer lane
/*----- */
// One per demo account. A single drain task per lane takes the nonce and
// awaits submission initiation, so same-signer submissions reach the chain in
// nonce order and no nonce is handed out while a resync is in progress.
#[derive(Debug)]
struct SignerLane {
    id: SignerId,
    jobs: mpsc::UnboundedSender<LaneJob>,
}

#[derive(Debug)]
struct LaneJob {
    symbol: Symbol,
    payload: CallPayload,
}

impl SignerLane {
    fn spawn<Chain>(
        account: SignerAccount,
        client: Arc<Chain>,
        nonces: Arc<NonceTracker>,
        deadline: Duration,
        in_flight: Arc<AtomicUsize>,
    ) -> Self
    where
        Chain: ChainClient + 'static,
    {
        let (jobs, job_rx) = mpsc::unbounded_channel();
        let id = account.id.clone();
        tokio::spawn(run_lane(client, nonces, account, job_rx, deadline, in_flight));
        Self { id, jobs }
    }
}

/*----- */
// Order submitter
/*----- */
/// Turns normalized trade events into dispatched chain submissions. `handle`
/// returns once the payload is built and queued on the signer's lane; a slow
/// or stalled chain connection never stalls the price feed.
#[derive(Debug)]
pub struct OrderSubmitter {
    maker: SignerLane,
    taker: SignerLane,
    config: SubmitterConfig,
    in_flight: Arc<AtomicUsize>,
    dropped: AtomicU64,
}

impl OrderSubmitter {
    pub fn new<Chain>(
        client: Arc<Chain>,
        nonces: Arc<NonceTracker>,
        maker: SignerAccount,
        taker: SignerAccount,
        config: SubmitterConfig,
    ) -> Self
    where
        Chain: ChainClient + 'static,
    {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let maker = SignerLane::spawn(
            maker,
            Arc::clone(&client),
            Arc::clone(&nonces),
            config.submission_timeout,
            Arc::clone(&in_flight),
        );
        let taker = SignerLane::spawn(
            taker,
            client,
            nonces,
            config.submission_timeout,
            Arc::clone(&in_flight),
        );

        Self {
            maker,
            taker,
            config,
            in_flight,
            dropped: AtomicU64::new(0),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    pub async fn handle(&self, event: TradeEvent) {
        // Reserve the in-flight slot with a single compare-and-swap so
        // concurrent callers cannot all pass the check right at the bound.
        // The reservation also runs before nonce assignment: a dropped event
        // must not consume a nonce and leave a gap the chain waits on forever.
        let max_in_flight = self.config.max_in_flight;
        let reserved = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |in_flight| {
                (in_flight < max_in_flight).then_some(in_flight + 1)
            });
        if reserved.is_err() {
            let dropped_total = self.dropped.fetch_add(1, Ordering::SeqCst) + 1;
            warn!(
                symbol = %event.symbol,
                max_in_flight,
                dropped_total,
                action = "dropping event at intake",
                message = "in-flight submission bound exceeded",
            );
            return;
        }

        let lane = if event.is_maker {
            &self.maker
        } else {
            &self.taker
        };

        let payload = match build_order_payload(&event, self.config.unit) {
            Ok(payload) => payload,
            Err(error) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                warn!(
                    symbol = %event.symbol,
                    error = %error,
                    action = "dropping event",
                    message = "failed to build call payload from trade event",
                );
                return;
            }
        };

        debug!(
            signer = %lane.id,
            symbol = %event.symbol,
            action = "queueing order on signer lane",
        );

        let job = LaneJob {
            symbol: event.symbol,
            payload,
        };
        if lane.jobs.send(job).is_err() {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            error!(
                signer = %lane.id,
                message = "signer lane task is gone, dropping order",
            );
        }
    }
}

fn build_order_payload(event: &TradeEvent, unit: UnitScale) -> Result<CallPayload, PayloadError> {
    let price = ScaledAmount::from_decimal_str(&event.price, unit)?;
    let quantity = ScaledAmount::from_decimal_str(&event.quantity, unit)?;

    // The maker lane mirrors the resting side of the upstream trade
    let side = if event.is_maker {
        OrderSide::Sell
    } else {
        OrderSide::Buy
    };

    let call = OrderCall {
        market: event.symbol.as_str().to_owned(),
        side,
        price,
        quantity,
    };

    Ok(call.into_payload()?)
}

/*----- */
// Lane drain task - one per signer
/*----- */
// Takes the nonce and initiates the chain submission for one job at a time, so
// submission initiation order always matches nonce order for this signer. Only
// the status watch runs concurrently.
async fn run_lane<Chain>(
    client: Arc<Chain>,
    nonces: Arc<NonceTracker>,
    account: SignerAccount,
    mut jobs: mpsc::UnboundedReceiver<LaneJob>,
    deadline: Duration,
    in_flight: Arc<AtomicUsize>,
) where
    Chain: ChainClient + 'static,
{
    while let Some(job) = jobs.recv().await {
        let nonce = nonces.next(&account.id);
        let mut request = SubmissionRequest::new(account.id.clone(), nonce, job.payload);

        info!(
            request_id = %request.id,
            signer = %request.signer,
            nonce = request.nonce,
            symbol = %job.symbol,
            action = "created submission request",
        );

        request.state = SubmissionState::Dispatched;
        debug!(
            request_id = %request.id,
            signer = %request.signer,
            nonce = request.nonce,
            state = ?request.state,
            action = "dispatching signed call",
        );

        let submitted = timeout(
            deadline,
            client.submit_signed_call(&account, request.nonce, request.payload.clone()),
        )
        .await;

        match submitted {
            Ok(Ok(statuses)) => {
                // Status watching runs on its own task; the lane moves on to
                // the next nonce as soon as the chain accepted the call
                tokio::spawn(watch_submission(
                    statuses,
                    request,
                    deadline,
                    Arc::clone(&in_flight),
                ));
                continue;
            }

            Ok(Err(ChainError::NonceConflict { signer, submitted })) => {
                request.state = SubmissionState::Rejected;
                warn!(
                    request_id = %request.id,
                    signer = %signer,
                    submitted_nonce = submitted,
                    state = ?request.state,
                    action = "resyncing nonce from chain",
                    message = "chain rejected submission with a nonce mismatch",
                );

                // The lane processes no further job until the local counter
                // matches the chain again
                match client.query_nonce(&account.id).await {
                    Ok(chain_nonce) => {
                        nonces.reset(&account.id, chain_nonce);
                        info!(
                            signer = %account.id,
                            chain_nonce,
                            action = "reset local nonce counter",
                        );
                    }
                    Err(error) => {
                        error!(
                            signer = %account.id,
                            error = %error,
                            message = "failed to query authoritative nonce after conflict",
                        );
                    }
                }
            }

            Ok(Err(error)) => {
                request.state = SubmissionState::Rejected;
                warn!(
                    request_id = %request.id,
                    signer = %request.signer,
                    nonce = request.nonce,
                    error = %error,
                    state = ?request.state,
                    message = "chain rejected submission",
                );
            }

            Err(_elapsed) => {
                request.state = SubmissionState::TimedOut;
                warn!(
                    request_id = %request.id,
                    signer = %request.signer,
                    nonce = request.nonce,
                    deadline_ms = deadline.as_millis() as u64,
                    state = ?request.state,
                    message = "submission initiation timed out",
                );
            }
        }

        in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn watch_submission(
    mut statuses: CallStatusStream,
    mut request: SubmissionRequest,
    deadline: Duration,
    in_flight: Arc<AtomicUsize>,
) {
    match timeout(deadline, next_terminal_status(&mut statuses, &request)).await {
        Ok(Ok(status)) => {
            request.state = SubmissionState::Included;
            info!(
                request_id = %request.id,
                signer = %request.signer,
                nonce = request.nonce,
                status = ?status,
                state = ?request.state,
                message = "submission included in block",
            );
        }

        Ok(Err(error)) => {
            request.state = SubmissionState::Rejected;
            warn!(
                request_id = %request.id,
                signer = %request.signer,
                nonce = request.nonce,
                error = %error,
                state = ?request.state,
                message = "chain rejected submission",
            );
        }

        Err(_elapsed) => {
            request.state = SubmissionState::TimedOut;
            // The call may still land on chain, only the local watch gave up.
            // Operators reconcile timed out submissions manually.
            warn!(
                request_id = %request.id,
                signer = %request.signer,
                nonce = request.nonce,
                deadline_ms = deadline.as_millis() as u64,
                state = ?request.state,
                message = "submission status watch timed out",
            );
        }
    }

    in_flight.fetch_sub(1, Ordering::SeqCst);
}

async fn next_terminal_status(
    statuses: &mut CallStatusStream,
    request: &SubmissionRequest,
) -> Result<CallStatus, ChainError> {
    while let Some(status) = statuses.next().await {
        match status {
            CallStatus::InBlock(_) | CallStatus::Finalized(_) => return Ok(status),
            CallStatus::Invalid(reason) => return Err(ChainError::Rejected(reason)),
            CallStatus::Ready | CallStatus::Broadcast => {
                debug!(
                    request_id = %request.id,
                    status = ?status,
                    "submission status update",
                );
            }
        }
    }

    // Stream ended with no terminal status: the chain dropped the call
    Err(ChainError::Rejected(
        "status stream ended before a terminal status".to_owned(),
    ))
}
