use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::{
    amount::ScaledAmount,
    error::ChainError,
    signer::{SignerAccount, SignerId},
};

/*----- */
// Call payload
/*----- */
/// Opaque encoded call instruction. The chain client owns the final wire
/// encoding; this boundary only carries bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPayload(pub Vec<u8>);

/*----- */
// Order call
/*----- */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCall {
    pub market: String,
    pub side: OrderSide,
    pub price: ScaledAmount,
    pub quantity: ScaledAmount,
}

impl OrderCall {
    pub fn into_payload(self) -> Result<CallPayload, serde_json::Error> {
        serde_json::to_vec(&self).map(CallPayload)
    }
}

/*----- */
// Call status
/*----- */
/// Status updates reported by the chain for one submitted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Ready,
    Broadcast,
    InBlock(String),
    Finalized(String),
    Invalid(String),
}

impl CallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::InBlock(_) | CallStatus::Finalized(_) | CallStatus::Invalid(_)
        )
    }
}

pub type CallStatusStream = BoxStream<'static, CallStatus>;

/*----- */
// Chain client capability
/*----- */
/// Boundary to the vendored chain library. Submission, signing and the RPC
/// wire format all live behind this trait; the relay never reimplements them.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Sign and submit a call for (signer, nonce), returning the chain's
    /// status stream for it.
    async fn submit_signed_call(
        &self,
        signer: &SignerAccount,
        nonce: u64,
        payload: CallPayload,
    ) -> Result<CallStatusStream, ChainError>;

    /// The chain's authoritative next nonce for an account.
    async fn query_nonce(&self, signer: &SignerId) -> Result<u64, ChainError>;
}
