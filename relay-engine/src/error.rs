use thiserror::Error;

use crate::signer::SignerId;

/*----- */
// Chain client errors
/*----- */
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain reported nonce mismatch for {signer}, submitted nonce {submitted}")]
    NonceConflict { signer: SignerId, submitted: u64 },

    #[error("chain rejected call: {0}")]
    Rejected(String),

    #[error("chain transport error: {0}")]
    Transport(String),
}

/*----- */
// Payload build errors
/*----- */
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid decimal amount: {0}")]
    Amount(#[from] AmountError),

    #[error("failed to encode call payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/*----- */
// Amount parse errors
/*----- */
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty decimal string")]
    Empty,

    #[error("invalid character in decimal string: {0}")]
    InvalidCharacter(char),

    #[error("decimal amount overflows the scaled representation")]
    Overflow,
}
