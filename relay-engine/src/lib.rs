pub mod amount;
pub mod chain;
pub mod error;
pub mod nonce;
pub mod signer;
pub mod submitter;
