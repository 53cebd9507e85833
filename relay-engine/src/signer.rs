use std::fmt::Display;

use serde::{Deserialize, Serialize};

/*----- */
// Signer identity
/*----- */
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct SignerId(String);

impl SignerId {
    pub fn new<S>(id: S) -> Self
    where
        S: Into<String>,
    {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SignerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/*----- */
// Signer account
/*----- */
/// Key handle for one chain account, created once at startup and owned by this
/// process for its lifetime. The seed phrase is only ever handed to the chain
/// client, which owns key derivation and signing.
#[derive(Debug, Clone)]
pub struct SignerAccount {
    pub id: SignerId,
    seed_phrase: String,
}

impl SignerAccount {
    pub fn from_seed<S>(id: S, seed_phrase: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: SignerId::new(id),
            seed_phrase: seed_phrase.into(),
        }
    }

    pub fn seed_phrase(&self) -> &str {
        &self.seed_phrase
    }
}
