use std::collections::HashMap;

use parking_lot::Mutex;

use crate::signer::SignerId;

/*----- */
// Nonce tracker
/*----- */
/// Per-signer strictly increasing transaction sequence numbers. This is the
/// only shared mutable state in the relay; everything else communicates by
/// message handoff.
#[derive(Debug, Default)]
pub struct NonceTracker {
    counters: Mutex<HashMap<SignerId, u64>>,
}

impl NonceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed counters for signers whose chain nonce is already known, e.g.
    /// queried once at startup.
    pub fn with_initial<I>(initial: I) -> Self
    where
        I: IntoIterator<Item = (SignerId, u64)>,
    {
        Self {
            counters: Mutex::new(initial.into_iter().collect()),
        }
    }

    /// Return the current counter for `signer` and increment it. An unseen
    /// signer starts at 0.
    pub fn next(&self, signer: &SignerId) -> u64 {
        let mut counters = self.counters.lock();
        let counter = counters.entry(signer.clone()).or_insert(0);
        let nonce = *counter;
        *counter += 1;
        nonce
    }

    /// Force-set the counter after the chain's view diverged from ours, e.g.
    /// following a nonce-mismatch rejection.
    pub fn reset(&self, signer: &SignerId, value: u64) {
        self.counters.lock().insert(signer.clone(), value);
    }

    pub fn current(&self, signer: &SignerId) -> Option<u64> {
        self.counters.lock().get(signer).copied()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::NonceTracker;
    use crate::signer::SignerId;

    #[test]
    fn nonces_are_strictly_increasing_without_gaps() {
        let tracker = NonceTracker::new();
        let alice = SignerId::new("alice");

        for expected in 0..100 {
            assert_eq!(tracker.next(&alice), expected);
        }
    }

    #[test]
    fn signers_have_independent_sequences() {
        let tracker = NonceTracker::new();
        let alice = SignerId::new("alice");
        let bob = SignerId::new("bob");

        assert_eq!(tracker.next(&alice), 0);
        assert_eq!(tracker.next(&alice), 1);
        assert_eq!(tracker.next(&bob), 0);
        assert_eq!(tracker.next(&alice), 2);
        assert_eq!(tracker.next(&bob), 1);
    }

    #[test]
    fn initial_values_seed_the_counter() {
        let alice = SignerId::new("alice");
        let tracker = NonceTracker::with_initial([(alice.clone(), 41)]);

        assert_eq!(tracker.next(&alice), 41);
        assert_eq!(tracker.next(&alice), 42);
    }

    #[test]
    fn reset_overrides_the_counter() {
        let tracker = NonceTracker::new();
        let alice = SignerId::new("alice");

        assert_eq!(tracker.next(&alice), 0);
        assert_eq!(tracker.next(&alice), 1);

        tracker.reset(&alice, 7);
        assert_eq!(tracker.current(&alice), Some(7));
        assert_eq!(tracker.next(&alice), 7);
        assert_eq!(tracker.next(&alice), 8);
    }

    #[test]
    fn concurrent_callers_never_share_a_nonce() {
        let tracker = Arc::new(NonceTracker::new());
        let alice = SignerId::new("alice");

        let handles = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                let alice = alice.clone();
                std::thread::spawn(move || (0..100).map(|_| tracker.next(&alice)).collect::<Vec<_>>())
            })
            .collect::<Vec<_>>();

        let mut nonces = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        nonces.sort_unstable();
        let expected = (0..800).collect::<Vec<u64>>();
        assert_eq!(nonces, expected);
    }
}
