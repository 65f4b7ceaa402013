use crate::license::cache::{ContentCache, HashNamedCache, LicenseCache};
use crate::license::error::LicenseError;
use crate::license::verifier::{HttpVerifier, Verification, Verifier};
use crate::settings::LicenseSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a stored activation is trusted on later launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Any hash-named file proves activation. Works offline; revocation only
    /// takes effect once the file is deleted.
    HashNamed,
    /// The stored token is sent to the server on every launch. Revocation is
    /// immediate; launching requires network access.
    Content,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::HashNamed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Unlocked,
    Locked,
}

/// Locked-side states of the gate. Unlocking leaves this machine for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unverified,
    AwaitingToken,
    Verifying,
}

impl GateState {
    pub fn after_check(self, outcome: CheckOutcome) -> Option<GateState> {
        match outcome {
            CheckOutcome::Unlocked => None,
            CheckOutcome::Locked => Some(GateState::AwaitingToken),
        }
    }

    /// `None` means unlocked. Every failure returns to `AwaitingToken`.
    pub fn after_activation(self, result: &Result<(), LicenseError>) -> Option<GateState> {
        match result {
            Ok(()) => None,
            Err(_) => Some(GateState::AwaitingToken),
        }
    }
}

/// Combines a [`LicenseCache`] and a [`Verifier`] into one yes/no decision.
pub struct LicenseGate {
    policy: CachePolicy,
    cache: Box<dyn LicenseCache>,
    verifier: Box<dyn Verifier>,
}

impl LicenseGate {
    pub fn new(
        policy: CachePolicy,
        cache: Box<dyn LicenseCache>,
        verifier: Box<dyn Verifier>,
    ) -> Self {
        Self {
            policy,
            cache,
            verifier,
        }
    }

    pub fn from_settings(settings: &LicenseSettings) -> anyhow::Result<Self> {
        let verifier = HttpVerifier::new(
            settings.endpoint.clone(),
            settings.flavor,
            Duration::from_secs(settings.timeout_secs),
        )?;
        let cache: Box<dyn LicenseCache> = match settings.policy {
            CachePolicy::HashNamed => Box::new(HashNamedCache::new(
                &settings.cache_dir,
                settings.secret.clone(),
                settings.extension.clone(),
            )),
            CachePolicy::Content => Box::new(ContentCache::new(
                &settings.cache_dir,
                settings.content_file.clone(),
            )),
        };
        Ok(Self::new(settings.policy, cache, Box::new(verifier)))
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn check(&self) -> CheckOutcome {
        let candidates = self.cache.list_candidates();
        match self.policy {
            CachePolicy::HashNamed => {
                if candidates.iter().any(|c| self.cache.is_valid(c)) {
                    tracing::info!("license cache valid");
                    CheckOutcome::Unlocked
                } else {
                    tracing::info!(candidates = candidates.len(), "no valid license record");
                    CheckOutcome::Locked
                }
            }
            CachePolicy::Content => {
                let Some((name, token)) = candidates
                    .iter()
                    .filter(|c| self.cache.is_valid(c))
                    .find_map(|c| self.cache.read_token(c).map(|t| (c.clone(), t)))
                else {
                    return CheckOutcome::Locked;
                };
                match self.verifier.activate(&token) {
                    Verification::Verified => CheckOutcome::Unlocked,
                    Verification::Rejected => {
                        tracing::warn!("stored token rejected; removing {name}");
                        if let Err(e) = self.cache.remove(&name) {
                            tracing::error!("failed to remove rejected token: {e}");
                        }
                        CheckOutcome::Locked
                    }
                    Verification::NetworkError(e) => {
                        tracing::warn!("could not re-verify stored token: {e}");
                        CheckOutcome::Locked
                    }
                }
            }
        }
    }

    pub fn activate_and_store(&self, token: &str) -> Result<(), LicenseError> {
        self.activate_and_store_unless(token, || false)
    }

    /// Like [`activate_and_store`](Self::activate_and_store), but skips the
    /// cache write when `cancelled` reports true after verification.
    pub fn activate_and_store_unless(
        &self,
        token: &str,
        cancelled: impl Fn() -> bool,
    ) -> Result<(), LicenseError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(LicenseError::EmptyInput);
        }
        match self.verifier.activate(token) {
            Verification::Verified => {
                if cancelled() {
                    return Err(LicenseError::Cancelled);
                }
                self.cache.write(token)?;
                Ok(())
            }
            Verification::Rejected => Err(LicenseError::ServerRejected),
            Verification::NetworkError(e) => Err(LicenseError::Network(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    struct CountingVerifier {
        answer: Verification,
        calls: Arc<AtomicUsize>,
    }

    impl Verifier for CountingVerifier {
        fn activate(&self, _token: &str) -> Verification {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn gate(policy: CachePolicy, dir: &std::path::Path, answer: Verification) -> (LicenseGate, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache: Box<dyn LicenseCache> = match policy {
            CachePolicy::HashNamed => Box::new(HashNamedCache::new(dir, "s", "txt")),
            CachePolicy::Content => Box::new(ContentCache::new(dir, "api_token.txt")),
        };
        let verifier = CountingVerifier {
            answer,
            calls: calls.clone(),
        };
        (LicenseGate::new(policy, cache, Box::new(verifier)), calls)
    }

    #[test]
    fn empty_token_never_reaches_verifier() {
        let dir = tempdir().expect("tempdir");
        let (gate, calls) = gate(CachePolicy::HashNamed, dir.path(), Verification::Verified);
        assert!(matches!(gate.activate_and_store("   "), Err(LicenseError::EmptyInput)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn hash_named_check_makes_no_network_call() {
        let dir = tempdir().expect("tempdir");
        let (gate, calls) = gate(CachePolicy::HashNamed, dir.path(), Verification::Verified);
        gate.activate_and_store("tok").expect("activate");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.check(), CheckOutcome::Unlocked);
        assert_eq!(gate.check(), CheckOutcome::Unlocked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn content_policy_reverifies_and_drops_rejected_token() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("api_token.txt"), "revoked").expect("seed");
        let (gate, calls) = gate(CachePolicy::Content, dir.path(), Verification::Rejected);
        assert_eq!(gate.check(), CheckOutcome::Locked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!dir.path().join("api_token.txt").exists());
    }

    #[test]
    fn content_policy_keeps_token_on_network_error() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("api_token.txt"), "tok").expect("seed");
        let (gate, _) = gate(
            CachePolicy::Content,
            dir.path(),
            Verification::NetworkError("offline".into()),
        );
        assert_eq!(gate.check(), CheckOutcome::Locked);
        assert!(dir.path().join("api_token.txt").exists());
    }

    #[test]
    fn cancelled_activation_writes_nothing() {
        let dir = tempdir().expect("tempdir");
        let (gate, _) = gate(CachePolicy::HashNamed, dir.path(), Verification::Verified);
        let res = gate.activate_and_store_unless("tok", || true);
        assert!(matches!(res, Err(LicenseError::Cancelled)));
        assert_eq!(gate.check(), CheckOutcome::Locked);
    }

    #[test]
    fn gate_state_loops_on_failure() {
        let state = GateState::Verifying;
        assert_eq!(
            state.after_activation(&Err(LicenseError::ServerRejected)),
            Some(GateState::AwaitingToken)
        );
        assert_eq!(state.after_activation(&Ok(())), None);
        assert_eq!(
            GateState::Unverified.after_check(CheckOutcome::Locked),
            Some(GateState::AwaitingToken)
        );
    }
}
