//! Verification handshake coordinator
//!
//! Tracks which session each requester is currently verifying against and
//! drives the initiate/submit handshake. Bindings live in their own
//! concurrent map, independent of the code store's lock, and no map guard
//! is ever held across an await.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::codes::{new_session_id, CodeSource};
use crate::config::{MessagesConfig, VerificationConfig};
use crate::verify::traits::Authority;
use crate::verify::types::{InitiateError, Initiation, SubmitOutcome};

/// Drives the verification handshake for all requesters
pub struct Coordinator {
    bindings: DashMap<String, String>,
    authority: Arc<dyn Authority>,
    codes: Arc<dyn CodeSource>,
    verification: VerificationConfig,
    messages: MessagesConfig,
}

impl Coordinator {
    /// Create a coordinator over an authority and a code source
    pub fn new(
        authority: Arc<dyn Authority>,
        codes: Arc<dyn CodeSource>,
        verification: VerificationConfig,
        messages: MessagesConfig,
    ) -> Self {
        Self {
            bindings: DashMap::new(),
            authority,
            codes,
            verification,
            messages,
        }
    }

    /// Start a verification handshake for a requester
    ///
    /// Binds a fresh session to the requester, replacing any previous one,
    /// then delivers the verification prompt. Already-verified requesters
    /// are refused before any state changes. A failed delivery leaves the
    /// binding in place, so the requester can still finish through the link
    /// once delivery works.
    pub async fn initiate(&self, requester_id: &str) -> Result<Initiation, InitiateError> {
        match self.authority.is_verified(requester_id).await {
            Ok(true) => return Err(InitiateError::AlreadyVerified),
            Ok(false) => {}
            Err(e) => {
                // an unreadable requester is treated as unverified
                warn!("Verified lookup failed for requester {}: {}", requester_id, e);
            }
        }

        let session_id = new_session_id();
        self.bindings
            .insert(requester_id.to_string(), session_id.clone());
        debug!("Bound requester {} to session {}", requester_id, session_id);

        // first lookup mints the code and starts its TTL clock
        if let Err(e) = self.codes.fetch(&session_id).await {
            warn!("Could not warm code for session {}: {}", session_id, e);
        }

        let link = self.verification.link_for(&session_id);
        let prompt = self.messages.render_prompt(&link);
        self.authority
            .deliver(requester_id, &prompt)
            .await
            .map_err(InitiateError::Delivery)?;

        info!("Verification started for requester {}", requester_id);
        Ok(Initiation { session_id, link })
    }

    /// Check a submitted code against the requester's bound session
    ///
    /// Never fails hard: backend trouble reads as `WrongCode` so the
    /// requester just tries again, and a failed grant keeps the session
    /// open. Only a successful grant consumes the binding.
    pub async fn submit(&self, requester_id: &str, candidate: &str) -> SubmitOutcome {
        let session_id = match self.bindings.get(requester_id).map(|e| e.value().clone()) {
            Some(id) => id,
            None => return SubmitOutcome::NoActiveSession,
        };

        let expected = match self.codes.fetch(&session_id).await {
            Ok(code) => code,
            Err(e) => {
                warn!("Code lookup failed for session {}: {}", session_id, e);
                return SubmitOutcome::WrongCode;
            }
        };

        if candidate.trim() != expected {
            debug!("Wrong code from requester {}", requester_id);
            return SubmitOutcome::WrongCode;
        }

        if let Err(e) = self.authority.grant_verified(requester_id).await {
            warn!("Grant failed for requester {}: {}", requester_id, e);
            return SubmitOutcome::GrantFailed;
        }

        self.bindings.remove(requester_id);
        info!("Requester {} verified", requester_id);
        SubmitOutcome::Success
    }

    /// Whether a requester currently has a session bound
    pub fn has_session(&self, requester_id: &str) -> bool {
        self.bindings.contains_key(requester_id)
    }

    /// Number of handshakes currently open
    pub fn open_sessions(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::SESSION_ID_LENGTH;
    use crate::error::{Error, Result as CoreResult};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockAuthority {
        verified: AtomicBool,
        fail_lookup: AtomicBool,
        fail_deliver: AtomicBool,
        fail_grant: AtomicBool,
        delivered: Mutex<Vec<String>>,
        grants: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Authority for MockAuthority {
        async fn is_verified(&self, _requester_id: &str) -> CoreResult<bool> {
            if self.fail_lookup.load(Ordering::SeqCst) {
                return Err(Error::Authority("lookup down".into()));
            }
            Ok(self.verified.load(Ordering::SeqCst))
        }

        async fn deliver(&self, _requester_id: &str, text: &str) -> CoreResult<()> {
            if self.fail_deliver.load(Ordering::SeqCst) {
                return Err(Error::Delivery("dms closed".into()));
            }
            self.delivered.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn grant_verified(&self, _requester_id: &str) -> CoreResult<()> {
            if self.fail_grant.load(Ordering::SeqCst) {
                return Err(Error::Authority("grant down".into()));
            }
            self.grants.fetch_add(1, Ordering::SeqCst);
            self.verified.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn verified_count(&self) -> CoreResult<usize> {
            Ok(self.grants.load(Ordering::SeqCst))
        }
    }

    struct StubCodes {
        code: Option<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl StubCodes {
        fn serving(code: &str) -> Self {
            Self {
                code: Some(code.to_string()),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn down() -> Self {
            Self {
                code: None,
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CodeSource for StubCodes {
        async fn fetch(&self, session_id: &str) -> CoreResult<String> {
            self.fetched.lock().unwrap().push(session_id.to_string());
            match &self.code {
                Some(code) => Ok(code.clone()),
                None => Err(Error::Backend("connection refused".into())),
            }
        }
    }

    fn coordinator(authority: Arc<MockAuthority>, codes: Arc<StubCodes>) -> Coordinator {
        Coordinator::new(
            authority,
            codes,
            VerificationConfig::default(),
            MessagesConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_initiate_binds_and_delivers() {
        let authority = Arc::new(MockAuthority::default());
        let codes = Arc::new(StubCodes::serving("123456"));
        let c = coordinator(Arc::clone(&authority), Arc::clone(&codes));

        let initiation = c.initiate("u1").await.unwrap();

        assert_eq!(initiation.session_id.len(), SESSION_ID_LENGTH);
        assert!(initiation.link.contains(&initiation.session_id));
        assert!(c.has_session("u1"));

        let delivered = authority.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].contains(&initiation.link));

        // initiation warms the store for the new session
        assert_eq!(
            *codes.fetched.lock().unwrap(),
            vec![initiation.session_id.clone()]
        );
    }

    #[tokio::test]
    async fn test_initiate_refuses_already_verified() {
        let authority = Arc::new(MockAuthority::default());
        authority.verified.store(true, Ordering::SeqCst);
        let c = coordinator(Arc::clone(&authority), Arc::new(StubCodes::serving("123456")));

        let err = c.initiate("u1").await.unwrap_err();

        assert!(matches!(err, InitiateError::AlreadyVerified));
        assert!(!c.has_session("u1"));
        assert!(authority.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initiate_treats_lookup_failure_as_unverified() {
        let authority = Arc::new(MockAuthority::default());
        authority.fail_lookup.store(true, Ordering::SeqCst);
        let c = coordinator(authority, Arc::new(StubCodes::serving("123456")));

        assert!(c.initiate("u1").await.is_ok());
        assert!(c.has_session("u1"));
    }

    #[tokio::test]
    async fn test_initiate_delivery_failure_keeps_binding() {
        let authority = Arc::new(MockAuthority::default());
        authority.fail_deliver.store(true, Ordering::SeqCst);
        let c = coordinator(authority, Arc::new(StubCodes::serving("123456")));

        let err = c.initiate("u1").await.unwrap_err();

        assert!(matches!(err, InitiateError::Delivery(_)));
        assert!(c.has_session("u1"));
    }

    #[tokio::test]
    async fn test_initiate_overwrites_previous_binding() {
        let authority = Arc::new(MockAuthority::default());
        let codes = Arc::new(StubCodes::serving("123456"));
        let c = coordinator(authority, Arc::clone(&codes));

        let first = c.initiate("u1").await.unwrap();
        let second = c.initiate("u1").await.unwrap();

        assert_ne!(first.session_id, second.session_id);
        assert_eq!(c.open_sessions(), 1);

        // a submission now resolves against the replacement session
        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::Success);
        assert_eq!(
            codes.fetched.lock().unwrap().last(),
            Some(&second.session_id)
        );
    }

    #[tokio::test]
    async fn test_submit_without_session() {
        let c = coordinator(
            Arc::new(MockAuthority::default()),
            Arc::new(StubCodes::serving("123456")),
        );

        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::NoActiveSession);
    }

    #[tokio::test]
    async fn test_submit_wrong_code_keeps_session() {
        let authority = Arc::new(MockAuthority::default());
        let c = coordinator(Arc::clone(&authority), Arc::new(StubCodes::serving("123456")));
        c.initiate("u1").await.unwrap();

        assert_eq!(c.submit("u1", "000000").await, SubmitOutcome::WrongCode);
        assert!(c.has_session("u1"));

        // retries are unlimited
        assert_eq!(c.submit("u1", "999999").await, SubmitOutcome::WrongCode);
        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::Success);
        assert_eq!(authority.grants.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_trims_candidate() {
        let c = coordinator(
            Arc::new(MockAuthority::default()),
            Arc::new(StubCodes::serving("123456")),
        );
        c.initiate("u1").await.unwrap();

        assert_eq!(c.submit("u1", "  123456\n").await, SubmitOutcome::Success);
    }

    #[tokio::test]
    async fn test_submit_success_consumes_session() {
        let authority = Arc::new(MockAuthority::default());
        let c = coordinator(Arc::clone(&authority), Arc::new(StubCodes::serving("123456")));
        c.initiate("u1").await.unwrap();

        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::Success);
        assert!(!c.has_session("u1"));
        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::NoActiveSession);
        assert_eq!(authority.grants.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_backend_failure_reads_as_wrong_code() {
        let authority = Arc::new(MockAuthority::default());
        let c = coordinator(authority, Arc::new(StubCodes::down()));
        // warm-up fails but initiation still goes through
        c.initiate("u1").await.unwrap();

        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::WrongCode);
        assert!(c.has_session("u1"));
    }

    #[tokio::test]
    async fn test_submit_grant_failure_keeps_session() {
        let authority = Arc::new(MockAuthority::default());
        authority.fail_grant.store(true, Ordering::SeqCst);
        let c = coordinator(Arc::clone(&authority), Arc::new(StubCodes::serving("123456")));
        c.initiate("u1").await.unwrap();

        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::GrantFailed);
        assert!(c.has_session("u1"));

        // the same session succeeds once the grant path recovers
        authority.fail_grant.store(false, Ordering::SeqCst);
        assert_eq!(c.submit("u1", "123456").await, SubmitOutcome::Success);
        assert!(!c.has_session("u1"));
    }
}
