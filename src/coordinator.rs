//! Session coordination for the merchant console.
//!
//! The `SessionCoordinator` owns everything the screens share: the
//! access token and its silent refresh schedule, the resolved identity
//! and merchant records, the shared view store, and the logout path.
//! It is created once at console startup from the durable profile and
//! handed to every screen.
//!
//! Token maintenance is deliberately quiet: lookup and refresh
//! failures are logged and swallowed, and the session simply stays in
//! its prior state until the next attempt. The only user-visible event
//! this module produces is the logout notice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::AuthGateway;
use crate::auth::token;
use crate::models::{Identity, Merchant};
use crate::notify::Noticeboard;
use crate::persist::ProfileStore;
use crate::store::SharedStore;

// ============================================================================
// Constants
// ============================================================================

/// How often the background task re-runs the refresh flow.
/// Platform access tokens live ~15 minutes; 12 keeps a working margin.
const REFRESH_INTERVAL: Duration = Duration::from_secs(12 * 60);

/// Remaining lifetime under which the token is refreshed immediately
/// rather than waiting for the next interval tick.
const EXPIRY_SLACK_SECS: i64 = 60;

/// Notice id for the logout message, deduplicating rapid repeats.
const LOGOUT_NOTICE_ID: &str = "logout";

// ============================================================================
// Session state
// ============================================================================

#[derive(Debug, Default)]
struct AuthState {
    token: Option<String>,
    identity: Option<Identity>,
    merchant: Option<Merchant>,
}

/// The session and shared-state hub of the console.
pub struct SessionCoordinator<G> {
    gateway: G,
    profile: ProfileStore,
    state: RwLock<AuthState>,
    store: SharedStore,
    notices: Noticeboard,
    /// Bumped on logout. Async flows capture it before their first await
    /// and re-check before writing, so work resolving after logout is
    /// discarded instead of resurrecting the session.
    epoch: AtomicU64,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl<G: AuthGateway> SessionCoordinator<G> {
    /// Build a coordinator from the durable profile.
    ///
    /// Only reads persisted state; call [`start`](Self::start) to
    /// bootstrap derived records and begin the refresh schedule.
    pub fn new(gateway: G, profile: ProfileStore) -> Arc<Self> {
        let token = profile.token();
        Arc::new(Self {
            gateway,
            profile,
            state: RwLock::new(AuthState {
                token,
                ..AuthState::default()
            }),
            store: SharedStore::new(),
            notices: Noticeboard::new(),
            epoch: AtomicU64::new(0),
            refresh_task: Mutex::new(None),
        })
    }

    /// Bootstrap identity and merchant, then begin the refresh schedule
    /// if a token survived the restart.
    pub async fn start(self: &Arc<Self>) {
        tokio::join!(self.bootstrap_identity(), self.bootstrap_merchant());
        if self.state.read().await.token.is_some() {
            self.schedule_refresh();
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    pub async fn merchant(&self) -> Option<Merchant> {
        self.state.read().await.merchant.clone()
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn notices(&self) -> &Noticeboard {
        &self.notices
    }

    // =========================================================================
    // Token lifecycle
    // =========================================================================

    /// Install a freshly issued access token (the login screen calls
    /// this), re-resolve the records behind it and restart the refresh
    /// schedule.
    pub async fn set_token(self: &Arc<Self>, token: String) {
        self.state.write().await.token = Some(token.clone());
        if let Err(e) = self.profile.set_token(&token) {
            warn!(error = %e, "failed to persist access token");
        }
        tokio::join!(self.bootstrap_identity(), self.bootstrap_merchant());
        self.schedule_refresh();
    }

    /// Resolve the identity behind the current token.
    ///
    /// No-op unless the token is present and valid. On success the
    /// identity's username is persisted for later silent refresh.
    /// Lookup failures leave the previous identity in place.
    pub async fn bootstrap_identity(&self) {
        let Some(token) = self.current_valid_token().await else {
            return;
        };
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.gateway.fetch_identity(&token).await {
            Ok(identity) => {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    debug!("session ended during identity lookup; discarding result");
                    return;
                }
                if let Err(e) = self.profile.set_username(&identity.username) {
                    warn!(error = %e, "failed to persist username");
                }
                self.state.write().await.identity = Some(identity);
            }
            Err(e) => warn!(error = %e, "identity lookup failed"),
        }
    }

    /// Resolve the merchant record behind the current token. Same gate
    /// and failure posture as [`bootstrap_identity`](Self::bootstrap_identity).
    pub async fn bootstrap_merchant(&self) {
        let Some(token) = self.current_valid_token().await else {
            return;
        };
        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.gateway.fetch_merchant(&token).await {
            Ok(merchant) => {
                if self.epoch.load(Ordering::SeqCst) != epoch {
                    debug!("session ended during merchant lookup; discarding result");
                    return;
                }
                self.state.write().await.merchant = Some(merchant);
            }
            Err(e) => warn!(error = %e, "merchant lookup failed"),
        }
    }

    /// Run the silent refresh flow.
    ///
    /// Requires a username from a previous login on this profile;
    /// without one this is a no-op. An invalid current token is cleared
    /// up front, then a refresh credential is fetched and exchanged for
    /// a new access token. Failures past that point leave the token in
    /// whatever state the validity check produced: an expired session
    /// stays logged out, a still-valid token stays in place.
    pub async fn refresh_token(&self) {
        let Some(username) = self.profile.username() else {
            debug!("no stored username; skipping token refresh");
            return;
        };
        let epoch = self.epoch.load(Ordering::SeqCst);

        {
            let mut state = self.state.write().await;
            let still_valid = state.token.as_deref().is_some_and(token::is_token_valid);
            if !still_valid && state.token.take().is_some() {
                debug!("dropping invalid access token before refresh");
                if let Err(e) = self.profile.clear_token() {
                    warn!(error = %e, "failed to clear persisted token");
                }
            }
        }

        let credential = match self.gateway.refresh_credential(&username).await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "refresh credential lookup failed");
                return;
            }
        };
        let grant = match self.gateway.exchange_refresh_credential(&credential).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(error = %e, "token exchange failed");
                return;
            }
        };

        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("session ended during refresh; discarding new token");
            return;
        }
        self.state.write().await.token = Some(grant.access_token.clone());
        if let Err(e) = self.profile.set_token(&grant.access_token) {
            warn!(error = %e, "failed to persist refreshed token");
        }
        info!("access token refreshed");

        self.bootstrap_identity().await;
        self.bootstrap_merchant().await;
    }

    /// End the session.
    ///
    /// Queues one logout notice, clears the credential and the derived
    /// identity/merchant records, and stops the refresh schedule. The
    /// shared store and the persisted username survive, so a returning
    /// seller can be silently re-authenticated.
    pub async fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.notices.push(LOGOUT_NOTICE_ID, "You are logged out");
        {
            let mut state = self.state.write().await;
            state.identity = None;
            state.token = None;
            state.merchant = None;
        }
        if let Err(e) = self.profile.clear_token() {
            warn!(error = %e, "failed to clear persisted token");
        }
        self.cancel_refresh();
        info!("session ended");
    }

    /// Stop background work without touching session state. For view
    /// teardown; the next [`start`](Self::start) or
    /// [`set_token`](Self::set_token) resumes the schedule.
    pub fn shutdown(&self) {
        self.cancel_refresh();
    }

    // =========================================================================
    // Refresh scheduling
    // =========================================================================

    async fn current_valid_token(&self) -> Option<String> {
        let state = self.state.read().await;
        state.token.clone().filter(|t| token::is_token_valid(t))
    }

    /// Start (or restart) the background refresh task.
    ///
    /// The task holds only a weak handle, so dropping the coordinator
    /// ends the schedule even if nobody called shutdown.
    fn schedule_refresh(self: &Arc<Self>) {
        let coordinator = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            Self::run_refresh_schedule(coordinator).await;
        });
        let previous = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    async fn run_refresh_schedule(coordinator: Weak<SessionCoordinator<G>>) {
        // The near-expiry check runs once as soon as the token is
        // installed, then again on every tick alongside the
        // unconditional refresh. Both triggers stay separate: the
        // immediate one bounds worst-case staleness, the tick is the
        // steady heartbeat, and refresh itself is idempotent.
        if let Some(coordinator) = coordinator.upgrade() {
            coordinator.refresh_if_expiring().await;
        }

        let mut ticker = interval_at(Instant::now() + REFRESH_INTERVAL, REFRESH_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(coordinator) = coordinator.upgrade() else {
                break;
            };
            coordinator.refresh_token().await;
            coordinator.refresh_if_expiring().await;
        }
    }

    /// Refresh out-of-band when the token is about to lapse.
    async fn refresh_if_expiring(&self) {
        let remaining = {
            let state = self.state.read().await;
            state.token.as_deref().and_then(token::time_to_expiry)
        };
        match remaining {
            Some(left) if left < chrono::Duration::seconds(EXPIRY_SLACK_SECS) => {
                debug!(seconds_left = left.num_seconds(), "token near expiry; refreshing now");
                self.refresh_token().await;
            }
            _ => {}
        }
    }

    fn cancel_refresh(&self) {
        let task = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl<G> Drop for SessionCoordinator<G> {
    fn drop(&mut self) {
        let task = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;

    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use serde::Serialize;
    use tokio::sync::Notify;

    use crate::api::{ApiError, RefreshCredential, TokenGrant};

    #[derive(Serialize)]
    struct TestClaims {
        exp: i64,
    }

    fn token_expiring_in(secs: i64) -> String {
        let claims = TestClaims {
            exp: Utc::now().timestamp() + secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test"))
            .expect("token should encode")
    }

    /// In-memory gateway recording every call it receives.
    #[derive(Default)]
    struct StubGateway {
        identity_calls: AtomicUsize,
        identity_tokens: StdMutex<Vec<String>>,
        merchant_calls: AtomicUsize,
        credential_calls: AtomicUsize,
        exchange_calls: AtomicUsize,
        fail_credential_lookup: bool,
        /// When set, the exchange blocks until notified.
        exchange_gate: Option<Arc<Notify>>,
        /// Token the exchange hands back; defaults to a 30-minute one.
        issued_token: StdMutex<Option<String>>,
    }

    impl StubGateway {
        fn issuing(token: &str) -> StubGateway {
            StubGateway {
                issued_token: StdMutex::new(Some(token.to_string())),
                ..StubGateway::default()
            }
        }
    }

    impl AuthGateway for Arc<StubGateway> {
        async fn fetch_identity(&self, token: &str) -> Result<Identity, ApiError> {
            self.identity_calls.fetch_add(1, Ordering::SeqCst);
            self.identity_tokens
                .lock()
                .expect("lock")
                .push(token.to_string());
            Ok(Identity {
                id: None,
                username: "ada".to_string(),
                email: Some("ada@example.com".to_string()),
                avatar: None,
                is_verified: true,
            })
        }

        async fn fetch_merchant(&self, _token: &str) -> Result<Merchant, ApiError> {
            self.merchant_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Merchant {
                id: None,
                merchant_code: "TEEM-01".to_string(),
                merchant_name: Some("Ada's Goods".to_string()),
                merchant_email: None,
                currency: Some("USD".to_string()),
                logo: None,
            })
        }

        async fn refresh_credential(&self, _username: &str) -> Result<RefreshCredential, ApiError> {
            self.credential_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_credential_lookup {
                return Err(ApiError::NotFound("unknown seller".to_string()));
            }
            Ok(RefreshCredential {
                refresh_token: "refresh-credential".to_string(),
            })
        }

        async fn exchange_refresh_credential(
            &self,
            _credential: &RefreshCredential,
        ) -> Result<TokenGrant, ApiError> {
            self.exchange_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref gate) = self.exchange_gate {
                gate.notified().await;
            }
            let issued = self.issued_token.lock().expect("lock").clone();
            Ok(TokenGrant {
                access_token: issued.unwrap_or_else(|| token_expiring_in(1800)),
            })
        }
    }

    fn profile_in(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::open(dir.path()).expect("profile should open")
    }

    #[tokio::test]
    async fn test_start_bootstraps_identity_and_merchant() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        profile.set_token(&token_expiring_in(1800)).expect("seed token");

        let stub = Arc::new(StubGateway::default());
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.start().await;

        assert_eq!(
            coordinator.identity().await.map(|i| i.username),
            Some("ada".to_string())
        );
        assert_eq!(
            coordinator.merchant().await.map(|m| m.merchant_code),
            Some("TEEM-01".to_string())
        );
        // The username from the identity is persisted for later refresh.
        let reopened = profile_in(&dir);
        assert_eq!(reopened.username().as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn test_bootstrap_is_gated_on_token_validity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        profile.set_token(&token_expiring_in(-60)).expect("seed token");

        let stub = Arc::new(StubGateway::default());
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.bootstrap_identity().await;
        coordinator.bootstrap_merchant().await;

        assert_eq!(stub.identity_calls.load(Ordering::SeqCst), 0);
        assert_eq!(stub.merchant_calls.load(Ordering::SeqCst), 0);
        assert!(coordinator.identity().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_dedupes_notice() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);

        let stub = Arc::new(StubGateway::default());
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.set_token(token_expiring_in(1800)).await;
        assert!(coordinator.identity().await.is_some());

        coordinator.logout().await;
        coordinator.logout().await;

        assert!(coordinator.token().await.is_none());
        assert!(coordinator.identity().await.is_none());
        assert!(coordinator.merchant().await.is_none());

        let notices = coordinator.notices().drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].id, "logout");

        // Credential gone, username kept for silent re-login.
        let reopened = profile_in(&dir);
        assert!(reopened.token().is_none());
        assert_eq!(reopened.username().as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn test_refresh_without_username_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        let seeded = token_expiring_in(1800);
        profile.set_token(&seeded).expect("seed token");

        let stub = Arc::new(StubGateway::default());
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.refresh_token().await;

        assert_eq!(coordinator.token().await.as_deref(), Some(seeded.as_str()));
        assert_eq!(stub.credential_calls.load(Ordering::SeqCst), 0);
        assert_eq!(stub.exchange_calls.load(Ordering::SeqCst), 0);
        assert_eq!(stub.identity_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_happy_chain_stores_token_and_rebootstraps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        profile.set_token(&token_expiring_in(-60)).expect("seed token");
        profile.set_username("ada").expect("seed username");

        let issued = token_expiring_in(1800);
        let stub = Arc::new(StubGateway::issuing(&issued));
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.refresh_token().await;

        assert_eq!(coordinator.token().await.as_deref(), Some(issued.as_str()));
        assert_eq!(stub.credential_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.exchange_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.identity_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*stub.identity_tokens.lock().expect("lock"), vec![issued.clone()]);

        let reopened = profile_in(&dir);
        assert_eq!(reopened.token().as_deref(), Some(issued.as_str()));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_a_still_valid_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        let seeded = token_expiring_in(1800);
        profile.set_token(&seeded).expect("seed token");
        profile.set_username("ada").expect("seed username");

        let stub = Arc::new(StubGateway {
            fail_credential_lookup: true,
            ..StubGateway::default()
        });
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.refresh_token().await;

        // No forced logout on a transient refresh failure.
        assert_eq!(coordinator.token().await.as_deref(), Some(seeded.as_str()));
        assert_eq!(stub.identity_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_of_expired_token_leaves_session_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        profile.set_token(&token_expiring_in(-60)).expect("seed token");
        profile.set_username("ada").expect("seed username");

        let stub = Arc::new(StubGateway {
            fail_credential_lookup: true,
            ..StubGateway::default()
        });
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.refresh_token().await;

        assert!(coordinator.token().await.is_none());
        let reopened = profile_in(&dir);
        assert!(reopened.token().is_none());
        assert_eq!(reopened.username().as_deref(), Some("ada"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_near_expiry_refreshes_once_before_first_tick() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        profile.set_username("ada").expect("seed username");

        let issued = token_expiring_in(24 * 3600);
        let stub = Arc::new(StubGateway::issuing(&issued));
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.set_token(token_expiring_in(30)).await;

        // Let the scheduler task run its immediate check.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stub.credential_calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.token().await.as_deref(), Some(issued.as_str()));

        // Nothing more until the first interval tick.
        tokio::time::sleep(Duration::from_secs(5 * 60)).await;
        assert_eq!(stub.credential_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_tick_refreshes_unconditionally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        profile.set_username("ada").expect("seed username");

        let issued = token_expiring_in(24 * 3600);
        let stub = Arc::new(StubGateway::issuing(&issued));
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.set_token(token_expiring_in(24 * 3600)).await;

        // Far from expiry: the immediate check stays quiet.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stub.credential_calls.load(Ordering::SeqCst), 0);

        // The tick refreshes even though the token is nowhere near expiry.
        tokio::time::sleep(REFRESH_INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(stub.credential_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_discards_inflight_refresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);
        profile.set_username("ada").expect("seed username");

        let gate = Arc::new(Notify::new());
        let stub = Arc::new(StubGateway {
            exchange_gate: Some(gate.clone()),
            ..StubGateway::default()
        });
        let coordinator = SessionCoordinator::new(stub.clone(), profile);

        let refresher = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh_token().await })
        };
        while stub.exchange_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        coordinator.logout().await;
        gate.notify_one();
        refresher.await.expect("refresh task");

        // The late token grant must not resurrect the session.
        assert!(coordinator.token().await.is_none());
        let reopened = profile_in(&dir);
        assert!(reopened.token().is_none());
    }

    #[tokio::test]
    async fn test_logout_leaves_shared_store_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = profile_in(&dir);

        let stub = Arc::new(StubGateway::default());
        let coordinator = SessionCoordinator::new(stub.clone(), profile);
        coordinator.set_token(token_expiring_in(1800)).await;
        coordinator.store().set_customer_page(3);

        coordinator.logout().await;
        assert_eq!(coordinator.store().customer_page(), 3);
    }
}
