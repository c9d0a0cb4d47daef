use crate::error::{FetchError, FetchFailure, Resource};
use crate::models::{Activity, Friend, Pot, SessionData};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// The three independent endpoints a session is bootstrapped from
#[async_trait]
pub trait BootstrapSource: Send + Sync {
    /// All pots; not scoped to the user
    async fn fetch_all_pots(&self) -> Result<Vec<Pot>, FetchError>;

    async fn fetch_friends(&self, address: &str) -> Result<Vec<Friend>, FetchError>;

    async fn fetch_activities(&self, address: &str) -> Result<Vec<Activity>, FetchError>;
}

/// Observable state of the session bootstrap
#[derive(Debug, Clone)]
pub struct LoadState {
    pub is_loading: bool,
    pub error: Option<FetchFailure>,
    pub data: Option<Arc<SessionData>>,
}

impl LoadState {
    /// State before any load was requested
    pub fn initial() -> Self {
        Self {
            is_loading: true,
            error: None,
            data: None,
        }
    }

    /// Nothing to bootstrap (no authenticated user)
    pub fn idle() -> Self {
        Self {
            is_loading: false,
            error: None,
            data: None,
        }
    }

    pub fn loading() -> Self {
        Self::initial()
    }

    pub fn ready(data: SessionData) -> Self {
        Self {
            is_loading: false,
            error: None,
            data: Some(Arc::new(data)),
        }
    }

    pub fn failed(failure: FetchFailure) -> Self {
        Self {
            is_loading: false,
            error: Some(failure),
            data: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.is_loading && self.error.is_none() && self.data.is_some()
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::initial()
    }
}

/// What happened to the result of one `load_session` call
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The call was still current and its state was published
    Applied(LoadState),
    /// A newer call (or shutdown) superseded this one; its result was dropped
    Stale,
}

impl LoadOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, LoadOutcome::Stale)
    }
}

enum Fetched {
    Pots(Result<Vec<Pot>, FetchError>),
    Friends(Result<Vec<Friend>, FetchError>),
    Activities(Result<Vec<Activity>, FetchError>),
}

struct Inner {
    source: Arc<dyn BootstrapSource>,
    /// Token of the most recent request; results carrying an older token
    /// are discarded
    generation: AtomicU64,
    state: watch::Sender<LoadState>,
}

impl Inner {
    fn next_token(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Publish `state` if `token` is still current. The check runs under the
    /// channel's write lock, so a stale result can never land after a newer
    /// one.
    fn publish(&self, token: u64, state: LoadState) -> LoadOutcome {
        let mut applied = false;
        self.state.send_if_modified(|current| {
            if !self.is_current(token) {
                return false;
            }
            *current = state.clone();
            applied = true;
            true
        });

        if applied {
            LoadOutcome::Applied(state)
        } else {
            debug!("Discarding stale session load (token {})", token);
            LoadOutcome::Stale
        }
    }

    async fn run(&self, token: u64, user_address: Option<String>) -> LoadOutcome {
        let address = match user_address.filter(|a| !a.trim().is_empty()) {
            Some(address) => address,
            None => return self.publish(token, LoadState::idle()),
        };

        if self.publish(token, LoadState::loading()).is_stale() {
            return LoadOutcome::Stale;
        }

        let state = match self.fetch_all(&address).await {
            Ok(data) => {
                info!(
                    "Session loaded for {}: {} pots, {} friends, {} activities",
                    address,
                    data.pots.len(),
                    data.friends.len(),
                    data.activities.len()
                );
                LoadState::ready(data)
            }
            Err(failure) => LoadState::failed(failure),
        };

        self.publish(token, state)
    }

    /// Run the three fetches concurrently and wait for every one of them.
    /// Each failure is logged; the first one to complete is returned.
    async fn fetch_all(&self, address: &str) -> Result<SessionData, FetchFailure> {
        let source = self.source.as_ref();

        let mut pending: FuturesUnordered<BoxFuture<'_, Fetched>> = FuturesUnordered::new();
        pending.push(async move { Fetched::Pots(source.fetch_all_pots().await) }.boxed());
        pending.push(async move { Fetched::Friends(source.fetch_friends(address).await) }.boxed());
        pending.push(
            async move { Fetched::Activities(source.fetch_activities(address).await) }.boxed(),
        );

        let mut data = SessionData {
            user_address: address.to_string(),
            ..SessionData::default()
        };
        let mut first_failure: Option<FetchFailure> = None;

        while let Some(fetched) = pending.next().await {
            let result = match fetched {
                Fetched::Pots(result) => result
                    .map(|pots| data.pots = pots)
                    .map_err(|e| FetchFailure::new(Resource::Pots, e)),
                Fetched::Friends(result) => result
                    .map(|friends| data.friends = friends)
                    .map_err(|e| FetchFailure::new(Resource::Friends, e)),
                Fetched::Activities(result) => result
                    .map(|activities| data.activities = activities)
                    .map_err(|e| FetchFailure::new(Resource::Activities, e)),
            };

            if let Err(failure) = result {
                error!("Failed to load {}: {}", failure.resource, failure.source);
                first_failure.get_or_insert(failure);
            }
        }

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(data),
        }
    }
}

/// Loads a session's pots, friends and activities as one unit.
///
/// Every call to [`load_session`](Self::load_session) or
/// [`spawn_load`](Self::spawn_load) takes a fresh request token. Only the
/// call holding the newest token may publish, so a late result from a
/// superseded call never overwrites what a newer call produced. Dropping the
/// bootstrapper invalidates everything still in flight.
pub struct SessionBootstrapper {
    inner: Arc<Inner>,
}

impl SessionBootstrapper {
    pub fn new(source: Arc<dyn BootstrapSource>) -> Self {
        let (state, _) = watch::channel(LoadState::initial());
        Self {
            inner: Arc::new(Inner {
                source,
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    /// Bootstrap the session for `user_address`. Without an address the
    /// state becomes "not loading, no error" right away.
    pub async fn load_session(&self, user_address: Option<&str>) -> LoadOutcome {
        let token = self.inner.next_token();
        self.inner.run(token, user_address.map(str::to_string)).await
    }

    /// Like [`load_session`](Self::load_session) but on a background task.
    /// The request token is taken before this returns, so any call made
    /// afterwards supersedes this one.
    pub fn spawn_load(&self, user_address: Option<String>) -> JoinHandle<LoadOutcome> {
        let token = self.inner.next_token();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run(token, user_address).await })
    }

    /// Discard the results of every call still in flight
    pub fn shutdown(&self) {
        let token = self.inner.next_token();
        debug!("Session bootstrap shut down at token {}", token);
    }

    /// Current state snapshot
    pub fn state(&self) -> LoadState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.inner.state.subscribe()
    }
}

impl Drop for SessionBootstrapper {
    fn drop(&mut self) {
        self.shutdown();
    }
}
