//! Session Store: concurrency-safe registry of per-session violation counters.
//!
//! Sessions live in a [`DashMap`], so every operation on one id runs under
//! that id's shard lock while other ids proceed independently. A session is
//! created on first use, mutated in place, and removed on [`SessionStore::close`]
//! or once it has been idle for longer than the configured TTL.
//!
//! Expired sessions are removed lazily when next touched and eagerly by
//! [`SessionStore::sweep_expired`], which [`SessionStore::spawn_sweeper`] runs
//! periodically.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use proctor_types::{ProctorError, ProctorResult, SessionId, ViolationCounters, ViolationKind};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

/// Default idle time after which a session is evicted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Accumulated state for one interview attempt.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub counters: ViolationCounters,
    /// Frames recorded against this session.
    pub frames_recorded: u64,
    pub created_at: DateTime<Utc>,
    /// Last mutation or explicit access, used for eviction.
    pub last_seen: Instant,
}

impl Session {
    fn new(id: SessionId, now: Instant) -> Self {
        Self {
            id,
            counters: ViolationCounters::new(),
            frames_recorded: 0,
            created_at: Utc::now(),
            last_seen: now,
        }
    }

    /// Alive while idle for at most `ttl`.
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > ttl
    }
}

/// Registry of active sessions.
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Live entry for `id`, creating or replacing an expired session.
    ///
    /// Refreshes `last_seen`. The returned guard holds the id's shard lock.
    fn touch(&self, id: &SessionId) -> RefMut<'_, SessionId, Session> {
        let now = Instant::now();
        let mut opened = false;
        let mut entry = self.sessions.entry(id.clone()).or_insert_with(|| {
            opened = true;
            Session::new(id.clone(), now)
        });

        if !opened && entry.is_expired(now, self.ttl) {
            debug!(session_id = %id, "Replacing expired session");
            *entry = Session::new(id.clone(), now);
            opened = true;
        }
        if opened {
            info!(session_id = %id, "Session opened");
        }

        entry.last_seen = now;
        entry
    }

    /// Run `f` on a live session without refreshing it.
    fn read<T>(&self, id: &SessionId, f: impl FnOnce(&Session) -> T) -> ProctorResult<T> {
        let now = Instant::now();
        match self.sessions.get(id) {
            Some(session) if !session.is_expired(now, self.ttl) => return Ok(f(session.value())),
            Some(_) => {}
            None => return Err(ProctorError::SessionNotFound(id.clone())),
        }
        self.evict_if_expired(id, now);
        Err(ProctorError::SessionNotFound(id.clone()))
    }

    fn evict_if_expired(&self, id: &SessionId, now: Instant) {
        let ttl = self.ttl;
        if self
            .sessions
            .remove_if(id, |_, session| session.is_expired(now, ttl))
            .is_some()
        {
            info!(session_id = %id, "Session evicted");
        }
    }

    /// Copy of the session for `id`, creating a zeroed one on first use.
    #[instrument(skip(self, id), fields(session_id = %id))]
    pub fn get_or_create(&self, id: &SessionId) -> Session {
        self.touch(id).clone()
    }

    /// Add `delta` to one counter and return its new value.
    #[instrument(skip(self, id), fields(session_id = %id))]
    pub fn increment(&self, id: &SessionId, kind: ViolationKind, delta: u64) -> u64 {
        let count = self.touch(id).counters.add(kind, delta);
        debug!(session_id = %id, kind = %kind, count, "Counter incremented");
        count
    }

    /// [`increment`](Self::increment) by counter name.
    ///
    /// An unrecognized name fails with `InvalidViolationKind` and leaves the
    /// store untouched.
    pub fn increment_named(&self, id: &SessionId, kind: &str, delta: u64) -> ProctorResult<u64> {
        let kind: ViolationKind = kind.parse()?;
        Ok(self.increment(id, kind, delta))
    }

    /// Raise one counter of a live session to at least `value`.
    ///
    /// Folds in cumulative totals reported elsewhere without double counting.
    /// Never creates a session: an absent or expired id is `SessionNotFound`.
    #[instrument(skip(self, id), fields(session_id = %id))]
    pub fn raise_to(&self, id: &SessionId, kind: ViolationKind, value: u64) -> ProctorResult<u64> {
        let now = Instant::now();
        match self.sessions.get_mut(id) {
            Some(mut session) if !session.is_expired(now, self.ttl) => {
                session.last_seen = now;
                let count = session.counters.raise_to(kind, value);
                debug!(session_id = %id, kind = %kind, count, "Counter raised");
                return Ok(count);
            }
            Some(_) => {}
            None => return Err(ProctorError::SessionNotFound(id.clone())),
        }
        self.evict_if_expired(id, now);
        Err(ProctorError::SessionNotFound(id.clone()))
    }

    /// Count one frame and its violations in a single locked update.
    pub fn record_observation<I>(&self, id: &SessionId, kinds: I) -> ViolationCounters
    where
        I: IntoIterator<Item = ViolationKind>,
    {
        let mut session = self.touch(id);
        session.frames_recorded = session.frames_recorded.saturating_add(1);
        for kind in kinds {
            session.counters.add(kind, 1);
        }
        session.counters
    }

    /// Read-only copy of the counters for `id`.
    pub fn snapshot(&self, id: &SessionId) -> ProctorResult<ViolationCounters> {
        self.read(id, |session| session.counters)
    }

    /// Read-only copy of the whole session for `id`.
    pub fn session(&self, id: &SessionId) -> ProctorResult<Session> {
        self.read(id, Session::clone)
    }

    /// Whether `id` refers to a live session.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.read(id, |_| ()).is_ok()
    }

    /// Remove the session and return its final counters.
    ///
    /// A later use of the same id starts from zero.
    #[instrument(skip(self, id), fields(session_id = %id))]
    pub fn close(&self, id: &SessionId) -> ProctorResult<ViolationCounters> {
        let (_, session) = self
            .sessions
            .remove(id)
            .ok_or_else(|| ProctorError::SessionNotFound(id.clone()))?;

        if session.is_expired(Instant::now(), self.ttl) {
            info!(session_id = %id, "Session evicted");
            return Err(ProctorError::SessionNotFound(id.clone()));
        }

        info!(
            session_id = %id,
            frames = session.frames_recorded,
            violations = session.counters.total(),
            "Session closed"
        );
        Ok(session.counters)
    }

    /// Drop every session idle for longer than the TTL. Returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let mut evicted = 0;
        self.sessions.retain(|_, session| {
            let expired = session.is_expired(now, ttl);
            evicted += usize::from(expired);
            !expired
        });

        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "Swept idle sessions");
        }
        evicted
    }

    /// Sweep expired sessions every `period` on the current tokio runtime.
    ///
    /// The task holds only a weak reference and stops once the store is
    /// dropped; abort the handle to stop it earlier. A zero period is
    /// rejected.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> ProctorResult<JoinHandle<()>> {
        if period.is_zero() {
            return Err(ProctorError::InvalidInput(
                "sweep period must be greater than zero".to_string(),
            ));
        }
        let store = Arc::downgrade(self);
        info!(period_ms = period.as_millis() as u64, "Starting session sweeper");

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    debug!("Session store dropped, stopping sweeper");
                    break;
                };
                store.sweep_expired();
            }
        }))
    }

    /// Number of stored sessions, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
