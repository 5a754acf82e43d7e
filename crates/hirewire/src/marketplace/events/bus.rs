use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::super::domain::{Identity, JobId, UserId};
use super::auth::{AuthError, IdentityVerifier};
use super::types::{Channel, Delivery, OutboundEvent};

/// Tuning for per-session delivery queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Deliveries buffered per session before new ones are dropped.
    pub session_buffer: usize,
}

impl EventBusConfig {
    pub const DEFAULT_SESSION_BUFFER: usize = 64;
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            session_buffer: Self::DEFAULT_SESSION_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Joined,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
    /// Personal channel of another identity; the session is left untouched.
    Rejected,
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("connection refused: {0}")]
    Unauthenticated(#[from] AuthError),
}

/// Outcome of a single publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub sequence: u64,
    pub delivered: usize,
    pub dropped: usize,
}

struct SessionEntry {
    identity: Identity,
    sender: mpsc::Sender<Delivery>,
    personal: bool,
    jobs: HashSet<JobId>,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<SessionId, SessionEntry>,
    personal: HashMap<UserId, HashSet<SessionId>>,
    jobs: HashMap<JobId, HashSet<SessionId>>,
}

impl Registry {
    fn targets(&self, channel: &Channel) -> Vec<SessionId> {
        match channel {
            Channel::Personal(user_id) => self
                .personal
                .get(user_id)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default(),
            Channel::Job(job_id) => self
                .jobs
                .get(job_id)
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default(),
            Channel::Global => self.sessions.keys().copied().collect(),
        }
    }

    fn remove(&mut self, session_id: SessionId) -> Option<SessionEntry> {
        let entry = self.sessions.remove(&session_id)?;

        if entry.personal {
            detach(&mut self.personal, &entry.identity.user_id, session_id);
        }
        for job_id in &entry.jobs {
            detach(&mut self.jobs, job_id, session_id);
        }

        Some(entry)
    }
}

fn detach<K>(index: &mut HashMap<K, HashSet<SessionId>>, key: &K, session_id: SessionId)
where
    K: std::hash::Hash + Eq,
{
    if let Some(members) = index.get_mut(key) {
        members.remove(&session_id);
        if members.is_empty() {
            index.remove(key);
        }
    }
}

struct BusInner {
    verifier: Arc<dyn IdentityVerifier>,
    config: EventBusConfig,
    registry: RwLock<Registry>,
    sequence: AtomicU64,
}

/// In-memory publish/subscribe registry routing events to live sessions.
///
/// Delivery is best-effort and at-most-once: sessions that are not connected
/// when an event is published never see it, and a session whose queue is full
/// loses the event. Clones share the same registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.inner.config)
            .field("connected_sessions", &self.connected_sessions())
            .finish()
    }
}

impl EventBus {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, config: EventBusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                verifier,
                config,
                registry: RwLock::new(Registry::default()),
                sequence: AtomicU64::new(1),
            }),
        }
    }

    pub fn verifier(&self) -> Arc<dyn IdentityVerifier> {
        Arc::clone(&self.inner.verifier)
    }

    /// Authenticate a new connection. A bad credential refuses the session outright.
    pub fn connect(&self, credential: &str) -> Result<Session, ConnectError> {
        let identity = self.inner.verifier.verify(credential).map_err(|err| {
            warn!(error = %err, "session connection refused");
            ConnectError::from(err)
        })?;

        let (sender, receiver) = mpsc::channel(self.inner.config.session_buffer.max(1));
        let session_id = SessionId(Uuid::new_v4());

        self.inner.registry.write().sessions.insert(
            session_id,
            SessionEntry {
                identity: identity.clone(),
                sender,
                personal: false,
                jobs: HashSet::new(),
            },
        );

        info!(session = %session_id, user = %identity.user_id, "session connected");

        Ok(Session {
            id: session_id,
            identity,
            state: SessionState::Authenticated,
            receiver,
            bus: self.clone(),
        })
    }

    /// Deliver `event` to every session currently subscribed to `channel`.
    ///
    /// Membership is read under a single lock acquisition, so concurrent joins
    /// and disconnects are observed either fully or not at all.
    pub fn publish(&self, channel: &Channel, event: OutboundEvent) -> PublishReport {
        let registry = self.inner.registry.read();
        let sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst);
        let targets = registry.targets(channel);

        let mut report = PublishReport {
            sequence,
            ..PublishReport::default()
        };

        if targets.is_empty() {
            debug!(%channel, event = event.name(), "no subscribers for event");
            return report;
        }

        let delivery = Delivery {
            sequence,
            published_at: Utc::now(),
            channel: channel.clone(),
            event,
        };

        for session_id in targets {
            let Some(entry) = registry.sessions.get(&session_id) else {
                continue;
            };
            match entry.sender.try_send(delivery.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        session = %session_id,
                        %channel,
                        event = delivery.event.name(),
                        "session queue full, dropping event"
                    );
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(session = %session_id, "session receiver closed");
                    report.dropped += 1;
                }
            }
        }

        debug!(
            %channel,
            event = delivery.event.name(),
            sequence,
            delivered = report.delivered,
            dropped = report.dropped,
            "event published"
        );
        report
    }

    pub fn connected_sessions(&self) -> usize {
        self.inner.registry.read().sessions.len()
    }

    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        let registry = self.inner.registry.read();
        match channel {
            Channel::Personal(user_id) => registry.personal.get(user_id).map_or(0, HashSet::len),
            Channel::Job(job_id) => registry.jobs.get(job_id).map_or(0, HashSet::len),
            Channel::Global => registry.sessions.len(),
        }
    }

    fn join_personal(&self, session_id: SessionId) -> JoinOutcome {
        let mut registry = self.inner.registry.write();
        let Some(entry) = registry.sessions.get_mut(&session_id) else {
            return JoinOutcome::Rejected;
        };
        if entry.personal {
            return JoinOutcome::AlreadyJoined;
        }
        entry.personal = true;
        let user_id = entry.identity.user_id.clone();
        registry.personal.entry(user_id).or_default().insert(session_id);
        JoinOutcome::Joined
    }

    fn join_job(&self, session_id: SessionId, job_id: &JobId) -> JoinOutcome {
        let mut registry = self.inner.registry.write();
        let Some(entry) = registry.sessions.get_mut(&session_id) else {
            return JoinOutcome::Rejected;
        };
        if !entry.jobs.insert(job_id.clone()) {
            return JoinOutcome::AlreadyJoined;
        }
        registry
            .jobs
            .entry(job_id.clone())
            .or_default()
            .insert(session_id);
        JoinOutcome::Joined
    }

    /// Returns whether the membership was removed and whether any membership remains.
    fn leave_job(&self, session_id: SessionId, job_id: &JobId) -> (bool, bool) {
        let mut registry = self.inner.registry.write();
        let Some(entry) = registry.sessions.get_mut(&session_id) else {
            return (false, false);
        };
        let removed = entry.jobs.remove(job_id);
        let still_joined = entry.personal || !entry.jobs.is_empty();
        if removed {
            detach(&mut registry.jobs, job_id, session_id);
        }
        (removed, still_joined)
    }

    fn release(&self, session_id: SessionId) {
        let removed = self.inner.registry.write().remove(session_id);
        if let Some(entry) = removed {
            info!(
                session = %session_id,
                user = %entry.identity.user_id,
                jobs = entry.jobs.len(),
                "session disconnected"
            );
        }
    }
}

/// Live connection bound to one authenticated identity.
///
/// Dropping the session is treated as transport loss and releases every
/// channel membership; there is no automatic rejoin.
pub struct Session {
    id: SessionId,
    identity: Identity,
    state: SessionState,
    receiver: mpsc::Receiver<Delivery>,
    bus: EventBus,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("state", &self.state)
            .finish()
    }
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Join the personal channel of `user_id`, which must be the session's own identity.
    pub fn join_personal(&mut self, user_id: &UserId) -> JoinOutcome {
        if user_id != &self.identity.user_id {
            warn!(
                target: "hirewire::security",
                session = %self.id,
                user = %self.identity.user_id,
                requested = %user_id,
                "rejected personal channel join for foreign identity"
            );
            return JoinOutcome::Rejected;
        }

        let outcome = self.bus.join_personal(self.id);
        if outcome == JoinOutcome::Joined {
            self.state = SessionState::Joined;
            info!(session = %self.id, user = %user_id, "joined personal channel");
        }
        outcome
    }

    // Any authenticated identity may join any job channel; participation
    // checks belong to the authorization layer.
    pub fn join_job(&mut self, job_id: &JobId) -> JoinOutcome {
        let outcome = self.bus.join_job(self.id, job_id);
        if outcome == JoinOutcome::Joined {
            self.state = SessionState::Joined;
            info!(
                session = %self.id,
                user = %self.identity.user_id,
                job = %job_id,
                "joined job channel"
            );
        }
        outcome
    }

    /// Leave a job channel. The session falls back to `Authenticated` once it
    /// holds no channel memberships.
    pub fn leave_job(&mut self, job_id: &JobId) -> bool {
        let (removed, still_joined) = self.bus.leave_job(self.id, job_id);
        if removed && !still_joined {
            self.state = SessionState::Authenticated;
        }
        removed
    }

    /// Wait for the next delivery. Returns `None` once disconnected and drained.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Delivery> {
        match self.receiver.try_recv() {
            Ok(delivery) => Some(delivery),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain every delivery already queued for this session.
    pub fn drain(&mut self) -> Vec<Delivery> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn disconnect(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        self.bus.release(self.id);
        self.state = SessionState::Disconnected;
        self.receiver.close();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
