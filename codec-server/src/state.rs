//! Shared application state
//!
//! Sessions each own a `NavigationController`; the registry and clock are
//! shared read-only. The beacon records the most recent transmission for
//! `/api/codec-status`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use codec_core::{
    AccessibilityFlags, Clock, CodecRegistry, EasterEggMatch, NavigationController,
    RewardDispatcher, SystemClock, Tuning,
};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::proxy::DevProxy;

/// One client's codec and the clock reading of its last request.
pub struct CodecSession {
    pub controller: NavigationController,
    last_touched: Duration,
}

pub type SessionStore = Arc<RwLock<HashMap<Uuid, CodecSession>>>;

pub fn create_session_store() -> SessionStore {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Last transmission seen by any session.
#[derive(Debug, Clone)]
pub struct Beacon {
    pub frequency: String,
    pub last_communication: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CodecRegistry>,
    pub sessions: SessionStore,
    pub clock: Arc<dyn Clock>,
    pub beacon: Arc<RwLock<Beacon>>,
    pub rewards: Arc<RewardDispatcher>,
    pub proxy: Arc<DevProxy>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(registry: Arc<CodecRegistry>, config: ServerConfig) -> Self {
        Self::with_clock(registry, config, Arc::new(SystemClock::new()))
    }

    /// Same as `new` with an explicit reveal clock (tests use a virtual one).
    pub fn with_clock(
        registry: Arc<CodecRegistry>,
        config: ServerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let beacon = Beacon {
            frequency: registry.first().value.clone(),
            last_communication: Utc::now(),
        };
        let rewards = reward_dispatcher(&registry);
        let proxy = DevProxy::new(&config.dev_proxy_target, &config.dev_proxy_prefix);
        Self {
            registry,
            sessions: create_session_store(),
            clock,
            beacon: Arc::new(RwLock::new(beacon)),
            rewards: Arc::new(rewards),
            proxy: Arc::new(proxy),
            config: Arc::new(config),
        }
    }

    /// Create and store a session. Returns its id.
    pub async fn open_session(&self, flags: AccessibilityFlags) -> Uuid {
        let id = Uuid::new_v4();
        let controller = NavigationController::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.clock),
            self.config.char_delay,
        )
        .with_accessibility(flags);
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        // Leave room for the new entry.
        evict_sessions(
            &mut sessions,
            now,
            self.config.session_idle,
            self.config.max_sessions.saturating_sub(1),
        );
        sessions.insert(
            id,
            CodecSession {
                controller,
                last_touched: now,
            },
        );
        tracing::info!(session_id = %id, live = sessions.len(), "codec session opened");
        id
    }

    pub async fn close_session(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                tracing::info!(session_id = %id, "codec session closed");
                Ok(())
            }
            None => Err(AppError::SessionNotFound(id)),
        }
    }

    /// Run `f` against one session's controller under the store's write lock.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut NavigationController) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        session.last_touched = self.clock.now();
        Ok(f(&mut session.controller))
    }

    /// Drop sessions idle past the configured limit. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;
        evict_sessions(
            &mut sessions,
            now,
            self.config.session_idle,
            self.config.max_sessions,
        )
    }

    /// Sweep idle sessions every `every` until the runtime shuts down.
    pub fn spawn_session_reaper(&self, every: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            loop {
                tick.tick().await;
                let evicted = state.evict_idle().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "idle codec sessions swept");
                }
            }
        })
    }

    /// Record a transmission and fire any unlocked reward.
    pub async fn record_transmission(&self, tuning: &Tuning, easter_egg: Option<&EasterEggMatch>) {
        {
            let mut beacon = self.beacon.write().await;
            if let Tuning::Locked(value) = tuning {
                beacon.frequency.clone_from(value);
            }
            beacon.last_communication = Utc::now();
        }
        if let Some(egg) = easter_egg {
            self.rewards.dispatch(egg);
        }
    }
}

/// Expire sessions idle for `idle` or longer, then drop the least recently
/// used until at most `keep` remain.
fn evict_sessions(
    sessions: &mut HashMap<Uuid, CodecSession>,
    now: Duration,
    idle: Duration,
    keep: usize,
) -> usize {
    let before = sessions.len();
    sessions.retain(|id, session| {
        let alive = now.saturating_sub(session.last_touched) < idle;
        if !alive {
            tracing::info!(session_id = %id, "codec session expired");
        }
        alive
    });
    while sessions.len() > keep {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, session)| session.last_touched)
            .map(|(id, _)| *id);
        match oldest {
            Some(id) => {
                sessions.remove(&id);
                tracing::info!(session_id = %id, "codec session evicted, store full");
            }
            None => break,
        }
    }
    before - sessions.len()
}

/// One handler per reward action. Rewards are rendered client-side, so the
/// server's part is the audit line.
fn reward_dispatcher(registry: &CodecRegistry) -> RewardDispatcher {
    let mut dispatcher = RewardDispatcher::new();
    for pattern in registry.patterns() {
        dispatcher.register(pattern.reward.action.clone(), |egg: &EasterEggMatch| {
            tracing::info!(
                easter_egg = %egg.id,
                reward = %egg.reward.name,
                kind = ?egg.reward.kind,
                "reward dispatched"
            );
        });
    }
    dispatcher
}
