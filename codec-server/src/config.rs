//! Server configuration from environment variables.
//!
//!   CODEC_BIND_ADDR            listen address (default: 0.0.0.0:5000)
//!   CODEC_STATIC_DIR           static asset directory (default: public)
//!   CODEC_DEV_PROXY_TARGET     front-end dev server (default: http://localhost:5173)
//!   CODEC_DEV_PROXY_PREFIX     path prefix routed to the dev server (default: /svelte-app)
//!   CODEC_REGISTRY_PATH        YAML registry override (default: built-in registry)
//!   CODEC_TYPEWRITER_DELAY_MS  per-character reveal delay (default: 50)
//!   CODEC_MAX_SESSIONS         live sessions kept before the least recent is dropped (default: 1000)
//!   CODEC_SESSION_IDLE_SECS    idle time after which a session expires (default: 1800)
//!
//! A `.env` file is honoured via `dotenvy` before these are read.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_PROXY_TARGET: &str = "http://localhost:5173";
const DEFAULT_PROXY_PREFIX: &str = "/svelte-app";
const DEFAULT_DELAY_MS: u64 = 50;
const DEFAULT_MAX_SESSIONS: usize = 1000;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub dev_proxy_target: String,
    pub dev_proxy_prefix: String,
    pub registry_path: Option<PathBuf>,
    pub char_delay: Duration,
    pub max_sessions: usize,
    pub session_idle: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_addr = SocketAddr::from(([0, 0, 0, 0], 5000));
        let bind_addr = match lookup("CODEC_BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    "Invalid CODEC_BIND_ADDR '{}', using default {}: {}",
                    raw,
                    DEFAULT_BIND_ADDR,
                    e
                );
                default_addr
            }),
            None => default_addr,
        };

        let char_delay_ms = match lookup("CODEC_TYPEWRITER_DELAY_MS") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid CODEC_TYPEWRITER_DELAY_MS '{}', using {}ms",
                    raw,
                    DEFAULT_DELAY_MS
                );
                DEFAULT_DELAY_MS
            }),
            None => DEFAULT_DELAY_MS,
        };

        let max_sessions = match lookup("CODEC_MAX_SESSIONS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        "Invalid CODEC_MAX_SESSIONS '{}', using {}",
                        raw,
                        DEFAULT_MAX_SESSIONS
                    );
                    DEFAULT_MAX_SESSIONS
                }
            },
            None => DEFAULT_MAX_SESSIONS,
        };

        let session_idle_secs = match lookup("CODEC_SESSION_IDLE_SECS") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Invalid CODEC_SESSION_IDLE_SECS '{}', using {}s",
                    raw,
                    DEFAULT_SESSION_IDLE_SECS
                );
                DEFAULT_SESSION_IDLE_SECS
            }),
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        let mut dev_proxy_prefix =
            lookup("CODEC_DEV_PROXY_PREFIX").unwrap_or_else(|| DEFAULT_PROXY_PREFIX.to_string());
        if !dev_proxy_prefix.starts_with('/') {
            dev_proxy_prefix.insert(0, '/');
        }
        while dev_proxy_prefix.len() > 1 && dev_proxy_prefix.ends_with('/') {
            dev_proxy_prefix.pop();
        }

        Self {
            bind_addr,
            static_dir: lookup("CODEC_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            dev_proxy_target: lookup("CODEC_DEV_PROXY_TARGET")
                .unwrap_or_else(|| DEFAULT_PROXY_TARGET.to_string())
                .trim_end_matches('/')
                .to_string(),
            dev_proxy_prefix,
            registry_path: lookup("CODEC_REGISTRY_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            char_delay: Duration::from_millis(char_delay_ms),
            max_sessions,
            session_idle: Duration::from_secs(session_idle_secs),
        }
    }
}
