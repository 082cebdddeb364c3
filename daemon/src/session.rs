use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use typeahead_core::{SuggestionEngine, TextBuffer};

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";

struct SessionEntry {
    buffer: Arc<Mutex<TextBuffer>>,
    last_used: Instant,
    /// Monotonic use counter; orders entries for least-recently-used eviction.
    touched: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    clock: u64,
}

/// Per-client text buffers. Each buffer has its own lock so requests on one
/// session run one at a time while other sessions proceed.
///
/// Sessions idle for longer than `idle_ttl` are dropped when a new session is
/// opened, and the least recently used one is dropped once `max_sessions` is
/// reached.
pub struct SessionRegistry {
    engine: Arc<SuggestionEngine>,
    sessions: Mutex<Sessions>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn with_limits(
        engine: Arc<SuggestionEngine>,
        idle_ttl: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            engine,
            sessions: Mutex::new(Sessions::default()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Returns the buffer for `id`, creating an empty one on first use.
    pub async fn session(&self, id: &str) -> Arc<Mutex<TextBuffer>> {
        let mut sessions = self.sessions.lock().await;
        sessions.clock += 1;
        let touched = sessions.clock;
        let now = Instant::now();

        if let Some(entry) = sessions.entries.get_mut(id) {
            entry.last_used = now;
            entry.touched = touched;
            return entry.buffer.clone();
        }

        let before = sessions.entries.len();
        let idle_ttl = self.idle_ttl;
        sessions
            .entries
            .retain(|_, entry| now.duration_since(entry.last_used) < idle_ttl);
        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    sessions.entries.remove(&key);
                }
                None => break,
            }
        }
        let evicted = before - sessions.entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.entries.len(), "evicted sessions");
        }

        let buffer = Arc::new(Mutex::new(self.engine.new_session()));
        sessions.entries.insert(
            id.to_string(),
            SessionEntry {
                buffer: buffer.clone(),
                last_used: now,
                touched,
            },
        );
        buffer
    }
}

pub fn session_id_from(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use typeahead_core::{BoundarySet, ComposerConfig, MemoryStore, SuggestionComposer};

    use super::*;

    fn engine() -> Arc<SuggestionEngine> {
        let composer =
            SuggestionComposer::new(Arc::new(MemoryStore::new()), None, ComposerConfig::default());
        Arc::new(SuggestionEngine::new(composer, BoundarySet::default()))
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::with_limits(engine(), Duration::from_secs(60), 16)
    }

    async fn open_ids(registry: &SessionRegistry) -> Vec<String> {
        let mut ids: Vec<String> = registry
            .sessions
            .lock()
            .await
            .entries
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn sessions_are_created_once_and_isolated() {
        let registry = registry();
        let first = registry.session("a").await;
        first.lock().await.insert_char('x');

        let again = registry.session("a").await;
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.lock().await.visible_text(), "x");

        let other = registry.session("b").await;
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(other.lock().await.visible_text(), "");
    }

    #[tokio::test]
    async fn idle_sessions_are_dropped() {
        let registry = SessionRegistry::with_limits(engine(), Duration::ZERO, 100);
        for id in 0..50 {
            registry.session(&format!("one-shot-{id}")).await;
        }
        assert_eq!(open_ids(&registry).await, vec!["one-shot-49".to_string()]);
    }

    #[tokio::test]
    async fn full_registry_drops_least_recently_used() {
        let registry = SessionRegistry::with_limits(engine(), Duration::from_secs(3600), 2);
        let a = registry.session("a").await;
        a.lock().await.insert_char('k');
        registry.session("b").await;
        registry.session("a").await;
        registry.session("c").await;

        assert_eq!(open_ids(&registry).await, vec!["a", "c"]);
        assert_eq!(
            registry.session("a").await.lock().await.visible_text(),
            "k"
        );
    }

    #[test]
    fn header_selects_session() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from(&headers), DEFAULT_SESSION);

        headers.insert(SESSION_HEADER, HeaderValue::from_static("  tab-7 "));
        assert_eq!(session_id_from(&headers), "tab-7");

        headers.insert(SESSION_HEADER, HeaderValue::from_static(""));
        assert_eq!(session_id_from(&headers), DEFAULT_SESSION);
    }
}
