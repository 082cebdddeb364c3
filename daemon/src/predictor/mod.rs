mod ollama;
mod openai;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};
use typeahead_core::GenerativeClient;

use crate::config::{ModelBackend, ModelConfig};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Builds the configured generative backend, or `None` when the daemon
/// should run on the built-in tables alone.
pub fn build_generative_client(
    model: &ModelConfig,
    cache_capacity: usize,
) -> Option<Arc<dyn GenerativeClient>> {
    let backend: Arc<dyn GenerativeClient> = match model.backend {
        ModelBackend::Heuristic => return None,
        ModelBackend::Ollama => match OllamaClient::new(model.clone()) {
            Ok(client) => Arc::new(client),
            Err(error) => {
                warn!("failed to init ollama backend, using static tables: {error:#}");
                return None;
            }
        },
        ModelBackend::Openai => match OpenAiClient::new(model.clone()) {
            Ok(client) => Arc::new(client),
            Err(error) => {
                warn!("failed to init openai backend, using static tables: {error:#}");
                return None;
            }
        },
    };
    info!(backend = backend.name(), cache_capacity, "generative backend ready");
    Some(Arc::new(CachedClient::new(backend, cache_capacity)))
}

#[derive(Debug)]
struct PromptCache {
    capacity: usize,
    map: HashMap<String, String>,
    order: VecDeque<String>,
}

impl PromptCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, prompt: &str) -> Option<String> {
        self.map.get(prompt).cloned()
    }

    fn insert(&mut self, prompt: String, reply: String) {
        if self.capacity == 0 {
            return;
        }
        if self.map.contains_key(&prompt) {
            self.map.insert(prompt, reply);
            return;
        }
        if self.map.len() == self.capacity {
            if let Some(front) = self.order.pop_front() {
                self.map.remove(&front);
            }
        }
        self.order.push_back(prompt.clone());
        self.map.insert(prompt, reply);
    }
}

/// Remembers successful replies per prompt, oldest evicted first.
pub struct CachedClient {
    inner: Arc<dyn GenerativeClient>,
    cache: RwLock<PromptCache>,
}

impl CachedClient {
    pub fn new(inner: Arc<dyn GenerativeClient>, capacity: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(PromptCache::new(capacity)),
        }
    }
}

#[async_trait]
impl GenerativeClient for CachedClient {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Some(cached) = self.cache.read().await.get(prompt) {
            return Ok(cached);
        }
        let reply = self.inner.generate(prompt).await?;
        self.cache
            .write()
            .await
            .insert(prompt.to_string(), reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;

    use super::*;

    struct CountingClient {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl GenerativeClient for CountingClient {
        fn name(&self) -> &str {
            "counting"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("boom"));
            }
            Ok(format!("reply to {prompt}"))
        }
    }

    #[tokio::test]
    async fn repeated_prompts_hit_cache() {
        let inner = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let client = CachedClient::new(inner.clone(), 4);

        assert_eq!(client.generate("a").await.unwrap(), "reply to a");
        assert_eq!(client.generate("a").await.unwrap(), "reply to a");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.name(), "counting");
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let client = CachedClient::new(inner.clone(), 4);

        assert!(client.generate("a").await.is_err());
        assert!(client.generate("a").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cache_evicts_oldest() {
        let mut cache = PromptCache::new(2);
        cache.insert("a".into(), "1".into());
        cache.insert("b".into(), "2".into());
        cache.insert("c".into(), "3".into());
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn heuristic_backend_has_no_client() {
        assert!(build_generative_client(&ModelConfig::default(), 8).is_none());
    }

    #[test]
    fn misconfigured_ollama_falls_back_to_none() {
        let model = ModelConfig {
            backend: ModelBackend::Ollama,
            ..ModelConfig::default()
        };
        assert!(build_generative_client(&model, 8).is_none());
    }
}
