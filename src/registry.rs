//! Strategy registry and instance factory.
//!
//! Owns the provider map, the instance cache, and per-type default
//! overrides. Instances are cached under a deterministic key derived from
//! the type tag and the fully merged parameter set, so two requests with
//! the same effective configuration share one instance regardless of the
//! order the parameters were supplied in.

use crate::backtrack::BacktrackStrategy;
use crate::error::{EngineError, Result};
use crate::genetic::GeneticStrategy;
use crate::greedy::GreedyStrategy;
use crate::heuristic::HeuristicStrategy;
use crate::param::ParamSet;
use crate::strategy::{Strategy, StrategyInfo, StrategyType};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Constructor for fresh strategy instances.
pub type Provider = Arc<dyn Fn() -> Arc<dyn Strategy> + Send + Sync>;

/// Instance-cache counters and contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Cached instances currently held.
    pub size: usize,
    /// Requests served from the cache.
    pub hits: u64,
    /// Requests that built a new instance.
    pub misses: u64,
    /// Cache keys currently held, sorted.
    pub keys: Vec<String>,
}

/// Thread-safe strategy registry.
///
/// All maps are `Mutex`-guarded; locks are never held across a strategy
/// run, only across map bookkeeping.
pub struct StrategyRegistry {
    providers: Mutex<HashMap<StrategyType, Provider>>,
    cache: Mutex<HashMap<String, Arc<dyn Strategy>>>,
    defaults: Mutex<HashMap<StrategyType, ParamSet>>,
    stats: Mutex<CacheStatistics>,
}

impl StrategyRegistry {
    /// Creates an empty registry with no providers.
    pub fn new() -> Self {
        Self {
            providers: Mutex::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            defaults: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStatistics::default()),
        }
    }

    /// Creates a registry with the four built-in strategies installed.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(StrategyType::Greedy, Arc::new(|| Arc::new(GreedyStrategy::new())));
        registry.register(StrategyType::Genetic, Arc::new(|| Arc::new(GeneticStrategy::new())));
        registry.register(
            StrategyType::Backtrack,
            Arc::new(|| Arc::new(BacktrackStrategy::new())),
        );
        registry.register(
            StrategyType::Heuristic,
            Arc::new(|| Arc::new(HeuristicStrategy::new())),
        );
        registry
    }

    /// Installs a provider for a type, replacing any existing one.
    ///
    /// Replacing a provider evicts that type's cached instances so stale
    /// builds cannot be handed out.
    pub fn register(&self, kind: StrategyType, provider: Provider) {
        let replaced = self
            .providers
            .lock()
            .expect("provider map poisoned")
            .insert(kind, provider)
            .is_some();
        if replaced {
            self.evict(kind);
        }
        info!(%kind, replaced, "strategy provider registered");
    }

    /// Removes a provider and evicts its cached instances.
    ///
    /// Returns whether a provider was installed.
    pub fn unregister(&self, kind: StrategyType) -> bool {
        let removed = self
            .providers
            .lock()
            .expect("provider map poisoned")
            .remove(&kind)
            .is_some();
        if removed {
            self.evict(kind);
            info!(%kind, "strategy provider unregistered");
        }
        removed
    }

    /// Returns a ready-to-run instance for the type and parameters.
    ///
    /// Caller parameters are overlaid on the registry's per-type default
    /// overrides, which are overlaid on the strategy's declared defaults.
    /// The merged set is validated by the instance; a cache hit reuses the
    /// instance initialized under the same key.
    pub fn get_or_create(&self, kind: StrategyType, params: &ParamSet) -> Result<Arc<dyn Strategy>> {
        let provider = self
            .providers
            .lock()
            .expect("provider map poisoned")
            .get(&kind)
            .cloned()
            .ok_or_else(|| EngineError::UnsupportedType(kind.to_string()))?;

        // Declared defaults live on the instance, so one is always built
        // to compute the merged set; on a hit it is discarded in favor of
        // the cached twin.
        let instance = provider();
        let mut base = ParamSet::defaults_of(&instance.param_specs());
        if let Some(overrides) = self.defaults.lock().expect("defaults map poisoned").get(&kind) {
            base = overrides.merge_over(&base);
        }
        let merged = params.merge_over(&base);
        let key = merged.cache_key(kind.as_str());

        let cached = self
            .cache
            .lock()
            .expect("instance cache poisoned")
            .get(&key)
            .cloned();
        if let Some(cached) = cached {
            self.stats.lock().expect("cache stats poisoned").hits += 1;
            debug!(%kind, key, "strategy cache hit");
            return Ok(cached);
        }

        // Insert only after initialize succeeds; a failed build is never
        // observable through the cache.
        if !merged.is_empty() {
            instance.initialize(&merged)?;
        }
        // Check-and-insert is one critical section: when two callers miss
        // concurrently, the first insert wins and both callers receive
        // the cached instance.
        let (shared, size) = {
            let mut cache = self.cache.lock().expect("instance cache poisoned");
            let entry = cache
                .entry(key.clone())
                .or_insert_with(|| Arc::clone(&instance));
            (Arc::clone(entry), cache.len())
        };
        let mut stats = self.stats.lock().expect("cache stats poisoned");
        stats.misses += 1;
        stats.size = size;
        drop(stats);
        debug!(%kind, key, "strategy instance built");
        Ok(shared)
    }

    /// Metadata for one registered type. Never starts execution.
    pub fn describe(&self, kind: StrategyType) -> Result<StrategyInfo> {
        let provider = self
            .providers
            .lock()
            .expect("provider map poisoned")
            .get(&kind)
            .cloned()
            .ok_or_else(|| EngineError::UnsupportedType(kind.to_string()))?;
        let instance = provider();
        Ok(StrategyInfo {
            kind: instance.kind(),
            name: instance.name(),
            description: instance.description(),
            complexity: instance.complexity(),
            scenarios: instance.applicable_scenarios(),
            params: instance.param_specs(),
        })
    }

    /// Metadata for every registered type, in type-tag order.
    pub fn describe_all(&self) -> Vec<StrategyInfo> {
        let mut kinds: Vec<StrategyType> = self
            .providers
            .lock()
            .expect("provider map poisoned")
            .keys()
            .copied()
            .collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
            .into_iter()
            .filter_map(|kind| self.describe(kind).ok())
            .collect()
    }

    /// Drops every cached instance. Counters are preserved.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().expect("instance cache poisoned");
        let dropped = cache.len();
        cache.clear();
        drop(cache);
        self.stats.lock().expect("cache stats poisoned").size = 0;
        debug!(dropped, "strategy cache cleared");
    }

    /// Current cache counters and held keys.
    pub fn cache_statistics(&self) -> CacheStatistics {
        let mut stats = self.stats.lock().expect("cache stats poisoned").clone();
        let cache = self.cache.lock().expect("instance cache poisoned");
        stats.size = cache.len();
        stats.keys = cache.keys().cloned().collect();
        stats.keys.sort();
        stats
    }

    /// Installs per-type default overrides applied under caller parameters.
    pub fn set_defaults(&self, kind: StrategyType, defaults: ParamSet) {
        self.defaults
            .lock()
            .expect("defaults map poisoned")
            .insert(kind, defaults);
        // Cached instances were built under the old defaults.
        self.evict(kind);
    }

    /// The per-type default overrides, if any were set.
    pub fn get_defaults(&self, kind: StrategyType) -> Option<ParamSet> {
        self.defaults
            .lock()
            .expect("defaults map poisoned")
            .get(&kind)
            .cloned()
    }

    fn evict(&self, kind: StrategyType) {
        let prefix = format!("{kind}:");
        let mut cache = self.cache.lock().expect("instance cache poisoned");
        cache.retain(|key, _| !key.starts_with(&prefix));
        let size = cache.len();
        drop(cache);
        self.stats.lock().expect("cache stats poisoned").size = size;
        debug!(%kind, "cached instances evicted");
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::State;
    use crate::model::{Employee, ScheduleRequest, Shift};

    #[test]
    fn test_builtins_installed() {
        let registry = StrategyRegistry::with_builtins();
        for kind in StrategyType::ALL {
            assert!(registry.describe(kind).is_ok(), "{kind} missing");
        }
        assert_eq!(registry.describe_all().len(), 4);
    }

    #[test]
    fn test_cache_key_order_independent_reuse() {
        let registry = StrategyRegistry::with_builtins();
        let a = registry
            .get_or_create(
                StrategyType::Greedy,
                &ParamSet::new()
                    .with("maxIterations", 500i64)
                    .with("timeLimitMs", 1000i64),
            )
            .unwrap();
        let b = registry
            .get_or_create(
                StrategyType::Greedy,
                &ParamSet::new()
                    .with("timeLimitMs", 1000i64)
                    .with("maxIterations", 500i64),
            )
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let stats = registry.cache_statistics();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_concurrent_misses_share_one_instance() {
        let registry = Arc::new(StrategyRegistry::with_builtins());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry
                    .get_or_create(
                        StrategyType::Greedy,
                        &ParamSet::new().with("maxIterations", 77i64),
                    )
                    .unwrap()
            }));
        }
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        // Whoever inserts first wins; every caller gets that instance.
        for other in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], other));
        }
        assert_eq!(registry.cache_statistics().size, 1);
    }

    #[test]
    fn test_distinct_params_distinct_instances() {
        let registry = StrategyRegistry::with_builtins();
        let a = registry.get_or_create(StrategyType::Greedy, &ParamSet::new()).unwrap();
        let b = registry
            .get_or_create(StrategyType::Greedy, &ParamSet::new().with("maxIterations", 9i64))
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.cache_statistics().size, 2);
    }

    #[test]
    fn test_unregister_evicts_and_rejects() {
        let registry = StrategyRegistry::with_builtins();
        registry.get_or_create(StrategyType::Genetic, &ParamSet::new()).unwrap();
        assert_eq!(registry.cache_statistics().size, 1);

        assert!(registry.unregister(StrategyType::Genetic));
        assert_eq!(registry.cache_statistics().size, 0);
        assert!(matches!(
            registry.get_or_create(StrategyType::Genetic, &ParamSet::new()),
            Err(EngineError::UnsupportedType(_))
        ));
        // Other types are untouched.
        assert!(registry.get_or_create(StrategyType::Greedy, &ParamSet::new()).is_ok());
    }

    #[test]
    fn test_unregister_missing_is_false() {
        let registry = StrategyRegistry::new();
        assert!(!registry.unregister(StrategyType::Greedy));
    }

    #[test]
    fn test_invalid_params_never_cached() {
        let registry = StrategyRegistry::with_builtins();
        let err = registry
            .get_or_create(StrategyType::Genetic, &ParamSet::new().with("crossoverRate", 1.5))
            .err()
            .expect("out-of-bounds crossoverRate must not build an instance");
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(registry.cache_statistics().size, 0);
    }

    #[test]
    fn test_defaults_override_layering() {
        let registry = StrategyRegistry::with_builtins();
        registry.set_defaults(
            StrategyType::Greedy,
            ParamSet::new().with("maxIterations", 42i64),
        );
        assert_eq!(
            registry
                .get_defaults(StrategyType::Greedy)
                .unwrap()
                .get_i64("maxIterations", 0),
            42
        );

        // Registry override beats the declared default; caller beats both.
        let merged_key_default = registry
            .get_or_create(StrategyType::Greedy, &ParamSet::new())
            .unwrap();
        assert!(Arc::ptr_eq(
            &merged_key_default,
            &registry
                .get_or_create(StrategyType::Greedy, &ParamSet::new().with("maxIterations", 42i64))
                .unwrap()
        ));

        let caller_wins = registry
            .get_or_create(StrategyType::Greedy, &ParamSet::new().with("maxIterations", 7i64))
            .unwrap();
        assert!(!Arc::ptr_eq(&merged_key_default, &caller_wins));
    }

    #[test]
    fn test_set_defaults_evicts_stale_instances() {
        let registry = StrategyRegistry::with_builtins();
        let before = registry.get_or_create(StrategyType::Greedy, &ParamSet::new()).unwrap();
        registry.set_defaults(StrategyType::Greedy, ParamSet::new().with("maxIterations", 5i64));
        let after = registry.get_or_create(StrategyType::Greedy, &ParamSet::new()).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_clear_cache() {
        let registry = StrategyRegistry::with_builtins();
        registry.get_or_create(StrategyType::Greedy, &ParamSet::new()).unwrap();
        registry.get_or_create(StrategyType::Heuristic, &ParamSet::new()).unwrap();
        assert_eq!(registry.cache_statistics().size, 2);

        registry.clear_cache();
        let stats = registry.cache_statistics();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.misses, 2); // counters survive
    }

    #[test]
    fn test_describe_never_runs() {
        let registry = StrategyRegistry::with_builtins();
        let info = registry.describe(StrategyType::Backtrack).unwrap();
        assert_eq!(info.kind, StrategyType::Backtrack);
        assert!(!info.params.is_empty());
        assert_eq!(registry.cache_statistics().size, 0);
    }

    #[test]
    fn test_register_replacement_evicts() {
        let registry = StrategyRegistry::with_builtins();
        let before = registry.get_or_create(StrategyType::Greedy, &ParamSet::new()).unwrap();
        registry.register(StrategyType::Greedy, Arc::new(|| Arc::new(GreedyStrategy::new())));
        let after = registry.get_or_create(StrategyType::Greedy, &ParamSet::new()).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_cached_instance_is_runnable() {
        let registry = StrategyRegistry::with_builtins();
        let strategy = registry
            .get_or_create(StrategyType::Greedy, &ParamSet::new().with("timeLimitMs", 5000i64))
            .unwrap();
        let request = ScheduleRequest::new(
            vec![Employee::new("A"), Employee::new("B")],
            vec![Shift::new("DAY", 480, 960)],
            2,
        );
        let result = strategy.generate_schedule(&request).unwrap();
        assert!(result.is_fully_staffed());
        assert_eq!(strategy.status(), State::Completed);
    }
}
