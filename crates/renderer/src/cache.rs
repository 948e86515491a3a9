use std::collections::{HashMap, VecDeque};

/// Bounded cache of compiled programs keyed by their source text.
///
/// Eviction is insertion ordered: reads never refresh an entry, and inserting
/// into a full cache drops the entry that was inserted first. `len()` never
/// exceeds `capacity()`.
pub struct ProgramCache<P> {
    capacity: usize,
    entries: HashMap<String, P>,
    order: VecDeque<String>,
    stats: CacheStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl<P: Clone> ProgramCache<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn get(&self, source: &str) -> Option<&P> {
        self.entries.get(source)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns the cached program for `source`, compiling it with `compile`
    /// on a miss. Failed compilations are not cached.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        source: &str,
        compile: impl FnOnce() -> Result<P, E>,
    ) -> Result<P, E> {
        if let Some(program) = self.entries.get(source) {
            self.stats.hits += 1;
            return Ok(program.clone());
        }
        self.stats.misses += 1;
        let program = compile()?;
        self.insert(source, program.clone());
        Ok(program)
    }

    /// Inserts `program`, evicting the oldest entries first if the cache is
    /// full. A zero-capacity cache stores nothing.
    pub fn insert(&mut self, source: &str, program: P) {
        if self.capacity == 0 {
            return;
        }
        if let Some(existing) = self.entries.get_mut(source) {
            *existing = program;
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            tracing::debug!(
                evicted_bytes = oldest.len(),
                capacity = self.capacity,
                "evicted compiled program"
            );
        }
        self.order.push_back(source.to_string());
        self.entries.insert(source.to_string(), program);
    }

    /// Drops every entry and resets the stats.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats = CacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_ok(value: u32) -> impl FnOnce() -> Result<u32, String> {
        move || Ok(value)
    }

    #[test]
    fn evicts_in_insertion_order() {
        let mut cache = ProgramCache::new(2);
        cache.get_or_try_insert_with("a", compile_ok(1)).unwrap();
        cache.get_or_try_insert_with("b", compile_ok(2)).unwrap();
        // Reading "a" must not save it from eviction.
        assert_eq!(cache.get_or_try_insert_with("a", compile_ok(9)), Ok(1));
        cache.get_or_try_insert_with("c", compile_ok(3)).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut cache = ProgramCache::new(3);
        for index in 0..20u32 {
            cache
                .get_or_try_insert_with(&format!("src{index}"), compile_ok(index))
                .unwrap();
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.contains("src19"));
        assert!(cache.contains("src17"));
        assert!(!cache.contains("src16"));
    }

    #[test]
    fn hits_skip_compilation() {
        let mut cache = ProgramCache::new(4);
        cache.get_or_try_insert_with("a", compile_ok(1)).unwrap();
        let again = cache.get_or_try_insert_with("a", || -> Result<u32, String> {
            panic!("compiled twice")
        });
        assert_eq!(again, Ok(1));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache: ProgramCache<u32> = ProgramCache::new(4);
        let result = cache.get_or_try_insert_with("bad", || Err("syntax".to_string()));
        assert_eq!(result, Err("syntax".to_string()));
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let mut cache = ProgramCache::new(0);
        cache.get_or_try_insert_with("a", compile_ok(1)).unwrap();
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = ProgramCache::new(4);
        cache.get_or_try_insert_with("a", compile_ok(1)).unwrap();
        cache.get_or_try_insert_with("b", compile_ok(2)).unwrap();
        cache.get_or_try_insert_with("a", compile_ok(1)).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
        cache.get_or_try_insert_with("c", compile_ok(3)).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().misses, 1);
    }
}
