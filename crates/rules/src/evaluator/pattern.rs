//! Regex compilation shared by the evaluator and validation.

use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock, PoisonError};

use lru::LruCache;
use regex::{Regex, RegexBuilder};

/// Compiled size cap. Patterns over it are invalid and never match.
pub const REGEX_SIZE_LIMIT: usize = 1 << 20;

const CACHE_CAPACITY: usize = 256;

/// Compile `pattern` the way the `regex` operator runs it: case-insensitive,
/// bounded by [`REGEX_SIZE_LIMIT`].
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
}

/// Compiled pattern from a process-wide LRU; invalid patterns cache as `None`.
pub(crate) fn cached_pattern(pattern: &str) -> Option<Regex> {
    static CACHE: OnceLock<Mutex<LruCache<String, Option<Regex>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| {
        let cap = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Mutex::new(LruCache::new(cap))
    });

    let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(hit) = cache.get(pattern) {
        return hit.clone();
    }
    let compiled = compile_pattern(pattern).ok();
    cache.put(pattern.to_string(), compiled.clone());
    compiled
}
