/// Read-through caching around an async computation.
///
/// Returns the cached value for `$key` when present. On a miss, or when Redis
/// cannot be reached, awaits `$block`, queues the result for a background
/// write with `$ttl` seconds to live and returns it. The write is skipped if
/// the cache was invalidated while `$block` ran. Errors from `$block` are
/// propagated with `?`.
///
/// # Example
/// ```rust,ignore
/// let genres: AppResult<Vec<String>> = cached!(cache, CacheKey::Genres, 300, async {
///     store.list_genres().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let generation = $cache.generation();
        match $cache.get_from_cache(&$key).await {
            Ok(Some(hit)) => Ok(hit),
            outcome => {
                if let Err(e) = outcome {
                    tracing::warn!(key = %$key, error = %e, "Cache read failed, computing value");
                }
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl, generation);
                Ok(value)
            }
        }
    }};
}
