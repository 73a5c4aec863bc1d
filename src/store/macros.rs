/// Read-through caching over a [`ResponseCache`](crate::store::ResponseCache).
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for a background write with the given TTL (seconds) and
/// returns it. Must be used inside a function returning `AppResult`.
///
/// # Example
/// ```rust,ignore
/// let genres: Vec<Genre> = cached!(self.cache, CacheKey::GenreList(lang), 86_400, async {
///     self.fetch_genres().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get_from_cache(&key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
