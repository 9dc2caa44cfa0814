//! Lightweight global metrics.
//!
//! Потокобезопасные атомарные счётчики подсистем:
//! - страницы (загрузки/записи, сплиты, свежие страницы по эвристике
//!   almost-full)
//! - кэш страниц (hits/misses)
//! - free-список смещений (переиспользования)
//! - восстановление после грязного закрытия

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static PAGE_LOADS: AtomicU64 = AtomicU64::new(0);
static PAGE_WRITES: AtomicU64 = AtomicU64::new(0);
static PAGE_SPLITS: AtomicU64 = AtomicU64::new(0);
static FRESH_PAGES: AtomicU64 = AtomicU64::new(0);

static CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static CACHE_MISSES: AtomicU64 = AtomicU64::new(0);

static FREE_REUSES: AtomicU64 = AtomicU64::new(0);
static DIRTY_RECOVERIES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub page_loads: u64,
    pub page_writes: u64,
    pub page_splits: u64,
    pub fresh_pages: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub free_reuses: u64,
    pub dirty_recoveries: u64,
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        page_loads: PAGE_LOADS.load(Ordering::Relaxed),
        page_writes: PAGE_WRITES.load(Ordering::Relaxed),
        page_splits: PAGE_SPLITS.load(Ordering::Relaxed),
        fresh_pages: FRESH_PAGES.load(Ordering::Relaxed),
        cache_hits: CACHE_HITS.load(Ordering::Relaxed),
        cache_misses: CACHE_MISSES.load(Ordering::Relaxed),
        free_reuses: FREE_REUSES.load(Ordering::Relaxed),
        dirty_recoveries: DIRTY_RECOVERIES.load(Ordering::Relaxed),
    }
}

/// Обнулить счётчики (тесты/бенчи).
pub fn reset() {
    PAGE_LOADS.store(0, Ordering::Relaxed);
    PAGE_WRITES.store(0, Ordering::Relaxed);
    PAGE_SPLITS.store(0, Ordering::Relaxed);
    FRESH_PAGES.store(0, Ordering::Relaxed);
    CACHE_HITS.store(0, Ordering::Relaxed);
    CACHE_MISSES.store(0, Ordering::Relaxed);
    FREE_REUSES.store(0, Ordering::Relaxed);
    DIRTY_RECOVERIES.store(0, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_page_load() {
    PAGE_LOADS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_page_write() {
    PAGE_WRITES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_page_split() {
    PAGE_SPLITS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_fresh_page() {
    FRESH_PAGES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_cache_hit() {
    CACHE_HITS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_cache_miss() {
    CACHE_MISSES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_free_reuse() {
    FREE_REUSES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_dirty_recovery() {
    DIRTY_RECOVERIES.fetch_add(1, Ordering::Relaxed);
}
