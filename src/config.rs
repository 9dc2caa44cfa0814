//! Конфигурация индекса.
//!
//! Один объект с настройками вместо разбросанных чтений окружения.
//! `IndexConfig::from_env()` читает переменные TIX_*, fluent-сеттеры
//! позволяют переопределить поля точечно; конфиг потребляется один раз
//! при создании дерева (`BTreeIndex::with_config`).

use crate::consts::{DEFAULT_CACHE_PAGES, MIN_CACHE_PAGES};

#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Ёмкость кэша страниц (минимум 2).
    /// Env: TIX_PAGE_CACHE_PAGES (default 16)
    pub cache_pages: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cache_pages: DEFAULT_CACHE_PAGES,
        }
    }
}

impl IndexConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("TIX_PAGE_CACHE_PAGES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.cache_pages = n.max(MIN_CACHE_PAGES);
            }
        }
        cfg
    }

    pub fn with_cache_pages(mut self, pages: usize) -> Self {
        self.cache_pages = pages.max(MIN_CACHE_PAGES);
        self
    }
}
