#![allow(non_snake_case)]

// Базовые модули
pub mod config;
pub mod consts;
pub mod errors;
pub mod key;
pub mod metrics;

// Движок
pub mod cache; // src/cache.rs — кэш страниц (clock, write-back)
pub mod free; // src/free.rs — free-список смещений
pub mod header; // src/header.rs — каталог страниц
pub mod page; // src/page/{mod,slots,rbtree}.rs — страница с RB-деревом
pub mod tree; // src/tree/{mod,open,ops,scan}.rs — фасад

// Удобные реэкспорты
pub use config::IndexConfig;
pub use errors::IndexError;
pub use key::{FixedKey, KeyRecord, KeyShape, Timestamp, F64};
pub use tree::{BTreeIndex, IndexStatus};
