//! Фасад индекса: маршрутизация операций, жизненный цикл файла, сплиты.
//!
//! Раскладка:
//! - mod.rs — структура, конструкторы, аксессоры, статус
//! - open.rs — open/close/clear/flush (протокол shutdown-байта)
//! - ops.rs — insert/delete, аллокация страниц, доступ через кэш
//! - scan.rs — min/max, полный скан, скан диапазона

mod open;
mod ops;
mod scan;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::cache::PageCache;
use crate::config::IndexConfig;
use crate::consts::MAX_KEYS_IN_PAGE;
use crate::errors::IndexError;
use crate::free::FreeOffsets;
use crate::header::HeaderDirectory;
use crate::key::{FixedKey, KeyShape};
use crate::page::Page;

/// Одно B-дерево на выделенном файле: упорядоченные пары (ключ, offset
/// записи) с точечными вставками/удалениями, сканами и протоколом
/// чистого закрытия. Один писатель, внешняя сериализация вызовов.
pub struct BTreeIndex<K: FixedKey> {
    path: PathBuf,
    file: Option<File>,
    directory: HeaderDirectory<K>,
    cache: PageCache<K>,
    free_offsets: FreeOffsets,
    // вытесненная страница, чья аллокация ждёт переиспользования
    free_page: Option<Page<K>>,
    key_count: u32,
    loaded_pages: u64,
}

impl<K: FixedKey> BTreeIndex<K> {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_config(path, IndexConfig::from_env())
    }

    pub fn with_config<P: AsRef<Path>>(path: P, cfg: IndexConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
            directory: HeaderDirectory::new(),
            cache: PageCache::new(cfg.cache_pages),
            free_offsets: FreeOffsets::new(),
            free_page: None,
            key_count: 0,
            loaded_pages: 0,
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Число ключей в дереве.
    #[inline]
    pub fn count(&self) -> u32 {
        self.key_count
    }

    /// Максимум ключей на странице.
    #[inline]
    pub fn max_count(&self) -> usize {
        MAX_KEYS_IN_PAGE
    }

    /// Размер образа страницы на диске для этой формы ключа.
    #[inline]
    pub fn page_size(&self) -> usize {
        Page::<K>::DISK_SIZE
    }

    #[inline]
    pub fn key_shape(&self) -> KeyShape {
        K::SHAPE
    }

    /// Сколько страниц было загружено с диска.
    #[inline]
    pub fn loaded_pages_count(&self) -> u64 {
        self.loaded_pages
    }

    #[inline]
    pub fn get_cache_size(&self) -> usize {
        self.cache.size()
    }

    pub fn cache_hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }

    /// Изменить ёмкость кэша (минимум 2); лишние страницы пишутся на диск.
    pub fn set_cache_size(&mut self, pages: usize) -> Result<()> {
        match self.file.as_mut() {
            Some(file) => self.cache.set_size(pages, file),
            None => {
                // закрытое дерево держит пустой кэш — просто пересоздать
                self.cache = PageCache::new(pages);
                Ok(())
            }
        }
    }

    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            path: self.path.display().to_string(),
            key_shape: K::SHAPE.name().to_string(),
            open: self.is_open(),
            key_count: self.key_count,
            pages: self.directory.len(),
            free_pages: self.free_offsets.len(),
            page_size: Page::<K>::DISK_SIZE,
            cache_pages: self.cache.size(),
            cached_pages: self.cache.occupied(),
            cache_hit_rate: self.cache.hit_rate(),
            loaded_pages: self.loaded_pages,
        }
    }

    #[inline]
    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.file.is_some() {
            Ok(())
        } else {
            Err(IndexError::Closed.into())
        }
    }

    /// Тестовый хук: выкинуть минимальную запись первой страницы в обход
    /// каталога — имитирует порчу резидентной страницы; следующий flush
    /// обязан заметить расхождение.
    #[doc(hidden)]
    pub fn debug_corrupt_resident_page(&mut self) -> Result<bool> {
        let Some((_, off)) = self.directory.first() else {
            return Ok(false);
        };
        let page = self.page_mut(off)?;
        let Some(min) = page.min() else {
            return Ok(false);
        };
        Ok(page.delete(&min))
    }
}

/// Сводка состояния индекса (для status/JSON).
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub path: String,
    pub key_shape: String,
    pub open: bool,
    pub key_count: u32,
    pub pages: usize,
    pub free_pages: usize,
    pub page_size: usize,
    pub cache_pages: usize,
    pub cached_pages: usize,
    pub cache_hit_rate: f64,
    pub loaded_pages: u64,
}

/// Доступ к файлу открытого дерева; на закрытом — `Closed`.
/// Свободная функция, чтобы заём касался только поля `file`.
pub(crate) fn open_file(file: &mut Option<File>) -> Result<&mut File> {
    file.as_mut()
        .ok_or_else(|| anyhow::Error::new(IndexError::Closed))
}

/// Достать переиспользуемую аллокацию страницы либо создать новую.
pub(crate) fn take_handle<K: FixedKey>(free_page: &mut Option<Page<K>>, offset: u32) -> Page<K> {
    match free_page.take() {
        Some(mut page) => {
            page.set_file_offset(offset);
            page
        }
        None => Page::new(offset),
    }
}
