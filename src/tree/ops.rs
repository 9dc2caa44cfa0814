//! Точечные операции: вставка, удаление, аллокация страниц.

use anyhow::{anyhow, Result};
use log::warn;

use crate::errors::IndexError;
use crate::key::{FixedKey, KeyRecord};
use crate::metrics;
use crate::page::Page;

use super::{open_file, take_handle, BTreeIndex};

impl<K: FixedKey> BTreeIndex<K> {
    /// Вставить пару (key, offset). Дубли ключа с разными offset допустимы;
    /// пара (key, offset) уникальна на дерево.
    pub fn insert(&mut self, key: K, offset: i32) -> Result<()> {
        self.ensure_open()?;
        let rec = KeyRecord::new(key, offset);
        self.key_count += 1;

        let Some((dir_key, page_off)) = self.directory.route(&rec) else {
            // каталог пуст — первая страница дерева
            let mut page = self.alloc_page()?;
            let off = page.file_offset();
            page.insert(rec);
            self.install(page)?;
            self.directory.set(rec, off);
            return Ok(());
        };

        let (is_full, almost, pmin, pmax) = {
            let page = self.page_mut(page_off)?;
            (page.is_full(), page.is_almost_full(), page.min(), page.max())
        };

        if !is_full {
            if almost {
                let (min, max) = match (pmin, pmax) {
                    (Some(mn), Some(mx)) => (mn, mx),
                    _ => return Err(IndexError::CorruptBTree.into()),
                };
                // Почти полная страница и ключ вне её [min, max]: открыть
                // новую страницу вместо будущего сплита. На частично
                // упорядоченных вставках это почти все случаи.
                if rec > max || rec < min {
                    let mut fresh = self.alloc_page()?;
                    let fresh_off = fresh.file_offset();
                    fresh.insert(rec);
                    self.install(fresh)?;
                    self.directory.set(rec, fresh_off);
                    metrics::record_fresh_page();
                    return Ok(());
                }
            }
            let page = self.page_mut(page_off)?;
            page.insert(rec);
        } else {
            // Сплит: правая страница получает записи больше пивота и
            // регистрируется под своим новым минимумом.
            let mut right = self.alloc_page()?;
            let right_off = right.file_offset();
            let right_min = {
                let page = self.page_mut(page_off)?;
                page.split(&mut right);
                match right.min() {
                    Some(m) => m,
                    None => return Err(IndexError::CorruptBTree.into()),
                }
            };
            self.directory.set(right_min, right_off);
            if rec < right_min {
                let page = self.page_mut(page_off)?;
                page.insert(rec);
                self.install(right)?;
            } else {
                right.insert(rec);
                self.install(right)?;
                // минимум левой страницы не менялся — перепрописка не нужна
                return Ok(());
            }
        }

        // новый ключ стал минимумом страницы — перепрописать каталог
        if rec < dir_key {
            self.directory.remove(&dir_key);
            self.directory.set(rec, page_off);
        }
        Ok(())
    }

    /// Удалить пару (key, offset); false — её не было. Опустевшая страница
    /// снимается с каталога и кэша, её смещение уходит во free-список.
    pub fn delete(&mut self, key: K, offset: i32) -> Result<bool> {
        self.ensure_open()?;
        let rec = KeyRecord::new(key, offset);
        let Some((dir_key, page_off)) = self.directory.route(&rec) else {
            return Ok(false);
        };

        let (deleted, remaining, new_min) = {
            let page = self.page_mut(page_off)?;
            if !page.delete(&rec) {
                (false, 0, None)
            } else {
                let c = page.count();
                let m = if c > 0 { page.min() } else { None };
                (true, c, m)
            }
        };
        if !deleted {
            return Ok(false);
        }
        self.key_count -= 1;

        if remaining == 0 {
            self.free_offsets.push(page_off);
            self.cache.remove(page_off);
            self.directory.remove(&dir_key);
        } else if let Some(new_min) = new_min {
            // минимум вырос — удалённый ключ был минимумом страницы
            if rec < new_min {
                self.directory.remove(&rec);
                self.directory.set(new_min, page_off);
            }
        }
        Ok(true)
    }

    // ---- доступ к страницам через кэш ----

    /// Страница по смещению: из кэша либо с диска (с помещением в кэш).
    pub(crate) fn page_mut(&mut self, offset: u32) -> Result<&mut Page<K>> {
        if !self.cache.probe(offset) {
            let file = open_file(&mut self.file)?;
            let mut page = take_handle(&mut self.free_page, offset);
            if !page.load(file)? {
                warn!(
                    "page at offset {} has no valid image; treating as empty",
                    offset
                );
            }
            self.loaded_pages += 1;
            if let Some(victim) = self.cache.insert(page, file)? {
                self.free_page = Some(victim);
            }
        }
        self.cache
            .get_mut(offset)
            .ok_or_else(|| anyhow!("page at offset {} vanished from cache", offset))
    }

    /// Свежая пустая страница: смещение — из free-списка либо конец файла
    /// (в этом случае страница сразу записывается, чтобы файл вырос до
    /// следующей аллокации). Страница НЕ помещается в кэш — это делает
    /// вызывающий через `install` после заполнения.
    fn alloc_page(&mut self) -> Result<Page<K>> {
        let file = open_file(&mut self.file)?;
        match self.free_offsets.pop() {
            Some(off) => {
                let mut page = take_handle(&mut self.free_page, off);
                page.clear();
                metrics::record_free_reuse();
                Ok(page)
            }
            None => {
                let off = file.metadata()?.len() as u32;
                let mut page = take_handle(&mut self.free_page, off);
                page.clear();
                page.save(file)?;
                Ok(page)
            }
        }
    }

    /// Поместить страницу в кэш; вытесненная аллокация сохраняется для
    /// переиспользования.
    fn install(&mut self, page: Page<K>) -> Result<()> {
        let file = open_file(&mut self.file)?;
        if let Some(victim) = self.cache.insert(page, file)? {
            self.free_page = Some(victim);
        }
        Ok(())
    }
}
