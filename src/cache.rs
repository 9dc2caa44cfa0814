//! Кэш страниц: ограниченный набор резидентных страниц с write-back.
//!
//! Вытеснение — простой clock: по промаху курсор идёт по кругу и первая
//! занятая ячейка вытесняется (с записью на диск, если страница грязная).
//! Вытесненная страница возвращается вызывающему — дерево переиспользует её
//! аллокацию под следующую страницу. Счётчики attempts/hits дают наблюдаемый
//! hit-rate.

use std::fs::File;

use anyhow::Result;

use crate::consts::MIN_CACHE_PAGES;
use crate::header::HeaderDirectory;
use crate::key::FixedKey;
use crate::metrics;
use crate::page::Page;

pub struct PageCache<K: FixedKey> {
    slots: Vec<Option<Page<K>>>,
    cursor: usize,
    attempts: u64,
    hits: u64,
}

impl<K: FixedKey> PageCache<K> {
    pub fn new(size: usize) -> Self {
        let size = size.max(MIN_CACHE_PAGES);
        let mut slots = Vec::with_capacity(size);
        slots.resize_with(size, || None);
        Self {
            slots,
            cursor: 0,
            attempts: 0,
            hits: 0,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Учитываемая попытка обращения: true — страница в кэше.
    pub fn probe(&mut self, offset: u32) -> bool {
        self.attempts += 1;
        let hit = self.position(offset).is_some();
        if hit {
            self.hits += 1;
            metrics::record_cache_hit();
        } else {
            metrics::record_cache_miss();
        }
        hit
    }

    pub fn get_mut(&mut self, offset: u32) -> Option<&mut Page<K>> {
        let at = self.position(offset)?;
        self.slots[at].as_mut()
    }

    /// Поместить страницу в кэш. Если выбрана занятая ячейка, её страница
    /// пишется на диск (если грязная) и возвращается вызывающему как
    /// свободная аллокация.
    pub fn insert(&mut self, page: Page<K>, file: &mut File) -> Result<Option<Page<K>>> {
        // свободная ячейка, если есть
        let n = self.slots.len();
        for probe in 0..n {
            let at = (self.cursor + probe) % n;
            if self.slots[at].is_none() {
                self.slots[at] = Some(page);
                return Ok(None);
            }
        }
        // clock: вытеснить ячейку под курсором
        let at = self.cursor;
        self.cursor = (self.cursor + 1) % n;
        match self.slots[at].take() {
            Some(mut victim) => {
                if let Err(e) = victim.save(file) {
                    // жертва остаётся в кэше грязной, следующий flush повторит
                    self.slots[at] = Some(victim);
                    return Err(e);
                }
                self.slots[at] = Some(page);
                Ok(Some(victim))
            }
            None => {
                self.slots[at] = Some(page);
                Ok(None)
            }
        }
    }

    /// Выбросить страницу без записи (её смещение ушло во free-список,
    /// устаревшие байты безразличны).
    pub fn remove(&mut self, offset: u32) {
        if let Some(at) = self.position(offset) {
            self.slots[at] = None;
        }
    }

    /// Записать все грязные страницы, сверив каждую с каталогом: запись по
    /// смещению страницы должна существовать и её ключ — совпадать с текущим
    /// минимумом страницы. false — расхождение (сигнал порчи), ничего не
    /// пишется и кэш не очищается.
    pub fn clear(&mut self, dir: &HeaderDirectory<K>, file: &mut File) -> Result<bool> {
        for slot in self.slots.iter_mut() {
            if let Some(page) = slot.as_mut() {
                let min = page.min();
                match (dir.key_for_offset(page.file_offset()), min) {
                    (Some(dir_key), Some(page_min)) if dir_key == page_min => {}
                    _ => return Ok(false),
                }
            }
        }
        for slot in self.slots.iter_mut() {
            if let Some(page) = slot.as_mut() {
                page.save(file)?;
            }
            *slot = None;
        }
        self.cursor = 0;
        Ok(true)
    }

    /// Выбросить всё без записи.
    pub fn clear_without_saving(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.cursor = 0;
    }

    /// Изменить ёмкость (минимум 2). Страницы, не поместившиеся в новый
    /// размер, пишутся на диск и выбрасываются.
    pub fn set_size(&mut self, size: usize, file: &mut File) -> Result<()> {
        let size = size.max(MIN_CACHE_PAGES);
        if size == self.slots.len() {
            return Ok(());
        }
        let mut pages: Vec<Page<K>> = self.slots.drain(..).flatten().collect();
        self.slots.resize_with(size, || None);
        let extras = pages.split_off(pages.len().min(size));
        for (slot, page) in self.slots.iter_mut().zip(pages) {
            *slot = Some(page);
        }
        for mut extra in extras {
            extra.save(file)?;
        }
        self.cursor = 0;
        Ok(())
    }

    pub fn hit_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.hits as f64 / self.attempts as f64
        }
    }

    #[inline]
    fn position(&self, offset: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Some(p) if p.file_offset() == offset))
    }
}
