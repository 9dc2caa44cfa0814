//! Сканы: минимум/максимум, полный обход, диапазон.

use anyhow::Result;

use crate::consts::MAX_OFFSET;
use crate::errors::IndexError;
use crate::key::{FixedKey, KeyRecord};

use super::BTreeIndex;

impl<K: FixedKey> BTreeIndex<K> {
    /// Минимальная запись дерева (первая страница каталога).
    pub fn get_minimum(&mut self) -> Result<Option<KeyRecord<K>>> {
        self.ensure_open()?;
        let Some((_, off)) = self.directory.first() else {
            return Ok(None);
        };
        let page = self.page_mut(off)?;
        match page.min() {
            Some(m) => Ok(Some(m)),
            None => Err(IndexError::CorruptBTree.into()),
        }
    }

    /// Максимальная запись дерева (последняя страница каталога).
    pub fn get_maximum(&mut self) -> Result<Option<KeyRecord<K>>> {
        self.ensure_open()?;
        let Some((_, off)) = self.directory.last() else {
            return Ok(None);
        };
        let page = self.page_mut(off)?;
        match page.max() {
            Some(m) => Ok(Some(m)),
            None => Err(IndexError::CorruptBTree.into()),
        }
    }

    /// Все записи дерева по возрастанию — по странице за раз, в порядке
    /// каталога.
    pub fn get_all_keys(&mut self, sink: &mut Vec<KeyRecord<K>>) -> Result<()> {
        self.ensure_open()?;
        for (_, off) in self.directory.entries() {
            let page = self.page_mut(off)?;
            page.all_keys(sink)?;
        }
        Ok(())
    }

    /// Записи с ключами в [lo, hi] по возрастанию. Нулевой offset нижней
    /// границы и максимальный верхней делают границы независимыми от
    /// конкретных offset.
    pub fn search_for_range(&mut self, lo: K, hi: K, sink: &mut Vec<KeyRecord<K>>) -> Result<()> {
        self.ensure_open()?;
        let lo_rec = KeyRecord::new(lo, 0);
        let hi_rec = KeyRecord::new(hi, MAX_OFFSET);
        for (dir_key, off) in self.directory.entries_from(&lo_rec) {
            if hi_rec < dir_key {
                break;
            }
            let page = self.page_mut(off)?;
            page.search_range(&lo_rec, &hi_rec, sink)?;
        }
        Ok(())
    }
}
