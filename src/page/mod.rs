//! Страница индекса: контейнер фиксированного размера на N ключей.
//!
//! Внутри — красно-чёрное дерево поверх inline-массива слотов (индексы, не
//! указатели): слот 0 — null-объект, слот 1 — служебные поля, слоты 2..N+1 —
//! записи. Свободные слоты связаны в список через поле `right`.
//!
//! Образ страницы на диске — её явная сериализация слот за слотом (LE, без
//! паддинга), см. slots.rs. Перед записью поле корневого индекса XOR-ится с
//! PAGE_MAGIC; при чтении совпадение верхних 22 бит поля с магией отличает
//! записанную страницу от мусора.

mod rbtree;
mod slots;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use anyhow::{Context, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{ALMOST_FULL_PAGE_SIZE, MAX_KEYS_IN_PAGE, PAGE_MAGIC, SLOTS_IN_PAGE};
use crate::errors::IndexError;
use crate::key::{FixedKey, KeyRecord};
use crate::metrics;

use slots::Slot;

pub struct Page<K: FixedKey> {
    slots: Vec<Slot<K>>,
    file_offset: u32,
    dirty: bool,
    // кэш индексов минимума/максимума; 0 — не вычислено
    min_idx: u16,
    max_idx: u16,
}

impl<K: FixedKey> Page<K> {
    /// Размер образа страницы на диске.
    pub const DISK_SIZE: usize = SLOTS_IN_PAGE * Slot::<K>::DISK_SIZE;

    // позиция поля корневого индекса (offset-поле слота 1) в образе
    const ROOT_FIELD_POS: usize = Slot::<K>::DISK_SIZE + K::SIZE;

    pub fn new(file_offset: u32) -> Self {
        Self {
            slots: vec![Slot::default(); SLOTS_IN_PAGE],
            file_offset,
            dirty: true,
            min_idx: 0,
            max_idx: 0,
        }
    }

    #[inline]
    pub fn file_offset(&self) -> u32 {
        self.file_offset
    }

    pub fn set_file_offset(&mut self, offset: u32) {
        if self.file_offset != offset {
            self.file_offset = offset;
            self.dirty = true;
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.slots[1].parent as usize
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count() == MAX_KEYS_IN_PAGE
    }

    #[inline]
    pub fn is_almost_full(&self) -> bool {
        self.count() >= ALMOST_FULL_PAGE_SIZE
    }

    /// Сброс в пустое состояние. Достаточно очистить два служебных слота;
    /// данные в остальных становятся недостижимыми.
    pub fn clear(&mut self) {
        self.slots[0] = Slot::default();
        self.slots[1] = Slot::default();
        self.dirty = true;
        self.min_idx = 0;
        self.max_idx = 0;
    }

    /// Минимальная запись страницы (кэшируется до следующей мутации).
    pub fn min(&mut self) -> Option<KeyRecord<K>> {
        if self.count() == 0 {
            return None;
        }
        if self.min_idx == 0 {
            self.min_idx = self.subtree_min(self.root());
        }
        Some(self.slots[self.min_idx as usize].rec)
    }

    /// Максимальная запись страницы (кэшируется до следующей мутации).
    pub fn max(&mut self) -> Option<KeyRecord<K>> {
        if self.count() == 0 {
            return None;
        }
        if self.max_idx == 0 {
            self.max_idx = self.subtree_max(self.root());
        }
        Some(self.slots[self.max_idx as usize].rec)
    }

    /// Следующая по порядку запись внутри страницы.
    pub fn successor_of(&self, rec: &KeyRecord<K>) -> Option<KeyRecord<K>> {
        let idx = self.find_idx(rec);
        if idx == 0 {
            return None;
        }
        let s = self.successor_idx(idx);
        if s == 0 {
            None
        } else {
            Some(self.slots[s as usize].rec)
        }
    }

    /// Выдать записи из [lo, hi] в порядке возрастания.
    ///
    /// Если обход посещает больше узлов, чем страница декларирует, связи
    /// зациклены — возвращается `CorruptBTree`.
    pub fn search_range(
        &self,
        lo: &KeyRecord<K>,
        hi: &KeyRecord<K>,
        out: &mut Vec<KeyRecord<K>>,
    ) -> Result<()> {
        // первый узел с записью >= lo
        let mut next: u16 = 0;
        let mut idx = self.root();
        while idx != 0 {
            if self.slots[idx as usize].rec < *lo {
                idx = self.right(idx);
            } else {
                next = idx;
                idx = self.left(idx);
            }
        }
        let total = self.count();
        let mut emitted = 0usize;
        while next != 0 {
            let rec = self.slots[next as usize].rec;
            if *hi < rec {
                break;
            }
            if emitted == total {
                return Err(IndexError::CorruptBTree.into());
            }
            out.push(rec);
            emitted += 1;
            next = self.successor_idx(next);
        }
        Ok(())
    }

    /// Все записи страницы в порядке возрастания (с той же защитой от циклов).
    pub fn all_keys(&self, out: &mut Vec<KeyRecord<K>>) -> Result<()> {
        let mut idx = if self.min_idx != 0 {
            self.min_idx
        } else {
            self.subtree_min(self.root())
        };
        let total = self.count();
        let mut emitted = 0usize;
        while idx != 0 {
            if emitted == total {
                return Err(IndexError::CorruptBTree.into());
            }
            out.push(self.slots[idx as usize].rec);
            emitted += 1;
            idx = self.successor_idx(idx);
        }
        Ok(())
    }

    /// Разделить ПОЛНУЮ страницу: записи строго больше пивота уходят в
    /// `right`, остальные возвращаются в self. Пивот — запись корня до
    /// очистки; именно на этом разбиении держится остальная система.
    pub fn split(&mut self, right: &mut Page<K>) {
        debug_assert!(self.is_full());
        let pivot = self.slots[self.root() as usize].rec;
        let snapshot: Vec<KeyRecord<K>> = self.slots[2..].iter().map(|s| s.rec).collect();
        self.clear();
        for rec in snapshot {
            if pivot < rec {
                right.insert(rec);
            } else {
                self.insert(rec);
            }
        }
        metrics::record_page_split();
    }

    /// Влить все живые записи `other` в self (in-order).
    pub fn merge(&mut self, other: &Page<K>) {
        if other.count() == 0 {
            return;
        }
        let mut idx = other.subtree_min(other.root());
        while idx != 0 {
            self.insert(other.slots[idx as usize].rec);
            idx = other.successor_idx(idx);
        }
    }

    // ---- дисковый образ ----

    /// Прочитать образ страницы со своего смещения. `Ok(false)` — маркер
    /// целостности не сошёлся: страница никогда не записывалась (или бита),
    /// состояние сброшено в пустое.
    pub fn load(&mut self, file: &mut File) -> Result<bool> {
        let mut buf = vec![0u8; Self::DISK_SIZE];
        file.seek(SeekFrom::Start(self.file_offset as u64))?;
        file.read_exact(&mut buf)
            .with_context(|| format!("read page at offset {}", self.file_offset))?;

        self.min_idx = 0;
        self.max_idx = 0;

        let obfuscated =
            LittleEndian::read_u32(&buf[Self::ROOT_FIELD_POS..Self::ROOT_FIELD_POS + 4]);
        if (obfuscated >> 10) != (PAGE_MAGIC >> 10) {
            self.clear();
            return Ok(false);
        }

        let ss = Slot::<K>::DISK_SIZE;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            *slot = Slot::decode(&buf[i * ss..(i + 1) * ss]);
        }
        // снять маркер: восстановить корневой индекс
        self.slots[1].rec.offset = (obfuscated ^ PAGE_MAGIC) as i32;
        self.dirty = false;
        metrics::record_page_load();
        Ok(true)
    }

    /// Записать образ страницы на своё смещение, если она грязная.
    /// Маркер целостности ставится в выходном буфере; память не трогается.
    /// При ошибке записи флаг dirty сохраняется — следующий flush повторит.
    pub fn save(&mut self, file: &mut File) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let ss = Slot::<K>::DISK_SIZE;
        let mut buf = vec![0u8; Self::DISK_SIZE];
        for (i, slot) in self.slots.iter().enumerate() {
            slot.encode(&mut buf[i * ss..(i + 1) * ss]);
        }
        let root = LittleEndian::read_u32(&buf[Self::ROOT_FIELD_POS..Self::ROOT_FIELD_POS + 4]);
        LittleEndian::write_u32(
            &mut buf[Self::ROOT_FIELD_POS..Self::ROOT_FIELD_POS + 4],
            root ^ PAGE_MAGIC,
        );

        file.seek(SeekFrom::Start(self.file_offset as u64))?;
        file.write_all(&buf)
            .with_context(|| format!("write page at offset {}", self.file_offset))?;
        self.dirty = false;
        metrics::record_page_write();
        Ok(())
    }
}
