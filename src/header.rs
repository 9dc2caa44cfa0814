//! Каталог страниц (header directory).
//!
//! Упорядоченная in-memory карта: минимальная запись страницы → смещение
//! страницы в файле. Управляет маршрутизацией каждой операции ровно в одну
//! страницу. Сериализуется плоским массивом пар (KeyRecord, offset u32, LE)
//! в хвост файла при чистом закрытии и вычитывается оттуда при открытии.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::ops::Bound;

use anyhow::{anyhow, Context, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::key::{FixedKey, KeyRecord};

pub struct HeaderDirectory<K: FixedKey> {
    entries: BTreeMap<KeyRecord<K>, u32>,
}

impl<K: FixedKey> Default for HeaderDirectory<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: FixedKey> HeaderDirectory<K> {
    /// Размер одной записи каталога на диске.
    pub const ENTRY_SIZE: usize = KeyRecord::<K>::DISK_SIZE + 4;

    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Маршрутизация: наибольшая запись с ключом <= `rec`; если `rec`
    /// предшествует всем — первая запись. None только на пустом каталоге.
    pub fn route(&self, rec: &KeyRecord<K>) -> Option<(KeyRecord<K>, u32)> {
        if let Some((k, off)) = self
            .entries
            .range((Bound::Unbounded, Bound::Included(*rec)))
            .next_back()
        {
            return Some((*k, *off));
        }
        self.first()
    }

    pub fn first(&self) -> Option<(KeyRecord<K>, u32)> {
        self.entries.iter().next().map(|(k, v)| (*k, *v))
    }

    pub fn last(&self) -> Option<(KeyRecord<K>, u32)> {
        self.entries.iter().next_back().map(|(k, v)| (*k, *v))
    }

    pub fn set(&mut self, rec: KeyRecord<K>, offset: u32) {
        self.entries.insert(rec, offset);
    }

    pub fn remove(&mut self, rec: &KeyRecord<K>) -> bool {
        self.entries.remove(rec).is_some()
    }

    /// Записи начиная с позиции маршрутизации `rec` (включительно), по
    /// возрастанию ключа.
    pub fn entries_from(&self, rec: &KeyRecord<K>) -> Vec<(KeyRecord<K>, u32)> {
        match self.route(rec) {
            None => Vec::new(),
            Some((start, _)) => self
                .entries
                .range(start..)
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }

    /// Все записи по возрастанию ключа.
    pub fn entries(&self) -> Vec<(KeyRecord<K>, u32)> {
        self.entries.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Ключ каталога, под которым числится страница с данным смещением.
    pub fn key_for_offset(&self, offset: u32) -> Option<KeyRecord<K>> {
        self.entries
            .iter()
            .find(|(_, v)| **v == offset)
            .map(|(k, _)| *k)
    }

    // ---- сериализация ----

    /// Дописать записи каталога от текущей позиции файла.
    pub fn save(&self, file: &mut File) -> Result<()> {
        let mut buf = vec![0u8; Self::ENTRY_SIZE];
        for (rec, off) in &self.entries {
            rec.write_to(&mut buf[..KeyRecord::<K>::DISK_SIZE]);
            LittleEndian::write_u32(&mut buf[KeyRecord::<K>::DISK_SIZE..], *off);
            file.write_all(&buf).context("write directory entry")?;
        }
        Ok(())
    }

    /// Вычитать записи от текущей позиции файла до конца.
    pub fn load(&mut self, file: &mut File) -> Result<()> {
        self.entries.clear();
        let pos = file.stream_position()?;
        let len = file.metadata()?.len();
        let tail = (len - pos) as usize;
        if tail == 0 {
            return Ok(());
        }
        if tail % Self::ENTRY_SIZE != 0 {
            return Err(anyhow!(
                "directory tail {} is not a multiple of entry size {}",
                tail,
                Self::ENTRY_SIZE
            ));
        }
        let mut raw = vec![0u8; tail];
        file.read_exact(&mut raw).context("read directory")?;
        for chunk in raw.chunks_exact(Self::ENTRY_SIZE) {
            let rec = KeyRecord::<K>::read_from(&chunk[..KeyRecord::<K>::DISK_SIZE]);
            let off = LittleEndian::read_u32(&chunk[KeyRecord::<K>::DISK_SIZE..]);
            self.entries.insert(rec, off);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Seek;

    fn dir3() -> HeaderDirectory<i32> {
        let mut d = HeaderDirectory::new();
        d.set(KeyRecord::new(10, 0), 1024);
        d.set(KeyRecord::new(20, 0), 18000);
        d.set(KeyRecord::new(30, 0), 35000);
        d
    }

    #[test]
    fn route_greatest_le_or_first() {
        let d = dir3();
        assert_eq!(d.route(&KeyRecord::new(25, 0)), Some((KeyRecord::new(20, 0), 18000)));
        assert_eq!(d.route(&KeyRecord::new(20, 0)), Some((KeyRecord::new(20, 0), 18000)));
        // предшествует всем — первая страница
        assert_eq!(d.route(&KeyRecord::new(5, 0)), Some((KeyRecord::new(10, 0), 1024)));
        assert_eq!(d.route(&KeyRecord::new(99, 0)), Some((KeyRecord::new(30, 0), 35000)));
        assert_eq!(HeaderDirectory::<i32>::new().route(&KeyRecord::new(1, 0)), None);
    }

    #[test]
    fn rekey_is_delete_then_set() {
        let mut d = dir3();
        assert!(d.remove(&KeyRecord::new(10, 0)));
        d.set(KeyRecord::new(8, 0), 1024);
        assert_eq!(d.first(), Some((KeyRecord::new(8, 0), 1024)));
        assert_eq!(d.len(), 3);
        assert_eq!(d.key_for_offset(1024), Some(KeyRecord::new(8, 0)));
    }

    #[test]
    fn save_load_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "thix-dir-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut f = std::fs::OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let _ = std::fs::remove_file(&path);

        let d = dir3();
        d.save(&mut f).unwrap();

        f.rewind().unwrap();
        let mut d2 = HeaderDirectory::<i32>::new();
        d2.load(&mut f).unwrap();
        assert_eq!(d2.entries(), d.entries());
    }

    #[test]
    fn load_rejects_ragged_tail() {
        let path = std::env::temp_dir().join(format!(
            "thix-dir-ragged-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut f = std::fs::OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        let _ = std::fs::remove_file(&path);

        f.write_all(&[0u8; 7]).unwrap();
        f.rewind().unwrap();
        let mut d = HeaderDirectory::<i32>::new();
        assert!(d.load(&mut f).is_err());
    }
}
