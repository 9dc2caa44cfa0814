//! Жизненный цикл файла индекса.
//!
//! Протокол shutdown-байта: на открытии байт 0 атомарно ставится в 0
//! ("занят") и сбрасывается на диск; обратно в 1 он переводится только в
//! самом конце успешного закрытия. Это единственный сигнал долговечности
//! формата: незавершённая сессия оставляет 0, и следующее открытие стартует
//! с пустого состояния (вызывающий перестраивает индекс из первичных
//! данных).

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};

use anyhow::{anyhow, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use fs2::FileExt;
use log::{debug, warn};

use crate::consts::HEADER_SIZE;
use crate::errors::IndexError;
use crate::key::FixedKey;
use crate::metrics;

use super::{open_file, BTreeIndex};

impl<K: FixedKey> BTreeIndex<K> {
    /// Открыть файл индекса. true — прошлая сессия закрылась чисто и
    /// состояние (каталог, число ключей) загружено; false — файл новый или
    /// грязный, старт с пустого состояния.
    pub fn open(&mut self) -> Result<bool> {
        if self.file.is_some() {
            return Err(anyhow!("index {} is already open", self.path.display()));
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("open index file {}", self.path.display()))?;
        file.try_lock_exclusive()
            .with_context(|| format!("lock_exclusive {}", self.path.display()))?;

        let len = file.metadata()?.len();
        let mut closed = false;
        if len >= HEADER_SIZE as u64 {
            let mut flag = [0u8; 1];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut flag)?;
            closed = flag[0] == 1;
        }

        self.key_count = 0;
        self.directory.clear();
        self.free_offsets.clear();

        // пометить файл занятым
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&[0u8])?;

        if !closed {
            file.write_all(&[0u8; HEADER_SIZE - 1])?;
            file.set_len(HEADER_SIZE as u64)?;
            if len > 0 {
                metrics::record_dirty_recovery();
                warn!(
                    "index {} was not closed cleanly; starting empty",
                    self.path.display()
                );
            }
        } else {
            let mut hdr = [0u8; 8];
            file.read_exact(&mut hdr)?;
            self.key_count = LittleEndian::read_u32(&hdr[0..4]);
            let dir_off = LittleEndian::read_u32(&hdr[4..8]);
            file.seek(SeekFrom::Start(dir_off as u64))?;
            self.directory
                .load(&mut file)
                .context("load header directory")?;
            // байты каталога возвращаются под страницы
            file.set_len(dir_off as u64)?;
        }

        file.sync_all()?;
        debug!(
            "open {}: clean={}, keys={}, pages={}",
            self.path.display(),
            closed,
            self.key_count,
            self.directory.len()
        );
        self.file = Some(file);
        Ok(closed)
    }

    /// Закрыть: сбросить кэш, дописать каталог, заполнить зарезервированный
    /// заголовок и перевести shutdown-байт в 1. Файл и блокировка
    /// освобождаются на любом исходе; при ошибке сохранения каталога байт
    /// остаётся 0 и следующее открытие пройдёт как грязное.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        let result = self.close_inner();

        self.file = None; // дескриптор и flock уходят вместе с ним
        self.directory.clear();
        self.free_offsets.clear();
        self.cache.clear_without_saving();
        self.free_page = None;
        self.key_count = 0;
        result
    }

    fn close_inner(&mut self) -> Result<()> {
        self.flush()?;

        let key_count = self.key_count;
        let file = open_file(&mut self.file)?;
        let dir_off = file.metadata()?.len();

        let mut hdr = [0u8; 9];
        LittleEndian::write_u32(&mut hdr[1..5], key_count);
        LittleEndian::write_u32(&mut hdr[5..9], dir_off as u32);
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&hdr)?;

        file.seek(SeekFrom::Start(dir_off))?;
        self.directory.save(file).context("save header directory")?;
        // барьер: каталог должен лечь на диск раньше флага чистого закрытия
        file.sync_all()?;

        file.seek(SeekFrom::Start(0))?;
        file.write_all(&[1u8])?;
        file.sync_all()?;
        debug!("closed {} cleanly ({} keys)", self.path.display(), key_count);
        Ok(())
    }

    /// Опустошить открытое дерево: память — в ноль, файл — до заголовка.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.directory.clear();
        self.free_offsets.clear();
        self.cache.clear_without_saving();
        self.free_page = None;
        self.key_count = 0;

        let file = open_file(&mut self.file)?;
        file.set_len(HEADER_SIZE as u64)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&[0u8; HEADER_SIZE])?;
        file.sync_all()?;
        Ok(())
    }

    /// Записать все грязные страницы, сверив кэш с каталогом.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        let file = open_file(&mut self.file)?;
        let consistent = self.cache.clear(&self.directory, file)?;
        if !consistent {
            return Err(IndexError::CorruptBTree.into());
        }
        Ok(())
    }
}
