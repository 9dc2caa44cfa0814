//! status — пассивная сводка по файлу: только чтение зарезервированного
//! заголовка, без открытия дерева (файл не модифицируется).

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use ThicketIx::consts::{HEADER_SIZE, SLOTS_IN_PAGE};
use ThicketIx::KeyShape;

#[derive(Serialize)]
struct StatusOut {
    path: String,
    key_shape: String,
    clean: bool,
    file_len: u64,
    key_count: u32,
    directory_offset: u32,
    pages: u64,
    page_size: usize,
}

pub fn exec(path: PathBuf, shape: String, json: bool) -> Result<()> {
    let shape = KeyShape::parse(&shape)?;
    let mut f =
        File::open(&path).with_context(|| format!("open index file {}", path.display()))?;
    let file_len = f.metadata()?.len();

    let mut hdr = [0u8; 9];
    let mut clean = false;
    let mut key_count = 0u32;
    let mut dir_off = 0u32;
    if file_len >= HEADER_SIZE as u64 {
        f.read_exact(&mut hdr).context("read reserved header")?;
        clean = hdr[0] == 1;
        key_count = LittleEndian::read_u32(&hdr[1..5]);
        dir_off = LittleEndian::read_u32(&hdr[5..9]);
    }

    // размер слота: ключ + offset i32 + связи u32
    let page_size = SLOTS_IN_PAGE * (shape.key_size() + 8);
    let entry_size = (shape.key_size() + 8) as u64;
    let pages = if clean && file_len > dir_off as u64 {
        (file_len - dir_off as u64) / entry_size
    } else {
        0
    };

    let out = StatusOut {
        path: path.display().to_string(),
        key_shape: shape.name().to_string(),
        clean,
        file_len,
        key_count,
        directory_offset: dir_off,
        pages,
        page_size,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("path:             {}", out.path);
        println!("key shape:        {}", out.key_shape);
        println!("closed cleanly:   {}", out.clean);
        println!("file length:      {}", out.file_len);
        println!("keys:             {}", out.key_count);
        println!("directory offset: {}", out.directory_offset);
        println!("pages:            {}", out.pages);
        println!("page size:        {}", out.page_size);
    }
    Ok(())
}
