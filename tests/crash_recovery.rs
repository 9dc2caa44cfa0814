use anyhow::Result;
use std::path::PathBuf;

use ThicketIx::consts::HEADER_SIZE;
use ThicketIx::BTreeIndex;

// Падение без close: shutdown-байт остаётся 0, следующее открытие стартует
// с пустого состояния (долговечность не обещана — индекс перестраивают).
#[test]
fn crash_without_close_recovers_empty() -> Result<()> {
    let path = unique_path("crash");
    {
        let mut tree = BTreeIndex::<i32>::new(&path);
        assert!(!tree.open()?);
        tree.insert(1, 1)?;
        tree.insert(2, 2)?;
        // имитация падения: дескриптор бросаем без close
        drop(tree);
    }

    // флаг "занят" успел уйти на диск при открытии
    let bytes = std::fs::read(&path)?;
    assert_eq!(bytes[0], 0);

    let mut tree = BTreeIndex::<i32>::new(&path);
    assert!(!tree.open()?, "dirty file must open as not-clean");
    assert_eq!(tree.count(), 0);
    assert_eq!(tree.get_minimum()?, None);
    assert_eq!(tree.status().pages, 0);
    tree.close()?;

    let _ = std::fs::remove_file(&path);
    Ok(())
}

// Чистое закрытие выставляет байт 1; открытие возвращает его в 0 на время
// сессии.
#[test]
fn shutdown_byte_tracks_sessions() -> Result<()> {
    let path = unique_path("byte");
    let mut tree = BTreeIndex::<i32>::new(&path);
    tree.open()?;
    tree.insert(10, 10)?;
    tree.close()?;
    assert_eq!(std::fs::read(&path)?[0], 1);

    assert!(tree.open()?);
    assert_eq!(std::fs::read(&path)?[0], 0, "open must mark the file in-use");
    assert_eq!(tree.count(), 1);
    tree.close()?;
    assert_eq!(std::fs::read(&path)?[0], 1);

    let _ = std::fs::remove_file(&path);
    Ok(())
}

// Файл короче заголовка тоже считается грязным.
#[test]
fn short_file_opens_dirty() -> Result<()> {
    let path = unique_path("short");
    std::fs::write(&path, vec![1u8; HEADER_SIZE / 2])?;

    let mut tree = BTreeIndex::<i32>::new(&path);
    assert!(!tree.open()?);
    assert_eq!(tree.count(), 0);
    assert_eq!(std::fs::metadata(&path)?.len(), HEADER_SIZE as u64);
    tree.close()?;

    let _ = std::fs::remove_file(&path);
    Ok(())
}

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("thix-{}-{}-{}.idx", prefix, pid, t))
}
