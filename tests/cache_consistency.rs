use anyhow::Result;
use std::path::PathBuf;

use ThicketIx::{BTreeIndex, IndexConfig, IndexError};

// Маленький кэш под большим числом ключей: flush сверяет каждую резидентную
// страницу с каталогом и проходит; после порчи страницы — различимая ошибка.
#[test]
fn flush_checks_cache_against_directory() -> Result<()> {
    let path = unique_path("consistency");
    let cfg = IndexConfig::default().with_cache_pages(4);
    let mut tree = BTreeIndex::<i32>::with_config(&path, cfg);
    tree.open()?;
    assert_eq!(tree.get_cache_size(), 4);

    for i in 0..5000 {
        tree.insert(i, i)?;
    }
    tree.flush()?; // консистентность кэш/каталог

    // повторный обход греет кэш — hit rate наблюдаем
    let mut out = Vec::new();
    tree.search_for_range(0, 4999, &mut out)?;
    assert_eq!(out.len(), 5000);
    assert!(tree.cache_hit_rate() > 0.0);

    // порча резидентной страницы в обход каталога
    assert!(tree.debug_corrupt_resident_page()?);
    let err = tree.flush().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<IndexError>(),
        Some(IndexError::CorruptBTree)
    ));

    let _ = std::fs::remove_file(&path);
    Ok(())
}

#[test]
fn cache_size_has_floor_of_two() -> Result<()> {
    let path = unique_path("floor");
    let mut tree = BTreeIndex::<i32>::new(&path);
    tree.open()?;
    tree.set_cache_size(0)?;
    assert_eq!(tree.get_cache_size(), 2);
    tree.set_cache_size(64)?;
    assert_eq!(tree.get_cache_size(), 64);
    tree.close()?;

    let _ = std::fs::remove_file(&path);
    Ok(())
}

// Сжатие кэша под нагрузкой не теряет данных: страницы дописываются на диск.
#[test]
fn shrinking_cache_preserves_data() -> Result<()> {
    let path = unique_path("shrink");
    let mut tree = BTreeIndex::<i32>::with_config(&path, IndexConfig::default().with_cache_pages(16));
    tree.open()?;
    for i in 0..3000 {
        tree.insert(i, i)?;
    }
    tree.set_cache_size(2)?;

    let mut all = Vec::new();
    tree.get_all_keys(&mut all)?;
    assert_eq!(all.len(), 3000);
    tree.close()?;

    // и после переоткрытия
    assert!(tree.open()?);
    let mut again = Vec::new();
    tree.get_all_keys(&mut again)?;
    assert_eq!(again.len(), 3000);
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
