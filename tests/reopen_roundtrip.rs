use anyhow::Result;
use std::path::PathBuf;

use ThicketIx::{BTreeIndex, KeyRecord};

// Произвольная последовательность вставок/удалений переживает close/open.
#[test]
fn random_ops_survive_reopen() -> Result<()> {
    let path = unique_path("roundtrip");
    let mut tree = BTreeIndex::<i64>::new(&path);
    assert!(!tree.open()?);

    let mut rng = oorandom::Rand64::new(0xc0ff_ee00);
    let mut model = std::collections::BTreeSet::new();

    for _ in 0..4000 {
        let k = (rng.rand_u64() % 2048) as i64;
        let off = (rng.rand_u64() % 4) as i32;
        if rng.rand_u64() % 3 == 0 {
            let existed = model.remove(&(k, off));
            assert_eq!(tree.delete(k, off)?, existed);
        } else if model.insert((k, off)) {
            tree.insert(k, off)?;
        }
    }
    assert_eq!(tree.count() as usize, model.len());
    tree.close()?;

    assert!(tree.open()?, "second open must see a clean file");
    assert_eq!(tree.count() as usize, model.len());
    let mut all = Vec::new();
    tree.get_all_keys(&mut all)?;
    let expect: Vec<_> = model
        .iter()
        .map(|(k, off)| KeyRecord::new(*k, *off))
        .collect();
    assert_eq!(all, expect);

    // и мутации после переоткрытия работают
    tree.insert(1_000_000, 1)?;
    assert_eq!(tree.count() as usize, model.len() + 1);
    tree.close()?;

    let _ = std::fs::remove_file(&path);
    Ok(())
}

// close -> open без мутаций -> close даёт байт-в-байт тот же файл.
#[test]
fn reclose_without_mutation_is_byte_identical() -> Result<()> {
    let path = unique_path("bytes");
    let mut tree = BTreeIndex::<i32>::new(&path);
    tree.open()?;
    for i in 0..1500 {
        tree.insert(i * 3, i)?;
    }
    tree.close()?;
    let first = std::fs::read(&path)?;

    assert!(tree.open()?);
    tree.close()?;
    let second = std::fs::read(&path)?;

    assert_eq!(first.len(), second.len());
    assert_eq!(first, second);

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
