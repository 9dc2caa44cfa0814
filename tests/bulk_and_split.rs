use anyhow::Result;
use std::path::PathBuf;

use ThicketIx::{BTreeIndex, KeyRecord};

// Упорядоченная массовая вставка: почти полная страница и ключ за её
// максимумом открывают новую страницу, сплитов нет вообще.
#[test]
fn ordered_bulk_insert_opens_pages_without_splits() -> Result<()> {
    let path = unique_path("bulk");
    let mut tree = BTreeIndex::<i32>::new(&path);
    tree.open()?;

    let mut transitions = Vec::new();
    let mut pages = 0usize;
    for i in 0..2000 {
        tree.insert(i, i)?;
        let now = tree.status().pages;
        if now != pages {
            transitions.push(i);
            pages = now;
        }
    }

    // ALMOST_FULL = 958: первая страница принимает ключи 0..=957, ключ 958
    // выходит за её максимум и открывает вторую; симметрично третья — на 1916
    assert_eq!(transitions, vec![0, 958, 1916]);
    assert_eq!(tree.status().pages, 3);
    assert_eq!(tree.count(), 2000);

    let mut keys = Vec::new();
    tree.get_all_keys(&mut keys)?;
    let expect: Vec<_> = (0..2000).map(|i| KeyRecord::new(i, i)).collect();
    assert_eq!(keys, expect);

    tree.close()?;
    let _ = std::fs::remove_file(&path);
    Ok(())
}

// Неупорядоченное заполнение: страница наполняется до отказа, 1023-й ключ
// вызывает сплит; обе половины непусты и правая строго больше левой.
#[test]
fn unsorted_fill_splits_on_overflow() -> Result<()> {
    let path = unique_path("split");
    let mut tree = BTreeIndex::<i32>::new(&path);
    tree.open()?;

    // экстремумы кладём первыми, чтобы остальные ключи всегда попадали
    // в [min, max] страницы и эвристика almost-full не срабатывала
    tree.insert(0, 0)?;
    tree.insert(1021, 1021)?;
    let mut rest: Vec<i32> = (1..1021).collect();
    let mut rng = oorandom::Rand32::new(0x0051_7e57);
    for i in (1..rest.len()).rev() {
        let j = (rng.rand_u32() as usize) % (i + 1);
        rest.swap(i, j);
    }
    for k in rest {
        tree.insert(k, k)?;
    }
    assert_eq!(tree.count(), 1022);
    assert_eq!(tree.status().pages, 1);

    // страница полна — следующий ключ заставляет сплит
    tree.insert(1022, 1022)?;
    assert_eq!(tree.status().pages, 2);
    assert_eq!(tree.count(), 1023);

    let mut keys = Vec::new();
    tree.get_all_keys(&mut keys)?;
    assert_eq!(keys.len(), 1023);
    for (i, rec) in keys.iter().enumerate() {
        assert_eq!(*rec, KeyRecord::new(i as i32, i as i32));
    }

    tree.close()?;
    let _ = std::fs::remove_file(&path);
    Ok(())
}

// Вставка ключа меньше минимума почти полной страницы тоже открывает
// новую страницу, не трогая её саму.
#[test]
fn below_min_insert_into_almost_full_page_opens_fresh_page() -> Result<()> {
    let path = unique_path("belowmin");
    let mut tree = BTreeIndex::<i32>::new(&path);
    tree.open()?;

    // ровно до порога ALMOST_FULL
    for i in 0..958 {
        tree.insert(i + 1000, 0)?;
    }
    assert_eq!(tree.status().pages, 1);

    tree.insert(5, 0)?;
    assert_eq!(tree.status().pages, 2);
    assert_eq!(tree.get_minimum()?, Some(KeyRecord::new(5, 0)));

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
