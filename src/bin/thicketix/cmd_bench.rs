//! bench — случайные массовые вставки (i64) с отчётом о скорости и кэше.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use rand::Rng;

use ThicketIx::{metrics, BTreeIndex, IndexConfig};

pub fn exec(path: PathBuf, n: u32, cache: usize) -> Result<()> {
    metrics::reset();
    let cfg = IndexConfig::default().with_cache_pages(cache);
    let mut tree = BTreeIndex::<i64>::with_config(&path, cfg);
    tree.open()?;

    let mut rng = rand::thread_rng();
    let t0 = Instant::now();
    for i in 0..n {
        tree.insert(rng.gen::<i64>(), (i & 0x7fff_ffff) as i32)?;
    }
    let fill = t0.elapsed();

    let t1 = Instant::now();
    tree.flush()?;
    let flush = t1.elapsed();

    let st = tree.status();
    println!(
        "inserted {} keys in {:.3}s ({:.0} keys/s), flush {:.3}s",
        n,
        fill.as_secs_f64(),
        n as f64 / fill.as_secs_f64().max(1e-9),
        flush.as_secs_f64()
    );
    println!(
        "pages={} loaded={} cache_hit_rate={:.3}",
        st.pages, st.loaded_pages, st.cache_hit_rate
    );
    let m = metrics::snapshot();
    println!(
        "page_writes={} splits={} fresh_pages={} free_reuses={}",
        m.page_writes, m.page_splits, m.fresh_pages, m.free_reuses
    );

    tree.close()
}
