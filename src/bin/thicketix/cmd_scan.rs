//! scan — ключи в диапазоне [lo, hi].

use std::path::PathBuf;

use anyhow::Result;

use ThicketIx::{BTreeIndex, KeyShape};

use crate::util::ParseKey;
use crate::with_key_shape;

pub fn exec(path: PathBuf, shape: String, lo: String, hi: String) -> Result<()> {
    let shape = KeyShape::parse(&shape)?;
    with_key_shape!(shape, K, {
        let lo = <K as ParseKey>::parse_cli(&lo)?;
        let hi = <K as ParseKey>::parse_cli(&hi)?;
        let mut tree = BTreeIndex::<K>::new(&path);
        tree.open()?;
        let mut keys = Vec::new();
        tree.search_for_range(lo, hi, &mut keys)?;
        for rec in &keys {
            println!("{:?}\t{}", rec.key, rec.offset);
        }
        eprintln!("{} key(s)", keys.len());
        tree.close()
    })
}
