//! dump — все ключи в порядке возрастания.

use std::path::PathBuf;

use anyhow::Result;

use ThicketIx::{BTreeIndex, KeyShape};

use crate::with_key_shape;

pub fn exec(path: PathBuf, shape: String) -> Result<()> {
    let shape = KeyShape::parse(&shape)?;
    with_key_shape!(shape, K, {
        let mut tree = BTreeIndex::<K>::new(&path);
        let clean = tree.open()?;
        if !clean {
            eprintln!("warning: index was not closed cleanly; starting empty");
        }
        let mut keys = Vec::new();
        tree.get_all_keys(&mut keys)?;
        for rec in &keys {
            println!("{:?}\t{}", rec.key, rec.offset);
        }
        eprintln!("{} key(s)", keys.len());
        tree.close()
    })
}
