//! del — удалить пару (key, offset).

use std::path::PathBuf;

use anyhow::Result;

use ThicketIx::{BTreeIndex, KeyShape};

use crate::util::ParseKey;
use crate::with_key_shape;

pub fn exec(path: PathBuf, shape: String, key: String, offset: i32) -> Result<()> {
    let shape = KeyShape::parse(&shape)?;
    with_key_shape!(shape, K, {
        let key = <K as ParseKey>::parse_cli(&key)?;
        let mut tree = BTreeIndex::<K>::new(&path);
        tree.open()?;
        let existed = tree.delete(key, offset)?;
        println!(
            "{}, {} key(s) total",
            if existed { "deleted" } else { "not found" },
            tree.count()
        );
        tree.close()
    })
}
