//! insert — добавить пару (key, offset).

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
        tree.insert(key, offset)?;
        println!("ok, {} key(s) total", tree.count());
        tree.close()
    })
}
