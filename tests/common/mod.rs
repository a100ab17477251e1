#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use galaxy_explorer::{Catalog, ExplorerConfig};
use tempfile::TempDir;

/// Six objects with the usual catalog dirt: a rejected `G` name, a blank
/// name, comma decimals, `...` placeholders and a missing PGC number.
pub const DIRTY_CATALOG: &str = "\
# test catalog
objname;pgc;a;b;c
NGC0001;101;1;10;0
G;102;2;20;0
;303;3;...;1
UGC0004;404;4,5;40;2
IC0005;;5;50;
ESO0006;606;6;60;3
";

/// Write `contents` to `name` inside a fresh temporary directory. Keep the
/// returned `TempDir` alive for as long as the file is needed.
pub fn write_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}

pub fn open_text(name: &str, contents: &str) -> Catalog {
    let (_dir, path) = write_file(name, contents.as_bytes());
    Catalog::open(&path, &ExplorerConfig::default()).unwrap()
}

pub fn dirty_catalog() -> Catalog {
    open_text("catalog.csv", DIRTY_CATALOG)
}
