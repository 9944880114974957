// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! This crate provides common functions for unit tests
use std::{
    fs,
    io::{self, Write},
    os::unix::fs::symlink,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// get the crate root path
pub fn get_crate_root() -> io::Result<PathBuf> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Ok(PathBuf::from(manifest_dir))
}

/// create an empty unit search directory, removed when dropped
pub fn unit_dir() -> io::Result<TempDir> {
    tempfile::Builder::new().prefix("units").tempdir()
}

/// write the unit definition `name` into `dir`
pub fn write_unit(dir: &Path, name: &str, content: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let mut file = fs::File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path)
}

/// mask the unit `name` in `dir` by linking it to /dev/null
pub fn mask_unit(dir: &Path, name: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    symlink("/dev/null", &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_crate_root() {
        let mut file_path = get_crate_root().unwrap();
        file_path.push("Cargo.toml");

        assert!(file_path.is_file());
    }

    #[test]
    fn test_write_and_mask_unit() {
        let dir = unit_dir().unwrap();
        let path = write_unit(dir.path(), "foo.service", "[Unit]\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[Unit]\n");

        let masked = mask_unit(dir.path(), "bar.service").unwrap();
        assert_eq!(fs::read_link(masked).unwrap(), PathBuf::from("/dev/null"));
    }
}
