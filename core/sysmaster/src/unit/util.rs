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

use libcore::error::*;
use libcore::unit::{SubUnit, UnitType};
use service::Service;
use std::fs;
use std::path::{Path, PathBuf};
use target::Target;

/// Create the subunit trait of unit
pub(crate) fn create_subunit(unit_type: UnitType) -> Result<Box<dyn SubUnit>> {
    match unit_type {
        UnitType::UnitService => Ok(Box::new(Service::new())),
        UnitType::UnitTarget => Ok(Box::new(Target::new())),
        _ => Err(Error::Other {
            msg: format!("Component of {} doesn't exist", String::from(unit_type)),
        }),
    }
}

/// The first `<search path>/<name>` that exists. Dangling symlinks don't count.
pub(crate) fn unit_fragment(search_paths: &[PathBuf], name: &str) -> Option<PathBuf> {
    /* {/etc/sysmaster/system, /usr/lib/sysmaster/system}/foo.service */
    search_paths
        .iter()
        .map(|p| p.join(name))
        .find(|p| p.exists())
}

/// A definition linking to /dev/null, or an empty one, masks the unit.
pub(crate) fn unit_file_is_masked(path: &Path) -> bool {
    if let Ok(target) = fs::read_link(path) {
        if target == Path::new("/dev/null") {
            return true;
        }
    }
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.len() == 0,
        Err(_) => false,
    }
}
