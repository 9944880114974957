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

use super::datastore::UnitDb;
use super::entry::UnitX;
use super::uload::UnitLoad;
use libcore::error::*;
use libcore::unit::{unit_name_alias, unit_name_to_type, SubUnit, UnitLoadState};
use std::path::PathBuf;
use std::sync::Arc;

/// The registry: every unit known to the manager, by name and alias.
pub struct UnitManager {
    // owned objects
    db: Arc<UnitDb>,
    load: UnitLoad,
}

impl UnitManager {
    ///
    pub fn new(search_paths: Vec<PathBuf>, log_capacity: usize) -> UnitManager {
        let db = Arc::new(UnitDb::new());
        let load = UnitLoad::new(&db, search_paths, log_capacity);
        UnitManager { db, load }
    }

    /// The unit known as `name`, loaded from the search paths on first use.
    pub fn get(&self, name: &str) -> Result<Arc<UnitX>> {
        if let Some(unit) = self.db.units_get(name) {
            return Ok(unit);
        }
        self.load.load_unit(name)
    }

    /// (Re)load the definition of `name`, keeping the identity of a known unit.
    pub fn load(&self, name: &str) -> Result<Arc<UnitX>> {
        self.load.load_unit(name)
    }

    /// Load every definition of the search paths.
    pub fn load_all(&self) -> Result<()> {
        self.load.load_all()
    }

    /// Register a unit that lives in memory only, it is loaded already.
    pub fn supervise(&self, name: &str, sub: Box<dyn SubUnit>) -> Result<Arc<UnitX>> {
        let unit_type = unit_name_to_type(name);
        if !unit_type.is_supported() {
            return Err(Error::UnsupportedType {
                name: name.to_string(),
            });
        }

        let unit = Arc::new(UnitX::new(name, unit_type, sub, self.load.log_capacity()));
        unit.set_load_state(UnitLoadState::Loaded);
        let mut names = vec![name];
        if let Some(alias) = unit_name_alias(name) {
            names.push(alias);
        }
        self.db.units_try_insert(&names, &unit)?;
        log::debug!("Supervising unit {}.", name);
        Ok(unit)
    }

    /// every known unit once, ordered by id
    pub fn units(&self) -> Vec<Arc<UnitX>> {
        self.db.units_get_all()
    }

    /// a known unit, never loads
    pub(crate) fn lookup(&self, name: &str) -> Option<Arc<UnitX>> {
        self.db.units_get(name)
    }
}
