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
use super::util;
use libcore::error::*;
use libcore::unit::{unit_name_alias, unit_name_is_valid, unit_name_to_type, UnitLoadState};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

pub(super) struct UnitLoad {
    // associated objects
    db: Arc<UnitDb>,

    // owned objects
    search_paths: Vec<PathBuf>,
    log_capacity: usize,
}

impl UnitLoad {
    pub(super) fn new(
        db: &Arc<UnitDb>,
        search_paths: Vec<PathBuf>,
        log_capacity: usize,
    ) -> UnitLoad {
        UnitLoad {
            db: Arc::clone(db),
            search_paths,
            log_capacity,
        }
    }

    pub(super) fn log_capacity(&self) -> usize {
        self.log_capacity
    }

    /// Find the definition of `name` and (re)define the unit from it.
    ///
    /// `name` is either a unit name looked up in the search paths, or an
    /// absolute path which is loaded on its own. Errors of the definition
    /// itself end up in the unit log and load state, not here.
    pub(super) fn load_unit(&self, name: &str) -> Result<Arc<UnitX>> {
        let path = Path::new(name);
        let (id, fragment) = if path.is_absolute() {
            let id = match path.file_name().and_then(|n| n.to_str()) {
                None => {
                    return Err(Error::NotFound {
                        name: name.to_string(),
                    })
                }
                Some(v) => v.to_string(),
            };
            let fragment = if path.exists() {
                Some(path.to_path_buf())
            } else {
                None
            };
            (id, fragment)
        } else {
            (name.to_string(), util::unit_fragment(&self.search_paths, name))
        };

        let unit_type = unit_name_to_type(&id);
        if !unit_name_is_valid(&id) || !unit_type.is_supported() {
            return Err(Error::UnsupportedType {
                name: name.to_string(),
            });
        }

        let fragment = match fragment {
            None => {
                log::debug!("No definition of {} found.", name);
                return Err(Error::NotFound {
                    name: name.to_string(),
                });
            }
            Some(v) => v,
        };

        if fragment.is_dir() {
            if let Some(unit) = self.db.units_get(&id) {
                unit.log()
                    .log_line(&format!("'{}' is a directory.", fragment.display()));
            }
            return Err(Error::IsDirectory { path: fragment });
        }

        let unit = self.db.units_get_or_insert_with(&id, || {
            let sub = util::create_subunit(unit_type)?;
            Ok(UnitX::new(&id, unit_type, sub, self.log_capacity))
        })?;
        if let Some(alias) = unit_name_alias(&id) {
            self.db.units_insert(alias, &unit);
        }
        if path.is_absolute() {
            self.db.units_insert(name, &unit);
        }

        unit.set_path(fragment.clone());
        self.load_fragment(&unit, &fragment);
        Ok(unit)
    }

    fn load_fragment(&self, unit: &UnitX, fragment: &Path) {
        if util::unit_file_is_masked(fragment) {
            unit.mask();
            return;
        }

        let mut file = match File::open(fragment) {
            Err(e) => {
                unit.log()
                    .log_line(&format!("Failed to open {}: {}", fragment.display(), e));
                unit.set_load_state(UnitLoadState::Error);
                log::error!("Failed to open {}: {}", fragment.display(), e);
                return;
            }
            Ok(v) => v,
        };
        // recorded in the unit log already
        let _ = unit.define(&mut file);
    }

    /// Load every supported definition found in the search paths. A unit
    /// found in several search paths is loaded from the first one.
    pub(super) fn load_all(&self) -> Result<()> {
        let mut ret = Ok(());
        for search_path in self.search_paths.iter() {
            if !search_path.exists() {
                log::debug!("Search path {} doesn't exist, skipping.", search_path.display());
                continue;
            }
            if !search_path.is_dir() {
                log::error!("Search path {} is not a directory.", search_path.display());
                ret = Err(Error::NotDirectory {
                    path: search_path.clone(),
                });
                continue;
            }

            for entry in WalkDir::new(search_path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = match entry {
                    Err(e) => {
                        log::warn!("Failed to read {}: {}", search_path.display(), e);
                        continue;
                    }
                    Ok(v) => v,
                };
                let name = match entry.file_name().to_str() {
                    None => continue,
                    Some(v) => v,
                };
                if !unit_name_is_valid(name) || !unit_name_to_type(name).is_supported() {
                    continue;
                }
                if self.db.units_get(name).is_some() {
                    continue;
                }
                if let Err(e) = self.load_unit(name) {
                    log::warn!("Failed to load {}: {}", name, e);
                }
            }
        }
        ret
    }
}
