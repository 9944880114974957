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

use super::entry::UnitX;
use libcore::error::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// name => unit map of the registry
///
/// The lock is held for lookups and inserts only, never across a unit action.
pub(crate) struct UnitDb {
    units: Mutex<HashMap<String, Arc<UnitX>>>,
}

impl UnitDb {
    pub(crate) fn new() -> UnitDb {
        UnitDb {
            units: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn units_get(&self, name: &str) -> Option<Arc<UnitX>> {
        self.units().get(name).cloned()
    }

    /// index `unit` under `name`, the first unit claiming a name keeps it
    pub(crate) fn units_insert(&self, name: &str, unit: &Arc<UnitX>) -> bool {
        let mut units = self.units();
        if let Some(old) = units.get(name) {
            if !Arc::ptr_eq(old, unit) {
                log::debug!("Name {} already belongs to {}.", name, old.id());
            }
            return false;
        }
        units.insert(name.to_string(), Arc::clone(unit));
        drop(units);
        unit.add_name(name);
        true
    }

    /// Look `name` up, creating the unit with `create` when it is unknown.
    pub(crate) fn units_get_or_insert_with<F>(&self, name: &str, create: F) -> Result<Arc<UnitX>>
    where
        F: FnOnce() -> Result<UnitX>,
    {
        let mut units = self.units();
        if let Some(unit) = units.get(name) {
            return Ok(Arc::clone(unit));
        }
        let unit = Arc::new(create()?);
        units.insert(name.to_string(), Arc::clone(&unit));
        Ok(unit)
    }

    /// Insert a new unit under all of `names`, nothing is inserted when one
    /// of them is taken already.
    pub(crate) fn units_try_insert(&self, names: &[&str], unit: &Arc<UnitX>) -> Result<()> {
        let mut units = self.units();
        if let Some(name) = names.iter().find(|n| units.contains_key(**n)) {
            return Err(Error::AlreadyExists {
                name: name.to_string(),
            });
        }
        for name in names {
            units.insert(name.to_string(), Arc::clone(unit));
        }
        drop(units);
        for name in names {
            unit.add_name(name);
        }
        Ok(())
    }

    /// every unit once, ordered by id
    pub(crate) fn units_get_all(&self) -> Vec<Arc<UnitX>> {
        let mut all: Vec<Arc<UnitX>> = Vec::new();
        for unit in self.units().values() {
            if !all.iter().any(|u| Arc::ptr_eq(u, unit)) {
                all.push(Arc::clone(unit));
            }
        }
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    fn units(&self) -> MutexGuard<'_, HashMap<String, Arc<UnitX>>> {
        self.units.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::UnitDb;
    use crate::unit::entry::UnitX;
    use crate::unit::test::test_utils::TestUnit;
    use libcore::error::Error;
    use libcore::unit::UnitType;
    use std::sync::Arc;

    fn create_unit(name: &str) -> Arc<UnitX> {
        Arc::new(UnitX::new(
            name,
            UnitType::UnitService,
            Box::new(TestUnit::new()),
            1024,
        ))
    }

    #[test]
    fn test_units_insert_and_get() {
        let db = UnitDb::new();
        let unit = create_unit("foo.service");
        assert!(db.units_insert("foo.service", &unit));
        assert!(db.units_insert("foo", &unit));
        assert!(!db.units_insert("foo", &unit));

        let other = create_unit("foo.target");
        assert!(!db.units_insert("foo", &other));

        assert!(Arc::ptr_eq(&db.units_get("foo").unwrap(), &unit));
        assert_eq!(unit.names(), vec!["foo.service".to_string(), "foo".to_string()]);
        assert!(db.units_get("bar").is_none());
    }

    #[test]
    fn test_units_get_all() {
        let db = UnitDb::new();
        let b = create_unit("b.service");
        let a = create_unit("a.service");
        db.units_insert("b.service", &b);
        db.units_insert("b", &b);
        db.units_insert("a.service", &a);

        let ids: Vec<String> = db
            .units_get_all()
            .iter()
            .map(|u| u.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a.service", "b.service"]);
    }

    #[test]
    fn test_units_try_insert() {
        let db = UnitDb::new();
        let unit = create_unit("foo.service");
        db.units_try_insert(&["foo.service", "foo"], &unit).unwrap();

        let other = create_unit("foo.target");
        let ret = db.units_try_insert(&["foo.target", "foo"], &other);
        assert!(matches!(ret, Err(Error::AlreadyExists { name }) if name == "foo"));
        assert!(db.units_get("foo.target").is_none());
    }

    #[test]
    fn test_units_get_or_insert_with() {
        let db = UnitDb::new();
        let create = || {
            Ok(UnitX::new(
                "foo.service",
                UnitType::UnitService,
                Box::new(TestUnit::new()),
                1024,
            ))
        };
        let first = db.units_get_or_insert_with("foo.service", create).unwrap();

        let refuse = || {
            Err(Error::Other {
                msg: "unused".to_string(),
            })
        };
        let second = db.units_get_or_insert_with("foo.service", refuse).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
