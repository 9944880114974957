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

use super::deps::{unit_name_to_type, UnitRelations, UnitType};
use super::state::UnitActiveState;
use crate::error::*;
use std::io::Read;

///The trait Defining Shared Behavior of sub unit
///
/// difference sub unit ref by dynamic trait, one implementation per
/// supported [`UnitType`]
///
pub trait SubUnit: Send + Sync {
    /// Parse the definition text. Every malformed clause is collected into
    /// one `Error::DefinitionInvalid`, the previous definition is kept then.
    fn define(&self, source: &mut dyn Read) -> Result<()>;

    /// Start a Unit
    /// Each Sub Unit need to implement its own start function
    ///
    fn start(&self) -> Result<()> {
        Ok(())
    }

    ///
    fn stop(&self) -> Result<()> {
        Ok(())
    }

    /// only called when `can_reload` answers true
    fn reload(&self) -> Result<()> {
        Err(Error::NotImplemented {
            what: "reload".to_string(),
        })
    }

    ///
    fn can_reload(&self) -> bool {
        false
    }

    /// the state the implementation observes right now
    fn current_active_state(&self) -> UnitActiveState;

    /// implementation specific detail, like "running" or "exited"
    fn get_subunit_state(&self) -> String;

    ///
    fn description(&self) -> String {
        String::new()
    }

    /// unit names the definition declares for `relation`
    fn dependencies(&self, relation: UnitRelations) -> Vec<String>;

    /// stop jobs of an isolate request leave this unit alone
    fn ignore_on_isolate(&self) -> bool {
        false
    }
}

/// The maximum length of a valid unit name
const UNIT_NAME_MAX: usize = 255;

/// check if the given unit name is valid: "prefix.suffix" with a known suffix
pub fn unit_name_is_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > UNIT_NAME_MAX {
        return false;
    }
    let prefix = match name.rsplit_once('.') {
        None => return false,
        Some((prefix, _)) => prefix,
    };
    if prefix.is_empty() || prefix.contains('/') {
        return false;
    }
    unit_name_to_type(name) != UnitType::UnitTypeInvalid
}

/// The suffix-trimmed alias of a unit name, "foo.service" => "foo".
pub fn unit_name_alias(name: &str) -> Option<&str> {
    if !unit_name_is_valid(name) {
        return None;
    }
    name.rsplit_once('.').map(|(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    use super::{unit_name_alias, unit_name_is_valid};

    #[test]
    fn test_unit_name_is_valid() {
        assert!(unit_name_is_valid("foo.service"));
        assert!(unit_name_is_valid("multi-user.target"));
        assert!(unit_name_is_valid("dev-sda.mount"));
    }

    #[test]
    fn test_unit_name_is_not_valid() {
        assert!(!unit_name_is_valid(""));
        assert!(!unit_name_is_valid(".service"));
        assert!(!unit_name_is_valid("foo"));
        assert!(!unit_name_is_valid("foo.conf"));
        assert!(!unit_name_is_valid("a/b.service"));
        assert!(!unit_name_is_valid(&format!("{}.service", "a".repeat(300))));
    }

    #[test]
    fn test_unit_name_alias() {
        assert_eq!(unit_name_alias("foo.service"), Some("foo"));
        assert_eq!(unit_name_alias("foo.bar.target"), Some("foo.bar"));
        assert_eq!(unit_name_alias("foo"), None);
    }
}
