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

//! Target is the entrance of the sub unit, it implements the trait SubUnit.
use super::mng::TargetMng;
use libcore::error::*;
use libcore::unit::conf::{self, UnitSection};
use libcore::unit::{SubUnit, UnitActiveState, UnitRelations};
use std::io::Read;
use std::sync::RwLock;

/// Grouping unit without any action of its own.
pub struct Target {
    config: RwLock<UnitSection>,
    mng: TargetMng,
}

impl Target {
    ///
    pub fn new() -> Target {
        Target {
            config: RwLock::new(UnitSection::default()),
            mng: TargetMng::new(),
        }
    }

    fn config(&self) -> UnitSection {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::new()
    }
}

impl SubUnit for Target {
    fn define(&self, source: &mut dyn Read) -> Result<()> {
        let mut errors = Vec::new();
        let mut unit = UnitSection::default();
        for section in conf::read_sections(source, &mut errors)? {
            match section.name.as_str() {
                "Unit" => {
                    for entry in section.entries.iter() {
                        unit.parse_entry(entry, &mut errors);
                    }
                }
                "Install" => {}
                other => errors.push(format!("unknown section [{}] for a target", other)),
            }
        }
        conf::finish(errors)?;

        log::debug!("load for target: {}", unit.Description);
        if let Ok(mut config) = self.config.write() {
            *config = unit;
        }
        Ok(())
    }

    fn start(&self) -> Result<()> {
        self.mng.start_action();
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.mng.stop_action();
        Ok(())
    }

    fn current_active_state(&self) -> UnitActiveState {
        self.mng.to_unit_state()
    }

    fn get_subunit_state(&self) -> String {
        self.mng.get_state()
    }

    fn description(&self) -> String {
        self.config().Description
    }

    fn dependencies(&self, relation: UnitRelations) -> Vec<String> {
        self.config().dependencies(relation)
    }

    fn ignore_on_isolate(&self) -> bool {
        self.config().IgnoreOnIsolate
    }
}
