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

//
#![allow(non_snake_case)]
use super::rentry::ServiceType;
use super::spawn::ExecCommand;
use libcore::error::*;
use libcore::unit::conf::{self, ConfEntry, UnitSection};
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Clone, Default)]
pub(super) struct ServiceSection {
    pub(super) Type: ServiceType,
    pub(super) ExecStart: Option<ExecCommand>,
    pub(super) ExecStop: Option<ExecCommand>,
    pub(super) ExecReload: Option<ExecCommand>,
}

impl ServiceSection {
    fn parse_entry(&mut self, entry: &ConfEntry, errors: &mut Vec<String>) {
        let slot = match entry.key.as_str() {
            "Type" => {
                match ServiceType::from_str(&entry.value) {
                    Ok(t) => self.Type = t,
                    Err(e) => errors.push(entry.invalid(&e)),
                }
                return;
            }
            "ExecStart" => &mut self.ExecStart,
            "ExecStop" => &mut self.ExecStop,
            "ExecReload" => &mut self.ExecReload,
            _ => {
                errors.push(entry.invalid("unknown key in [Service]"));
                return;
            }
        };

        if entry.value.is_empty() {
            *slot = None;
            return;
        }
        match ExecCommand::parse(&entry.value) {
            Ok(cmd) => *slot = Some(cmd),
            Err(e) => errors.push(entry.invalid(&e)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(super) struct ServiceConfig {
    pub(super) Unit: UnitSection,
    pub(super) Service: ServiceSection,
}

impl ServiceConfig {
    pub(super) fn parse(source: &mut dyn Read) -> Result<ServiceConfig> {
        let mut errors = Vec::new();
        let mut config = ServiceConfig::default();
        for section in conf::read_sections(source, &mut errors)? {
            match section.name.as_str() {
                "Unit" => {
                    for entry in section.entries.iter() {
                        config.Unit.parse_entry(entry, &mut errors);
                    }
                }
                "Service" => {
                    for entry in section.entries.iter() {
                        config.Service.parse_entry(entry, &mut errors);
                    }
                }
                "Install" => {}
                other => errors.push(format!("unknown section [{}] for a service", other)),
            }
        }

        if config.Service.ExecStart.is_none() {
            errors.push("missing ExecStart= in [Service]".to_string());
        }
        conf::finish(errors)?;
        Ok(config)
    }
}
