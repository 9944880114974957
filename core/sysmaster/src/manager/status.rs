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

//! Snapshots handed out by the status queries.
use crate::unit::UnitX;
use libcore::unit::{UnitActiveState, UnitLoadState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemState {
    /// no unit failed
    Running,
    /// at least one unit failed
    Degraded,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemState::Running => write!(f, "running"),
            SystemState::Degraded => write!(f, "degraded"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnableState {
    Enabled,
    Disabled,
    Static,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub state: SystemState,
    pub since: SystemTime,
    pub log: Vec<u8>,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Since: {}", log::format_local_time(self.since))?;
        writeln!(f)?;
        write!(f, "{}", String::from_utf8_lossy(&self.log))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadStatus {
    pub path: Option<PathBuf>,
    pub loaded: UnitLoadState,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivationStatus {
    pub state: UnitActiveState,
    pub sub: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitStatus {
    pub name: String,
    pub description: String,
    pub load: LoadStatus,
    pub activation: ActivationStatus,
    pub log: Vec<u8>,
}

impl UnitStatus {
    pub(super) fn new(unit: &UnitX) -> UnitStatus {
        UnitStatus {
            name: unit.id().to_string(),
            description: unit.description(),
            load: LoadStatus {
                path: unit.path(),
                loaded: unit.load_state(),
            },
            activation: ActivationStatus {
                state: unit.active(),
                sub: unit.sub(),
            },
            log: unit.log().contents(),
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            writeln!(f, "● {}", self.name)?;
        } else {
            writeln!(f, "● {} - {}", self.name, self.description)?;
        }
        match &self.load.path {
            Some(path) => writeln!(f, "    Loaded: {} ({})", self.load.loaded, path.display())?,
            None => writeln!(f, "    Loaded: {}", self.load.loaded)?,
        }
        writeln!(
            f,
            "    Active: {} ({})",
            self.activation.state, self.activation.sub
        )?;
        writeln!(f)?;
        write!(f, "{}", String::from_utf8_lossy(&self.log))
    }
}
