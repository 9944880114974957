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

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Relations a unit declares towards other units by name.
#[allow(missing_docs)]
#[derive(Hash, PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum UnitRelations {
    UnitRequires,
    UnitWants,
    UnitConflicts,
    UnitBefore,
    UnitAfter,
}

/// Unit kinds known by their name suffix.
#[allow(missing_docs)]
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum UnitType {
    UnitService = 0,
    UnitTarget,
    UnitSocket,
    UnitMount,
    UnitTimer,
    UnitPath,
    UnitDevice,
    UnitSwap,
    UnitSlice,
    UnitScope,
    UnitTypeInvalid,
}

impl UnitType {
    ///
    pub fn iterator() -> impl Iterator<Item = UnitType> {
        [
            UnitType::UnitService,
            UnitType::UnitTarget,
            UnitType::UnitSocket,
            UnitType::UnitMount,
            UnitType::UnitTimer,
            UnitType::UnitPath,
            UnitType::UnitDevice,
            UnitType::UnitSwap,
            UnitType::UnitSlice,
            UnitType::UnitScope,
        ]
        .iter()
        .copied()
    }

    /// whether units of this kind can be loaded
    pub fn is_supported(&self) -> bool {
        matches!(self, UnitType::UnitService | UnitType::UnitTarget)
    }
}

impl FromStr for UnitType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ret = match s {
            "service" => UnitType::UnitService,
            "target" => UnitType::UnitTarget,
            "socket" => UnitType::UnitSocket,
            "mount" => UnitType::UnitMount,
            "timer" => UnitType::UnitTimer,
            "path" => UnitType::UnitPath,
            "device" => UnitType::UnitDevice,
            "swap" => UnitType::UnitSwap,
            "slice" => UnitType::UnitSlice,
            "scope" => UnitType::UnitScope,
            _ => UnitType::UnitTypeInvalid,
        };
        Ok(ret)
    }
}

impl From<UnitType> for String {
    fn from(u_t: UnitType) -> Self {
        match u_t {
            UnitType::UnitService => "service".into(),
            UnitType::UnitTarget => "target".into(),
            UnitType::UnitSocket => "socket".into(),
            UnitType::UnitMount => "mount".into(),
            UnitType::UnitTimer => "timer".into(),
            UnitType::UnitPath => "path".into(),
            UnitType::UnitDevice => "device".into(),
            UnitType::UnitSwap => "swap".into(),
            UnitType::UnitSlice => "slice".into(),
            UnitType::UnitScope => "scope".into(),
            UnitType::UnitTypeInvalid => String::new(),
        }
    }
}

/// parse UnitType by unit_name, names without a suffix are invalid
pub fn unit_name_to_type(unit_name: &str) -> UnitType {
    match unit_name.rsplit_once('.') {
        None => UnitType::UnitTypeInvalid,
        Some((_, suffix)) => UnitType::from_str(suffix).unwrap_or(UnitType::UnitTypeInvalid),
    }
}
