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

#![allow(non_snake_case)]

use confique::{Config, FileFormat, Partial};
use libcore::logbuf::LOG_BUFFER_SIZE;
use std::path::PathBuf;

pub const SYSTEM_CONFIG: &str = "/etc/sysmaster/system.conf";
const UNIT_PATH_DEFAULT: &str = "/etc/sysmaster/system:/usr/lib/sysmaster/system";

#[derive(Config, Debug)]
pub struct ManagerConfig {
    /// colon separated, the first path holding a definition wins
    #[config(
        env = "SYSMASTER_UNIT_PATH",
        default = "/etc/sysmaster/system:/usr/lib/sysmaster/system"
    )]
    pub UnitPath: String,
    #[config(default = 10000)] // LOG_BUFFER_SIZE
    pub LogCapacity: usize,

    #[config(default = "info")]
    pub LogLevel: String,
    #[config(default = "console")]
    pub LogTarget: String,
    #[config(default = "/var/log/sysmaster/sysmaster.log")]
    pub LogFile: String,
    #[config(default = 10240)]
    pub LogFileSize: u32,
    #[config(default = 10)]
    pub LogFileNumber: u32,

    /// space separated, started when no unit is given on the command line
    #[config(default = "default.target")]
    pub DefaultUnits: String,
}

impl ManagerConfig {
    pub fn new(file: Option<&str>) -> ManagerConfig {
        type ConfigPartial = <ManagerConfig as Config>::Partial;
        let mut partial: ConfigPartial = match Partial::from_env() {
            Err(_) => return ManagerConfig::default(),
            Ok(v) => v,
        };
        partial = match confique::File::with_format(file.unwrap_or(SYSTEM_CONFIG), FileFormat::Toml)
            .load()
        {
            Err(_) => return ManagerConfig::default(),
            Ok(v) => partial.with_fallback(v),
        };
        partial = partial.with_fallback(ConfigPartial::default_values());
        match ManagerConfig::from_partial(partial) {
            Ok(v) => v,
            Err(_) => ManagerConfig::default(),
        }
    }

    pub fn unit_paths(&self) -> Vec<PathBuf> {
        self.UnitPath
            .split(':')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    pub fn default_units(&self) -> Vec<String> {
        self.DefaultUnits
            .split_whitespace()
            .map(String::from)
            .collect()
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            UnitPath: UNIT_PATH_DEFAULT.to_string(),
            LogCapacity: LOG_BUFFER_SIZE,
            LogLevel: "info".to_string(),
            LogTarget: "console".to_string(),
            LogFile: "/var/log/sysmaster/sysmaster.log".to_string(),
            LogFileSize: 10240,
            LogFileNumber: 10,
            DefaultUnits: "default.target".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use libtests::get_crate_root;
    use std::path::PathBuf;

    use super::*;
    #[test]
    fn load() {
        let mut file: PathBuf = get_crate_root().unwrap();
        file.push("config/system.conf");
        let config = ManagerConfig::new(file.to_str());
        assert_eq!(config.LogLevel, "debug");
        assert_eq!(config.LogCapacity, 10000);
        assert_eq!(config.LogFileNumber, 10);
        assert_eq!(config.default_units(), vec!["multi-user.target"]);
    }

    #[test]
    fn load_missing_file() {
        let config = ManagerConfig::new(Some("/nonexistent/system.conf"));
        assert_eq!(config.DefaultUnits, "default.target");
        assert_eq!(config.LogCapacity, LOG_BUFFER_SIZE);
    }

    #[test]
    fn unit_paths() {
        let config = ManagerConfig {
            UnitPath: "/a::/b/c".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.unit_paths(),
            vec![PathBuf::from("/a"), PathBuf::from("/b/c")]
        );
    }
}
