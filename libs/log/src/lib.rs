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

//! Logging of sysmaster components.
//!
//! The macros are the ones of the `log` facade, this crate owns the targets
//! and the line format shared by the process log and the in-memory unit logs.
pub mod logger;

pub use log::{debug, error, info, log_enabled, trace, warn};
pub use log::{max_level, set_max_level};
pub use log::{Level, LevelFilter, Log, Metadata, Record};

pub use logger::init_log;
pub use logger::{format_local_time, local_time_str};

/// Initialize console logger.
pub fn init_log_to_console(name: &str, level: Level) {
    init_log(name, level, vec!["console"], "", 0, 0);
}

/// Parse a level name like `debug` or `WARN`, unknown names map to `Info`.
pub fn parse_level(level: &str) -> Level {
    level.parse::<Level>().unwrap_or(Level::Info)
}

#[cfg(test)]
mod tests {
    use crate::{init_log, parse_level, Level};

    #[test]
    fn test_init_log_to_console() {
        crate::init_log_to_console("test", Level::Debug);
        crate::debug!("hello, debug!");
        init_log("test", Level::Debug, vec!["console", "console"], "", 0, 0);
        crate::error!("hello, error!");
        crate::set_max_level(Level::Info.to_level_filter());
        crate::debug!("hello debug!"); /* Won't print */
        init_log("test", Level::Debug, vec!["nowhere"], "", 0, 0);
        crate::info!("hello, info!"); /* No target left */
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::Debug);
        assert_eq!(parse_level("WARN"), Level::Warn);
        assert_eq!(parse_level("loud"), Level::Info);
    }
}
