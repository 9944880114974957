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

//! sysmaster-core bin

use clap::Parser;
use libcore::error::*;
use std::process::exit;
use std::thread;
use sysmaster::{Manager, ManagerConfig};

/// parse program arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(short, long)]
    /// Configuration file instead of /etc/sysmaster/system.conf.
    config: Option<String>,

    /// Units to start instead of DefaultUnits=.
    units: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ManagerConfig::new(args.config.as_deref());
    log::init_log(
        "sysmaster",
        log::parse_level(&config.LogLevel),
        config.LogTarget.split(',').map(|t| t.trim()).collect(),
        &config.LogFile,
        config.LogFileSize,
        config.LogFileNumber,
    );

    let manager = Manager::new(&config);
    if let Err(e) = manager.load_all() {
        log::warn!("Failed to load all units: {}", e);
    }

    let units = if args.units.is_empty() {
        config.default_units()
    } else {
        args.units
    };
    let names: Vec<&str> = units.iter().map(|u| u.as_str()).collect();
    if let Err(e) = manager.start(&names) {
        log::error!("Failed to start {}: {}", names.join(" "), e);
        exit(nix::Error::from(e) as i32);
    }

    for unit in manager.units() {
        log::info!("{}: {} ({})", unit.id(), unit.active(), unit.sub());
    }

    loop {
        thread::park();
    }
}
