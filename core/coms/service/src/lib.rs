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

//! # Service unit: runs and supervises the command of `ExecStart=`.
//! #  Example:
//! ``` toml
//!  [Unit]
//!  Description=foo service
//!
//!  [Service]
//!  Type=simple
//!  ExecStart=/usr/bin/foo --foreground
//!  ExecReload=-/usr/bin/foo --reload
//! ```
//! `Type=` is `simple` (active while the main process runs) or `oneshot`
//! (active once `ExecStart=` exited successfully). Reload is only offered
//! when `ExecReload=` is set.

// dependency: service_rentry -> service_spawn -> service_config -> {service_mng} -> service_unit
mod config;
mod mng;
mod rentry;
mod spawn;
mod unit;

pub use unit::Service;
