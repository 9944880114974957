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

//! # Target groups units and serves as a synchronization point during startup.
//!  Target has no actual action to execute, starting or stopping it only
//!  flips its state. Its definition carries no private section.
//! #  Example:
//! ``` toml
//!  [Unit]
//!  Description="Multi-User System"
//!  Requires=basic.target
//!  Wants=sshd.service
//!  After=basic.target
//!
//!  [Install]
//!  WantedBy=
//! ```

// dependency: target_rentry -> {target_mng} -> target_unit
mod mng;
mod rentry;
mod unit;

pub use unit::Target;
