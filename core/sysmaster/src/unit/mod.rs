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

//!  The unit module holds the unit records and the registry they live in.
//!  The definition of a unit is read by its sub unit, found through the
//!  unit type of its name.
//!
//! # Example:
//! ``` toml
//! [Unit]
//! Description=CN
//! Documentation=192.168.1.1
//! Requires=c.service
//! Wants=b.service
//! After=c.service
//!
//! [Service]
//! ExecStart=/usr/bin/sleep 100
//!
//! [Install]
//! WantedBy=multi-user.target
//! ```
pub use entry::UnitX;
pub use manager::UnitManager;

mod datastore;
mod entry;
mod manager;
mod uload;
mod util;

#[cfg(test)]
pub(crate) mod test;
