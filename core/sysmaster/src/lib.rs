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

//! sysmaster core: the unit registry, transactions of jobs, and the manager
//! exposing them.
///
/// dependency:
///    [manager]
///       ↑
///     [job]
///       ↑
///    [unit] → [service target]
///       ↑
///   [libcore]
///
pub mod job;
pub mod manager;
pub mod unit;

pub use manager::config::ManagerConfig;
pub use manager::Manager;
