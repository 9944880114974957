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

//! Jobs and the transactions they are built and run in.
//!
//! A request creates one transaction, it is expanded along the relations of
//! the requested units, ordered by their After=/Before=, and run with one
//! thread per job.
pub use entry::{JobKind, JobMode, JobResult};
pub(crate) use entry::JobAttr;
pub(crate) use transaction::Transaction;

mod entry;
mod order;
mod run;
mod transaction;
