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

use crate::unit::UnitX;
use libcore::unit::UnitRelations;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum JobKind {
    // 'type' is better, but it's keyword in rust
    Start,
    Stop,
    Reload,
    Restart,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Start => write!(f, "start"),
            JobKind::Stop => write!(f, "stop"),
            JobKind::Reload => write!(f, "reload"),
            JobKind::Restart => write!(f, "restart"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum JobResult {
    Done,
    Failed,
    /* a mandatory predecessor failed, the job never ran */
    Dependency,
    /* nothing to do */
    Skipped,
}

impl JobResult {
    pub(super) fn is_failure(&self) -> bool {
        matches!(self, JobResult::Failed | JobResult::Dependency)
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobResult::Done => write!(f, "done"),
            JobResult::Failed => write!(f, "failed"),
            JobResult::Dependency => write!(f, "dependency"),
            JobResult::Skipped => write!(f, "skipped"),
        }
    }
}

/// How a request treats the jobs it pulls in.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum JobMode {
    /// a mandatory job replaces a non-mandatory one of conflicting kind
    #[serde(alias = "replace")]
    Replace,
    /// jobs of conflicting kind always fail the transaction
    #[serde(alias = "fail")]
    Fail,
    /// start the requested units, stop everything else
    #[serde(alias = "isolate")]
    Isolate,
    /// the requested jobs only
    #[serde(alias = "ignore_dependencies")]
    IgnoreDependencies,
}

impl Default for JobMode {
    fn default() -> Self {
        JobMode::Replace
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub(crate) struct JobAttr {
    /* requested explicitly, or pulled in by 'requires' or 'conflicts' */
    pub(crate) mandatory: bool,
    /* the failure is the failure of the whole transaction */
    pub(crate) matters: bool,
}

impl JobAttr {
    pub(crate) fn new(mandatory: bool, matters: bool) -> JobAttr {
        JobAttr { mandatory, matters }
    }

    pub(super) fn or(&mut self, other: &Self) -> &Self {
        self.mandatory |= other.mandatory;
        self.matters |= other.matters;
        self
    }
}

#[derive(Clone)]
pub(crate) struct Job {
    unit: Arc<UnitX>,
    kind: JobKind,
    attr: JobAttr,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("unit", &self.unit.id())
            .field("kind", &self.kind)
            .field("attr", &self.attr)
            .finish()
    }
}

impl Job {
    pub(super) fn new(unit: &Arc<UnitX>, kind: JobKind, attr: JobAttr) -> Job {
        Job {
            unit: Arc::clone(unit),
            kind,
            attr,
        }
    }

    pub(crate) fn unit(&self) -> &Arc<UnitX> {
        &self.unit
    }

    pub(crate) fn kind(&self) -> JobKind {
        self.kind
    }

    pub(crate) fn attr(&self) -> JobAttr {
        self.attr
    }

    pub(super) fn set_kind(&mut self, kind: JobKind) {
        self.kind = kind;
    }

    pub(super) fn attr_mut(&mut self) -> &mut JobAttr {
        &mut self.attr
    }

    pub(super) fn replace(&mut self, kind: JobKind, attr: JobAttr) {
        self.kind = kind;
        self.attr = attr;
    }
}

/// The kind of one job doing both `old` and `new`, None if they conflict.
pub(super) fn job_merge_kind(old: JobKind, new: JobKind, unit_active: bool) -> Option<JobKind> {
    match (old, new) {
        (a, b) if a == b => Some(a),
        // 'stop' exists, others are all conflicting
        (JobKind::Stop, _) | (_, JobKind::Stop) => None,
        // 'restart' exists, ('reload' | 'start') => 'restart'
        (JobKind::Restart, _) | (_, JobKind::Restart) => Some(JobKind::Restart),
        // 'start' <=or=> 'reload'
        _ => {
            if unit_active {
                Some(JobKind::Reload)
            } else {
                Some(JobKind::Start)
            }
        }
    }
}

/// Order of the jobs of units a and b, where a has relation `atom` to b.
/// -1: a runs first, 1: b runs first.
pub(super) fn job_order_compare(rk_a: JobKind, rk_b: JobKind, atom: UnitRelations) -> i8 {
    if atom == UnitRelations::UnitAfter {
        return -job_order_compare(rk_b, rk_a, UnitRelations::UnitBefore);
    }

    match rk_b {
        JobKind::Stop => 1, // order: b -> a
        _ => -1,            // order: a -> b
    }
}
