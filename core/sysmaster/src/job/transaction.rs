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

use super::entry::{self, Job, JobAttr, JobKind, JobMode, JobResult};
use super::order::{self, OrderGraph};
use super::run;
use crate::unit::{UnitManager, UnitX};
use libcore::error::*;
use libcore::logbuf::LogBuffer;
use libcore::unit::{UnitLoadState, UnitRelations};
use std::collections::HashMap;
use std::sync::Arc;

/// The jobs of one request: expanded along the dependencies of the requested
/// units, ordered, then run. Nothing runs when building or ordering fails.
pub(crate) struct Transaction<'a> {
    // associated objects
    um: &'a UnitManager,
    log: &'a LogBuffer,

    // owned objects
    mode: JobMode,
    jobs: Vec<Job>,
    index: HashMap<String, usize>, // key: unit id, data: job index
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(um: &'a UnitManager, log: &'a LogBuffer, mode: JobMode) -> Transaction<'a> {
        Transaction {
            um,
            log,
            mode,
            jobs: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[allow(dead_code)]
    pub(crate) fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Add a job and the jobs it pulls in.
    pub(crate) fn add(&mut self, kind: JobKind, unit: &Arc<UnitX>, attr: JobAttr) -> Result<()> {
        // check input
        trans_expand_check_input(kind, unit)?;

        // record
        let (kind, changed) = self.record(kind, unit, attr)?;

        // expand
        if changed && self.mode != JobMode::IgnoreDependencies {
            let attr = self.jobs[self.index[unit.id()]].attr();
            match kind {
                JobKind::Start | JobKind::Restart => self.trans_expand_start(unit, attr)?,
                JobKind::Stop => self.trans_expand_stop(unit, attr)?,
                JobKind::Reload => {}
            }
        }

        Ok(())
    }

    /* Insert the job or merge it into the one the unit has already. Answers
     * the resulting kind and whether anything changed. */
    fn record(
        &mut self,
        kind: JobKind,
        unit: &Arc<UnitX>,
        attr: JobAttr,
    ) -> Result<(JobKind, bool)> {
        let idx = match self.index.get(unit.id()) {
            None => {
                self.index.insert(unit.id().to_string(), self.jobs.len());
                self.jobs.push(Job::new(unit, kind, attr));
                return Ok((kind, true));
            }
            Some(&idx) => idx,
        };

        let old = self.jobs[idx].clone();
        let active = unit.active().is_active_or_reloading();
        match entry::job_merge_kind(old.kind(), kind, active) {
            Some(merged) => {
                let job = &mut self.jobs[idx];
                job.set_kind(merged);
                job.attr_mut().or(&attr);
                let changed = merged != old.kind() || job.attr() != old.attr();
                Ok((merged, changed))
            }
            None => {
                if self.mode != JobMode::Fail && attr.mandatory && !old.attr().mandatory {
                    log::debug!(
                        "Replacing {} job of {} by {} job.",
                        old.kind(),
                        unit.id(),
                        kind
                    );
                    self.jobs[idx].replace(kind, attr);
                    return Ok((kind, true));
                }
                Err(Error::TransactionConflict {
                    unit: unit.id().to_string(),
                    existing: old.kind().to_string(),
                    requested: kind.to_string(),
                })
            }
        }
    }

    fn trans_expand_start(&mut self, unit: &Arc<UnitX>, attr: JobAttr) -> Result<()> {
        for dep in unit.requires() {
            let other = self.um.get(&dep).map_err(|e| Error::DependencyFailure {
                unit: unit.id().to_string(),
                dependency: dep.clone(),
                reason: e.to_string(),
            })?;
            match self.add(JobKind::Start, &other, JobAttr::new(true, attr.matters)) {
                Ok(()) => {}
                Err(e @ Error::TransactionConflict { .. })
                | Err(e @ Error::DependencyFailure { .. })
                | Err(e @ Error::DependencyCycle { .. }) => return Err(e),
                Err(e) => {
                    return Err(Error::DependencyFailure {
                        unit: unit.id().to_string(),
                        dependency: dep,
                        reason: e.to_string(),
                    })
                }
            }
        }

        for dep in unit.wants() {
            let snapshot = (self.jobs.clone(), self.index.clone());
            let ret = self
                .um
                .get(&dep)
                .and_then(|other| self.add(JobKind::Start, &other, JobAttr::new(false, false)));
            if let Err(e) = ret {
                (self.jobs, self.index) = snapshot;
                let msg = format!("Wanted unit {} is not started: {}", dep, e);
                unit.log().log_line(&msg);
                self.log.log_line(&format!("{}: {}", unit.id(), msg));
                log::warn!("{}: {}", unit.id(), msg);
            }
        }

        for dep in unit.conflicts() {
            let other = match self.um.get(&dep) {
                Err(_) => continue, // nothing to stop
                Ok(v) => v,
            };
            if Arc::ptr_eq(&other, unit) {
                continue;
            }
            self.add(JobKind::Stop, &other, JobAttr::new(true, false))?;
        }

        // the units declaring a conflict with this one
        for other in self.um.units().iter() {
            if Arc::ptr_eq(other, unit) || !other.active().is_active_or_activating() {
                continue;
            }
            if self.refers_to(&other.conflicts(), unit) {
                self.add(JobKind::Stop, other, JobAttr::new(true, false))?;
            }
        }

        Ok(())
    }

    fn trans_expand_stop(&mut self, unit: &Arc<UnitX>, attr: JobAttr) -> Result<()> {
        for other in self.um.units().iter() {
            if Arc::ptr_eq(other, unit)
                || !other.load_state().is_loaded()
                || !other.active().is_active_or_activating()
            {
                continue;
            }
            if self.refers_to(&other.requires(), unit) {
                self.add(JobKind::Stop, other, JobAttr::new(true, attr.matters))?;
            }
        }
        Ok(())
    }

    /// Stop every running unit the transaction leaves alone.
    pub(crate) fn trans_affect_isolate(&mut self) -> Result<()> {
        if self.mode != JobMode::Isolate {
            return Err(Error::Other {
                msg: format!("isolating in {:?} mode", self.mode),
            });
        }

        for other in self.um.units().iter() {
            // it is allowed not to be affected by isolation
            if other.ignore_on_isolate() {
                continue;
            }

            // there is something assigned, not affected
            if self.index.contains_key(other.id()) || !other.active().is_active_or_activating() {
                continue;
            }

            // isolate(stop)
            let snapshot = (self.jobs.clone(), self.index.clone());
            if let Err(e) = self.add(JobKind::Stop, other, JobAttr::new(false, false)) {
                (self.jobs, self.index) = snapshot;
                log::debug!("Not stopping {} on isolate: {}", other.id(), e);
            }
        }

        Ok(())
    }

    fn refers_to(&self, names: &[String], unit: &Arc<UnitX>) -> bool {
        names.iter().any(|name| match self.um.lookup(name) {
            Some(u) => Arc::ptr_eq(&u, unit),
            None => false,
        })
    }

    fn job_index_of(&self, name: &str) -> Option<usize> {
        let unit = self.um.lookup(name)?;
        self.index.get(unit.id()).copied()
    }

    fn job_graph(&self) -> OrderGraph {
        let names = self.jobs.iter().map(|j| j.unit().id().to_string()).collect();
        let mut graph = OrderGraph::new(names);
        for (a, job) in self.jobs.iter().enumerate() {
            let unit = job.unit();
            let relations = [
                (UnitRelations::UnitAfter, unit.after()),
                (UnitRelations::UnitBefore, unit.before()),
            ];
            for (atom, others) in relations {
                for name in others {
                    let b = match self.job_index_of(&name) {
                        None => continue,
                        Some(v) => v,
                    };
                    match entry::job_order_compare(job.kind(), self.jobs[b].kind(), atom) {
                        -1 => graph.add_edge(a, b),
                        _ => graph.add_edge(b, a),
                    }
                }
            }
        }
        graph
    }

    /// A linear order of the jobs, predecessors first.
    pub(crate) fn order(&self) -> Result<(OrderGraph, Vec<usize>)> {
        let graph = self.job_graph();
        match order::job_order(&graph) {
            Ok(order) => Ok((graph, order)),
            Err(chain) => {
                let e = Error::DependencyCycle { chain };
                self.log.log_line(&e.to_string());
                log::error!("{}", e);
                Err(e)
            }
        }
    }

    /// Order and run the jobs. The first job of the order whose failure
    /// matters is the result.
    pub(crate) fn run(self) -> Result<()> {
        let (graph, order) = self.order()?;
        let preds = graph.into_preds();
        let mut outcomes = run::job_run(&self.jobs, &preds, &order, self.log);

        let failed = order.iter().copied().find(|&idx| {
            self.jobs[idx].attr().matters && outcomes[idx].result.is_failure()
        });
        let idx = match failed {
            None => return Ok(()),
            Some(v) => v,
        };

        let job = &self.jobs[idx];
        let unit = job.unit().id().to_string();
        if outcomes[idx].result == JobResult::Dependency {
            let pred = outcomes[idx].blocker.unwrap_or(idx);
            let pred_job = &self.jobs[pred];
            return Err(Error::DependencyFailure {
                unit,
                dependency: pred_job.unit().id().to_string(),
                reason: format!("{} job {}", pred_job.kind(), outcomes[pred].result),
            });
        }

        let source = outcomes[idx].error.take().unwrap_or_else(|| Error::Other {
            msg: format!("{} job failed", job.kind()),
        });
        Err(Error::JobFailed {
            unit,
            source: Box::new(source),
        })
    }
}

fn trans_expand_check_input(kind: JobKind, unit: &UnitX) -> Result<()> {
    if kind == JobKind::Stop {
        return Ok(());
    }

    match unit.load_state() {
        UnitLoadState::Loaded => {}
        UnitLoadState::Masked => {
            return Err(Error::UnitMasked {
                unit: unit.id().to_string(),
            })
        }
        state => {
            return Err(Error::NotLoaded {
                unit: unit.id().to_string(),
                state: state.to_string(),
            })
        }
    }

    if kind == JobKind::Reload && !unit.can_reload() {
        return Err(Error::NoReloadSupport {
            unit: unit.id().to_string(),
        });
    }

    Ok(())
}
