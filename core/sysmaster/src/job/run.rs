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

use super::entry::{Job, JobKind, JobResult};
use crate::unit::UnitX;
use libcore::error::*;
use libcore::logbuf::LogBuffer;
use libcore::unit::UnitActiveState;
use std::sync::{Condvar, Mutex};
use std::thread;

/// How a job ended, as seen by the jobs ordered after it.
#[derive(Debug, Clone, Copy)]
struct JobDone {
    /* the mandatory job whose failure this one carries on */
    blocked_by: Option<usize>,
}

impl JobDone {
    fn new(jobs: &[Job], idx: usize, result: JobResult, blocker: Option<usize>) -> JobDone {
        let blocked_by = match result {
            JobResult::Dependency => blocker,
            JobResult::Failed if jobs[idx].attr().mandatory => Some(idx),
            _ => None,
        };
        JobDone { blocked_by }
    }
}

/// Completion of one job, waited on by the jobs ordered after it.
struct JobSignal {
    done: Mutex<Option<JobDone>>,
    cond: Condvar,
}

impl JobSignal {
    fn new() -> JobSignal {
        JobSignal {
            done: Mutex::new(None),
            cond: Condvar::new(),
        }
    }

    fn notify(&self, done: JobDone) {
        let mut d = self.done.lock().unwrap_or_else(|e| e.into_inner());
        *d = Some(done);
        self.cond.notify_all();
    }

    fn wait(&self) -> JobDone {
        let mut d = self.done.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(done) = *d {
                return done;
            }
            d = self.cond.wait(d).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/* a job thread that goes away without a result counts as failed */
struct JobNotifier<'a> {
    signal: &'a JobSignal,
    done: JobDone,
}

impl Drop for JobNotifier<'_> {
    fn drop(&mut self) {
        self.signal.notify(self.done);
    }
}

/// What happened to one job.
#[derive(Debug)]
pub(super) struct JobOutcome {
    pub(super) result: JobResult,
    /* the error of a failed job */
    pub(super) error: Option<Error>,
    /* the failed mandatory job a dependency-skipped job waited on in vain */
    pub(super) blocker: Option<usize>,
}

impl JobOutcome {
    fn new(result: JobResult) -> JobOutcome {
        JobOutcome {
            result,
            error: None,
            blocker: None,
        }
    }
}

/// Run all jobs, each in its own thread as soon as its predecessors are
/// done. A job is skipped when a mandatory predecessor failed, or when a
/// predecessor was skipped for that reason, however far back the failure
/// is. Returns the outcomes by job index.
pub(super) fn job_run(
    jobs: &[Job],
    preds: &[Vec<usize>],
    order: &[usize],
    log: &LogBuffer,
) -> Vec<JobOutcome> {
    let signals: Vec<JobSignal> = jobs.iter().map(|_| JobSignal::new()).collect();
    let mut outcomes: Vec<Option<JobOutcome>> = jobs.iter().map(|_| None).collect();

    thread::scope(|s| {
        let signals = &signals;
        let mut handles = Vec::with_capacity(order.len());
        for &idx in order {
            let job = &jobs[idx];
            let job_preds = &preds[idx];
            let handle = s.spawn(move || {
                let mut notifier = JobNotifier {
                    signal: &signals[idx],
                    done: JobDone::new(jobs, idx, JobResult::Failed, None),
                };
                let outcome = job_wait_and_run(jobs, job, job_preds, signals);
                notifier.done = JobDone::new(jobs, idx, outcome.result, outcome.blocker);
                log.log_line(&format!("{} {}: {}", job.kind(), job.unit().id(), outcome.result));
                outcome
            });
            handles.push((idx, handle));
        }

        for (idx, handle) in handles {
            let outcome = match handle.join() {
                Ok(v) => v,
                Err(_) => {
                    log::error!("Job thread of {} panicked.", jobs[idx].unit().id());
                    JobOutcome::new(JobResult::Failed)
                }
            };
            outcomes[idx] = Some(outcome);
        }
    });

    outcomes
        .into_iter()
        .map(|o| o.unwrap_or_else(|| JobOutcome::new(JobResult::Failed)))
        .collect()
}

fn job_wait_and_run(
    jobs: &[Job],
    job: &Job,
    preds: &[usize],
    signals: &[JobSignal],
) -> JobOutcome {
    let mut blocker = None;
    for &pred in preds {
        let done = signals[pred].wait();
        if blocker.is_none() {
            blocker = done.blocked_by;
        }
    }

    let unit = job.unit();
    if let Some(pred) = blocker {
        let dep = jobs[pred].unit().id();
        unit.log().log_line(&format!(
            "Dependency {} failed, skipping {} job.",
            dep,
            job.kind()
        ));
        log::warn!("Dependency {} of {} failed, skipping {} job.", dep, unit.id(), job.kind());
        return JobOutcome {
            result: JobResult::Dependency,
            error: None,
            blocker: Some(pred),
        };
    }

    match job_trigger_unit(unit, job.kind()) {
        Ok(result) => JobOutcome::new(result),
        Err(e) => JobOutcome {
            result: JobResult::Failed,
            error: Some(e),
            blocker: None,
        },
    }
}

fn job_trigger_unit(unit: &UnitX, kind: JobKind) -> Result<JobResult> {
    match kind {
        JobKind::Start => {
            if unit.active().is_active_or_reloading() {
                return Ok(JobResult::Skipped);
            }
            unit.start()?;
        }
        JobKind::Stop => {
            if unit.active() == UnitActiveState::InActive {
                return Ok(JobResult::Skipped);
            }
            unit.stop()?;
        }
        JobKind::Reload => unit.reload()?,
        JobKind::Restart => {
            unit.stop()?;
            unit.start()?;
        }
    }
    Ok(JobResult::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::entry::JobAttr;
    use crate::unit::test::test_utils::{journal_of, new_journal, TestUnit};
    use crate::unit::UnitManager;
    use std::sync::Arc;

    fn unit(um: &UnitManager, name: &str, sub: TestUnit) -> Arc<UnitX> {
        um.supervise(name, Box::new(sub)).unwrap()
    }

    #[test]
    fn test_job_run_in_order() {
        let um = UnitManager::new(Vec::new(), 1024);
        let journal = new_journal();
        let a = unit(&um, "a.service", TestUnit::new().journal(&journal, "a"));
        let b = unit(&um, "b.service", TestUnit::new().journal(&journal, "b"));
        let c = unit(&um, "c.service", TestUnit::new().journal(&journal, "c"));
        let jobs = vec![
            Job::new(&a, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&b, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&c, JobKind::Start, JobAttr::new(true, true)),
        ];
        // c -> b -> a
        let preds = vec![vec![1], vec![2], vec![]];
        let log = LogBuffer::new(1024);

        let outcomes = job_run(&jobs, &preds, &[2, 1, 0], &log);
        assert!(outcomes.iter().all(|o| o.result == JobResult::Done));
        assert_eq!(journal_of(&journal), vec!["start c", "start b", "start a"]);

        let text = String::from_utf8_lossy(&log.contents()).to_string();
        assert!(text.contains("start a.service: done"));
    }

    #[test]
    fn test_job_run_dependency() {
        let um = UnitManager::new(Vec::new(), 1024);
        let x_sub = TestUnit::new();
        let x_counter = x_sub.counter();
        let x = unit(&um, "x.service", x_sub);
        let y = unit(&um, "y.service", TestUnit::new().fail_start());
        let z = unit(&um, "z.service", TestUnit::new());
        let jobs = vec![
            Job::new(&x, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&y, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&z, JobKind::Start, JobAttr::new(true, true)),
        ];
        let preds = vec![vec![1], vec![], vec![]];
        let log = LogBuffer::new(1024);

        let outcomes = job_run(&jobs, &preds, &[1, 0, 2], &log);
        assert_eq!(outcomes[0].result, JobResult::Dependency);
        assert_eq!(outcomes[0].blocker, Some(1));
        assert_eq!(outcomes[1].result, JobResult::Failed);
        assert!(outcomes[1].error.is_some());
        assert_eq!(outcomes[2].result, JobResult::Done);
        assert_eq!(x_counter.starts(), 0);
        assert_eq!(z.active(), UnitActiveState::Active);

        let text = String::from_utf8_lossy(&x.log().contents()).to_string();
        assert!(text.contains("Dependency y.service failed"));
    }

    #[test]
    fn test_job_run_wanted_failure() {
        let um = UnitManager::new(Vec::new(), 1024);
        let x = unit(&um, "x.service", TestUnit::new());
        let w = unit(&um, "w.service", TestUnit::new().fail_start());
        let jobs = vec![
            Job::new(&x, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&w, JobKind::Start, JobAttr::new(false, false)),
        ];
        let preds = vec![vec![1], vec![]];
        let log = LogBuffer::new(1024);

        let outcomes = job_run(&jobs, &preds, &[1, 0], &log);
        assert_eq!(outcomes[0].result, JobResult::Done);
        assert_eq!(outcomes[1].result, JobResult::Failed);
    }

    #[test]
    fn test_job_run_dependency_through_wanted() {
        let um = UnitManager::new(Vec::new(), 1024);
        let x_sub = TestUnit::new();
        let x_counter = x_sub.counter();
        let x = unit(&um, "x.service", x_sub);
        let y = unit(&um, "y.service", TestUnit::new().fail_start());
        let w = unit(&um, "w.service", TestUnit::new());
        let jobs = vec![
            Job::new(&x, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&y, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&w, JobKind::Start, JobAttr::new(false, false)),
        ];
        // y -> w -> x, x only requires y
        let preds = vec![vec![2], vec![], vec![1]];
        let log = LogBuffer::new(1024);

        let outcomes = job_run(&jobs, &preds, &[1, 2, 0], &log);
        assert_eq!(outcomes[1].result, JobResult::Failed);
        assert_eq!(outcomes[2].result, JobResult::Dependency);
        assert_eq!(outcomes[0].result, JobResult::Dependency);
        assert_eq!(outcomes[0].blocker, Some(1));
        assert_eq!(x_counter.starts(), 0);
        assert_eq!(w.active(), UnitActiveState::InActive);

        let text = String::from_utf8_lossy(&x.log().contents()).to_string();
        assert!(text.contains("Dependency y.service failed"));
    }

    #[test]
    fn test_job_run_skipped() {
        let um = UnitManager::new(Vec::new(), 1024);
        let a = unit(&um, "a.service", TestUnit::new());
        let b = unit(&um, "b.service", TestUnit::new());
        a.start().unwrap();
        let jobs = vec![
            Job::new(&a, JobKind::Start, JobAttr::new(true, true)),
            Job::new(&b, JobKind::Stop, JobAttr::new(true, true)),
        ];
        let log = LogBuffer::new(1024);

        let outcomes = job_run(&jobs, &[vec![], vec![]], &[0, 1], &log);
        assert_eq!(outcomes[0].result, JobResult::Skipped);
        assert_eq!(outcomes[1].result, JobResult::Skipped);
    }

    #[test]
    fn test_job_run_restart() {
        let um = UnitManager::new(Vec::new(), 1024);
        let journal = new_journal();
        let a = unit(&um, "a.service", TestUnit::new().journal(&journal, "a"));
        a.start().unwrap();
        let jobs = vec![Job::new(&a, JobKind::Restart, JobAttr::new(true, true))];
        let log = LogBuffer::new(1024);

        let outcomes = job_run(&jobs, &[vec![]], &[0], &log);
        assert_eq!(outcomes[0].result, JobResult::Done);
        assert_eq!(journal_of(&journal), vec!["start a", "stop a", "start a"]);
        assert_eq!(a.active(), UnitActiveState::Active);
    }
}
