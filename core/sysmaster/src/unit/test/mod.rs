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

#[cfg(test)]
pub(crate) mod test_utils {
    use libcore::error::*;
    use libcore::unit::{SubUnit, UnitActiveState, UnitRelations};
    use std::io::Read;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Actions in the order they were invoked, shared by several units.
    pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

    pub(crate) fn new_journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub(crate) fn journal_of(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    /// What a TestUnit went through, observable after it was handed over.
    pub(crate) struct TestCounter {
        starts: AtomicUsize,
        stops: AtomicUsize,
        reloads: AtomicUsize,
        state: Mutex<UnitActiveState>,
    }

    impl TestCounter {
        pub(crate) fn starts(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }

        pub(crate) fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }

        pub(crate) fn reloads(&self) -> usize {
            self.reloads.load(Ordering::SeqCst)
        }

        pub(crate) fn set_state(&self, state: UnitActiveState) {
            *self.state.lock().unwrap() = state;
        }

        fn state(&self) -> UnitActiveState {
            *self.state.lock().unwrap()
        }
    }

    /// In-memory unit with configurable relations and outcomes.
    pub(crate) struct TestUnit {
        deps: Vec<(UnitRelations, String)>,
        fail_start: bool,
        reloadable: bool,
        ignore_on_isolate: bool,
        invalid: Option<Vec<String>>,
        journal: Option<(Journal, String)>,
        counter: Arc<TestCounter>,
    }

    impl TestUnit {
        pub(crate) fn new() -> TestUnit {
            TestUnit {
                deps: Vec::new(),
                fail_start: false,
                reloadable: false,
                ignore_on_isolate: false,
                invalid: None,
                journal: None,
                counter: Arc::new(TestCounter {
                    starts: AtomicUsize::new(0),
                    stops: AtomicUsize::new(0),
                    reloads: AtomicUsize::new(0),
                    state: Mutex::new(UnitActiveState::InActive),
                }),
            }
        }

        fn relation(mut self, relation: UnitRelations, names: &[&str]) -> TestUnit {
            for name in names {
                self.deps.push((relation, name.to_string()));
            }
            self
        }

        pub(crate) fn requires(self, names: &[&str]) -> TestUnit {
            self.relation(UnitRelations::UnitRequires, names)
        }

        pub(crate) fn wants(self, names: &[&str]) -> TestUnit {
            self.relation(UnitRelations::UnitWants, names)
        }

        pub(crate) fn after(self, names: &[&str]) -> TestUnit {
            self.relation(UnitRelations::UnitAfter, names)
        }

        pub(crate) fn before(self, names: &[&str]) -> TestUnit {
            self.relation(UnitRelations::UnitBefore, names)
        }

        pub(crate) fn conflicts(self, names: &[&str]) -> TestUnit {
            self.relation(UnitRelations::UnitConflicts, names)
        }

        pub(crate) fn fail_start(mut self) -> TestUnit {
            self.fail_start = true;
            self
        }

        pub(crate) fn reloadable(mut self) -> TestUnit {
            self.reloadable = true;
            self
        }

        pub(crate) fn ignore_on_isolate(mut self) -> TestUnit {
            self.ignore_on_isolate = true;
            self
        }

        pub(crate) fn invalid(mut self, errors: &[&str]) -> TestUnit {
            self.invalid = Some(errors.iter().map(|e| e.to_string()).collect());
            self
        }

        pub(crate) fn journal(mut self, journal: &Journal, name: &str) -> TestUnit {
            self.journal = Some((Arc::clone(journal), name.to_string()));
            self
        }

        pub(crate) fn counter(&self) -> Arc<TestCounter> {
            Arc::clone(&self.counter)
        }

        fn record(&self, action: &str) {
            if let Some((journal, name)) = &self.journal {
                journal.lock().unwrap().push(format!("{} {}", action, name));
            }
        }
    }

    impl SubUnit for TestUnit {
        fn define(&self, _source: &mut dyn Read) -> Result<()> {
            match &self.invalid {
                None => Ok(()),
                Some(errors) => Err(Error::DefinitionInvalid {
                    errors: errors.clone(),
                }),
            }
        }

        fn start(&self) -> Result<()> {
            self.counter.starts.fetch_add(1, Ordering::SeqCst);
            self.record("start");
            if self.fail_start {
                self.counter.set_state(UnitActiveState::Failed);
                return Err(Error::Other {
                    msg: "start refused".to_string(),
                });
            }
            self.counter.set_state(UnitActiveState::Active);
            Ok(())
        }

        fn stop(&self) -> Result<()> {
            self.counter.stops.fetch_add(1, Ordering::SeqCst);
            self.record("stop");
            self.counter.set_state(UnitActiveState::InActive);
            Ok(())
        }

        fn reload(&self) -> Result<()> {
            self.counter.reloads.fetch_add(1, Ordering::SeqCst);
            self.record("reload");
            Ok(())
        }

        fn can_reload(&self) -> bool {
            self.reloadable
        }

        fn current_active_state(&self) -> UnitActiveState {
            self.counter.state()
        }

        fn get_subunit_state(&self) -> String {
            match self.counter.state() {
                UnitActiveState::Active => "running".to_string(),
                UnitActiveState::Failed => "failed".to_string(),
                _ => "dead".to_string(),
            }
        }

        fn description(&self) -> String {
            "test unit".to_string()
        }

        fn dependencies(&self, relation: UnitRelations) -> Vec<String> {
            self.deps
                .iter()
                .filter(|(r, _)| *r == relation)
                .map(|(_, name)| name.clone())
                .collect()
        }

        fn ignore_on_isolate(&self) -> bool {
            self.ignore_on_isolate
        }
    }
}
