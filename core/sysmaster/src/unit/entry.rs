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

use libcore::error::*;
use libcore::logbuf::LogBuffer;
use libcore::unit::{SubUnit, UnitActiveState, UnitLoadState, UnitRelations, UnitType};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The canonical record of one unit, shared by every name it is known under.
///
/// Actions are serialized by the `op` section, while the states live behind
/// their own lock so that status queries never wait on a running action.
pub struct UnitX {
    // owned objects
    id: String,
    unit_type: UnitType,
    sub: Box<dyn SubUnit>,
    log: LogBuffer,
    op: Mutex<()>,
    data: RwLock<UnitXData>,
}

impl PartialEq for UnitX {
    fn eq(&self, other: &Self) -> bool {
        self.unit_type == other.unit_type && self.id == other.id
    }
}

impl Eq for UnitX {}

impl PartialOrd for UnitX {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitX {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for UnitX {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for UnitX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitX")
            .field("id", &self.id)
            .field("load_state", &self.load_state())
            .field("active_state", &self.current_state())
            .finish()
    }
}

impl UnitX {
    pub(crate) fn new(
        id: &str,
        unit_type: UnitType,
        sub: Box<dyn SubUnit>,
        log_capacity: usize,
    ) -> UnitX {
        UnitX {
            id: id.to_string(),
            unit_type,
            sub,
            log: LogBuffer::new(log_capacity),
            op: Mutex::new(()),
            data: RwLock::new(UnitXData::new(id)),
        }
    }

    ///
    pub fn id(&self) -> &str {
        &self.id
    }

    ///
    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    /// every name the registry indexes this unit under, id first
    pub fn names(&self) -> Vec<String> {
        self.data().names.clone()
    }

    pub(super) fn add_name(&self, name: &str) {
        let mut data = self.data_mut();
        if !data.names.iter().any(|n| n == name) {
            data.names.push(name.to_string());
        }
    }

    ///
    pub fn load_state(&self) -> UnitLoadState {
        self.data().load_state
    }

    pub(super) fn set_load_state(&self, state: UnitLoadState) {
        self.data_mut().load_state = state;
    }

    /// the definition file, None for supervised units
    pub fn path(&self) -> Option<PathBuf> {
        self.data().path.clone()
    }

    pub(super) fn set_path(&self, path: PathBuf) {
        self.data_mut().path = Some(path);
    }

    /// The activation state. A unit recorded as active whose process went
    /// away is moved to the state the implementation reports.
    pub fn active(&self) -> UnitActiveState {
        let recorded = self.current_state();
        if recorded != UnitActiveState::Active {
            return recorded;
        }

        let observed = self.sub.current_active_state();
        if !observed.is_inactive_or_failed() {
            return recorded;
        }

        let mut data = self.data_mut();
        if data.active_state == UnitActiveState::Active {
            data.active_state = observed;
            drop(data);
            self.log.log_line(&format!("Unit is {} now.", observed));
            log::info!("{} is {} now.", self.id, observed);
        }
        observed
    }

    /// the state of the implementation, like "running" or "exited"
    pub fn sub(&self) -> String {
        self.sub.get_subunit_state()
    }

    ///
    pub fn description(&self) -> String {
        self.sub.description()
    }

    ///
    pub fn requires(&self) -> Vec<String> {
        self.sub.dependencies(UnitRelations::UnitRequires)
    }

    ///
    pub fn wants(&self) -> Vec<String> {
        self.sub.dependencies(UnitRelations::UnitWants)
    }

    ///
    pub fn after(&self) -> Vec<String> {
        self.sub.dependencies(UnitRelations::UnitAfter)
    }

    ///
    pub fn before(&self) -> Vec<String> {
        self.sub.dependencies(UnitRelations::UnitBefore)
    }

    ///
    pub fn conflicts(&self) -> Vec<String> {
        self.sub.dependencies(UnitRelations::UnitConflicts)
    }

    ///
    pub fn ignore_on_isolate(&self) -> bool {
        self.sub.ignore_on_isolate()
    }

    ///
    pub fn can_reload(&self) -> bool {
        self.sub.can_reload()
    }

    /// the log of this unit
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Parse the definition into the implementation. Failures are recorded
    /// in the unit log and leave the load state at Error.
    pub fn define(&self, source: &mut dyn Read) -> Result<()> {
        let _op = self.op();
        match self.sub.define(source) {
            Ok(()) => {
                self.set_load_state(UnitLoadState::Loaded);
                log::debug!("Loaded unit {}.", self.id);
                Ok(())
            }
            Err(Error::DefinitionInvalid { errors }) => {
                self.log.log_line("Definition is invalid:");
                for e in errors.iter() {
                    self.log.log_line(e);
                }
                self.set_load_state(UnitLoadState::Error);
                log::warn!("Definition of {} is invalid: {}", self.id, errors.join("; "));
                Err(Error::DefinitionInvalid { errors })
            }
            Err(e) => {
                self.log
                    .log_line(&format!("Error parsing definition: {}", e));
                self.set_load_state(UnitLoadState::Error);
                log::warn!("Error parsing definition of {}: {}", self.id, e);
                Err(e)
            }
        }
    }

    pub(super) fn mask(&self) {
        let _op = self.op();
        self.set_load_state(UnitLoadState::Masked);
        self.log.log_line("Unit is masked.");
        log::debug!("Unit {} is masked.", self.id);
    }

    /// Start the unit, no-op when it is active already.
    pub fn start(&self) -> Result<()> {
        let _op = self.op();
        self.check_loaded()?;
        if self.active().is_active_or_reloading() {
            return Ok(());
        }

        self.set_active_state(UnitActiveState::Activating);
        self.log.log_line("Starting.");
        match self.sub.start() {
            Ok(()) => {
                self.set_active_state(UnitActiveState::Active);
                self.log.log_line("Started.");
                log::info!("Started {}.", self.id);
                Ok(())
            }
            Err(e) => {
                self.set_active_state(UnitActiveState::Failed);
                self.log.log_line(&format!("Failed to start: {}", e));
                log::error!("Failed to start {}: {}", self.id, e);
                Err(e)
            }
        }
    }

    /// Stop the unit, no-op when it is inactive already.
    pub fn stop(&self) -> Result<()> {
        let _op = self.op();
        if self.active() == UnitActiveState::InActive {
            return Ok(());
        }

        self.set_active_state(UnitActiveState::DeActivating);
        self.log.log_line("Stopping.");
        match self.sub.stop() {
            Ok(()) => {
                self.set_active_state(UnitActiveState::InActive);
                self.log.log_line("Stopped.");
                log::info!("Stopped {}.", self.id);
                Ok(())
            }
            Err(e) => {
                self.set_active_state(UnitActiveState::Failed);
                self.log.log_line(&format!("Failed to stop: {}", e));
                log::error!("Failed to stop {}: {}", self.id, e);
                Err(e)
            }
        }
    }

    /// Reload an active unit, the activation state is kept in both outcomes.
    pub fn reload(&self) -> Result<()> {
        let _op = self.op();
        self.check_loaded()?;
        if !self.sub.can_reload() {
            self.log.log_line("Reload is not supported.");
            return Err(Error::NoReloadSupport {
                unit: self.id.clone(),
            });
        }

        let prior = self.active();
        if !prior.is_active_or_reloading() {
            self.log.log_line("Refusing to reload, unit is not active.");
            return Err(Error::UnitNotActive {
                unit: self.id.clone(),
            });
        }

        self.set_active_state(UnitActiveState::Reloading);
        self.log.log_line("Reloading.");
        let ret = self.sub.reload();
        self.set_active_state(prior);
        match &ret {
            Ok(()) => {
                self.log.log_line("Reloaded.");
                log::info!("Reloaded {}.", self.id);
            }
            Err(e) => {
                self.log.log_line(&format!("Failed to reload: {}", e));
                log::error!("Failed to reload {}: {}", self.id, e);
            }
        }
        ret
    }

    fn check_loaded(&self) -> Result<()> {
        let load_state = self.load_state();
        if load_state == UnitLoadState::Masked {
            self.log.log_line("Refusing to operate on a masked unit.");
            return Err(Error::UnitMasked {
                unit: self.id.clone(),
            });
        }
        if !load_state.is_loaded() {
            self.log
                .log_line(&format!("Refusing to operate, unit is {}.", load_state));
            return Err(Error::NotLoaded {
                unit: self.id.clone(),
                state: load_state.to_string(),
            });
        }
        Ok(())
    }

    fn current_state(&self) -> UnitActiveState {
        self.data().active_state
    }

    fn set_active_state(&self, state: UnitActiveState) {
        self.data_mut().active_state = state;
    }

    fn op(&self) -> MutexGuard<'_, ()> {
        self.op.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn data(&self) -> RwLockReadGuard<'_, UnitXData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn data_mut(&self) -> RwLockWriteGuard<'_, UnitXData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

// the declaration "pub(self)" is for identification only.
struct UnitXData {
    pub(self) names: Vec<String>,
    pub(self) load_state: UnitLoadState,
    pub(self) active_state: UnitActiveState,
    pub(self) path: Option<PathBuf>,
}

impl UnitXData {
    pub(self) fn new(id: &str) -> UnitXData {
        UnitXData {
            names: vec![id.to_string()],
            load_state: UnitLoadState::Unloaded,
            active_state: UnitActiveState::InActive,
            path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UnitX;
    use crate::unit::test::test_utils::TestUnit;
    use libcore::error::Error;
    use libcore::unit::{UnitActiveState, UnitLoadState, UnitType};
    use std::sync::Arc;

    fn create_unit(name: &str, sub: TestUnit) -> UnitX {
        UnitX::new(name, UnitType::UnitService, Box::new(sub), 4096)
    }

    fn log_of(unit: &UnitX) -> String {
        String::from_utf8_lossy(&unit.log().contents()).to_string()
    }

    #[test]
    fn test_unit_define() {
        let unit = create_unit("a.service", TestUnit::new());
        assert_eq!(unit.load_state(), UnitLoadState::Unloaded);
        assert!(unit.define(&mut "whatever".as_bytes()).is_ok());
        assert_eq!(unit.load_state(), UnitLoadState::Loaded);
    }

    #[test]
    fn test_unit_define_invalid() {
        let sub = TestUnit::new().invalid(&["line 1: bad", "line 2: worse"]);
        let unit = create_unit("a.service", sub);
        let ret = unit.define(&mut "".as_bytes());
        assert!(matches!(ret, Err(Error::DefinitionInvalid { .. })));
        assert_eq!(unit.load_state(), UnitLoadState::Error);

        let log = log_of(&unit);
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("Definition is invalid:"));
        assert!(lines[1].ends_with("line 1: bad"));
        assert!(lines[2].ends_with("line 2: worse"));
    }

    #[test]
    fn test_unit_start_stop() {
        let sub = TestUnit::new();
        let counter = sub.counter();
        let unit = create_unit("a.service", sub);
        unit.define(&mut "".as_bytes()).unwrap();

        assert_eq!(unit.active(), UnitActiveState::InActive);
        unit.start().unwrap();
        assert_eq!(unit.active(), UnitActiveState::Active);
        assert_eq!(unit.sub(), "running");

        // already active
        unit.start().unwrap();
        assert_eq!(counter.starts(), 1);

        unit.stop().unwrap();
        assert_eq!(unit.active(), UnitActiveState::InActive);
        unit.stop().unwrap();
        assert_eq!(counter.stops(), 1);
    }

    #[test]
    fn test_unit_start_failed() {
        let unit = create_unit("a.service", TestUnit::new().fail_start());
        unit.define(&mut "".as_bytes()).unwrap();
        assert!(unit.start().is_err());
        assert_eq!(unit.active(), UnitActiveState::Failed);
        assert!(log_of(&unit).contains("Failed to start"));
    }

    #[test]
    fn test_unit_not_loaded() {
        let unit = create_unit("a.service", TestUnit::new());
        let ret = unit.start();
        assert!(matches!(ret, Err(Error::NotLoaded { .. })));

        unit.mask();
        let ret = unit.start();
        assert!(matches!(ret, Err(Error::UnitMasked { .. })));
        assert_eq!(unit.active(), UnitActiveState::InActive);
    }

    #[test]
    fn test_unit_reload() {
        let unit = create_unit("a.service", TestUnit::new());
        unit.define(&mut "".as_bytes()).unwrap();
        assert!(matches!(unit.reload(), Err(Error::NoReloadSupport { .. })));

        let sub = TestUnit::new().reloadable();
        let counter = sub.counter();
        let unit = create_unit("b.service", sub);
        unit.define(&mut "".as_bytes()).unwrap();
        assert!(matches!(unit.reload(), Err(Error::UnitNotActive { .. })));
        assert_eq!(counter.reloads(), 0);
        unit.start().unwrap();
        unit.reload().unwrap();
        assert_eq!(counter.reloads(), 1);
        assert_eq!(unit.active(), UnitActiveState::Active);
    }

    #[test]
    fn test_unit_exited_behind_our_back() {
        let sub = TestUnit::new();
        let counter = sub.counter();
        let unit = Arc::new(create_unit("a.service", sub));
        unit.define(&mut "".as_bytes()).unwrap();
        unit.start().unwrap();

        counter.set_state(UnitActiveState::Failed);
        assert_eq!(unit.active(), UnitActiveState::Failed);
        assert!(log_of(&unit).contains("Unit is failed now."));
    }
}
