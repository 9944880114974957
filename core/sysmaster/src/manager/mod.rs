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

pub mod config;
pub mod status;

use crate::job::{JobAttr, JobKind, JobMode, Transaction};
use crate::unit::{UnitManager, UnitX};
use config::ManagerConfig;
use libcore::error::*;
use libcore::logbuf::LogBuffer;
use libcore::unit::{SubUnit, UnitActiveState};
use status::{EnableState, SystemState, SystemStatus, UnitStatus};
use std::sync::Arc;
use std::time::SystemTime;

/// Everything the outside sees of the supervisor. Each request builds one
/// transaction and blocks until its jobs are done.
pub struct Manager {
    // owned objects
    units: UnitManager,
    log: LogBuffer,
    since: SystemTime,
}

impl Manager {
    pub fn new(config: &ManagerConfig) -> Manager {
        log::debug!("Unit search paths: {}", config.UnitPath);
        Manager {
            units: UnitManager::new(config.unit_paths(), config.LogCapacity),
            log: LogBuffer::new(config.LogCapacity),
            since: SystemTime::now(),
        }
    }

    /// Start the units and whatever they require or want.
    pub fn start(&self, names: &[&str]) -> Result<()> {
        self.exec(JobKind::Start, names, JobMode::Replace)
    }

    /// Stop the units and the running units requiring them.
    pub fn stop(&self, names: &[&str]) -> Result<()> {
        self.exec(JobKind::Stop, names, JobMode::Replace)
    }

    pub fn restart(&self, names: &[&str]) -> Result<()> {
        self.exec(JobKind::Restart, names, JobMode::Replace)
    }

    pub fn reload(&self, names: &[&str]) -> Result<()> {
        self.exec(JobKind::Reload, names, JobMode::Replace)
    }

    /// Start the units, stop every other running unit.
    pub fn isolate(&self, names: &[&str]) -> Result<()> {
        self.exec(JobKind::Start, names, JobMode::Isolate)
    }

    /// Run one transaction doing `kind` to all of `names`.
    pub fn exec(&self, kind: JobKind, names: &[&str], mode: JobMode) -> Result<()> {
        let units = names
            .iter()
            .map(|name| self.units.get(name))
            .collect::<Result<Vec<Arc<UnitX>>>>()?;

        log::info!("Executing {} of {} ({:?}).", kind, names.join(" "), mode);
        let mut trans = Transaction::new(&self.units, &self.log, mode);
        for unit in units.iter() {
            trans.add(kind, unit, JobAttr::new(true, true))?;
        }
        if mode == JobMode::Isolate {
            trans.trans_affect_isolate()?;
        }
        trans.run()
    }

    pub fn enable(&self, names: &[&str]) -> Result<()> {
        self.install(names, "enable")
    }

    pub fn disable(&self, names: &[&str]) -> Result<()> {
        self.install(names, "disable")
    }

    // TODO: write the [Install] links once definitions keep that section.
    fn install(&self, names: &[&str], what: &str) -> Result<()> {
        for name in names {
            let unit = self.units.get(name)?;
            unit.log().log_line(what);
        }
        Err(Error::NotImplemented {
            what: what.to_string(),
        })
    }

    pub fn is_enabled(&self, name: &str) -> Result<EnableState> {
        self.units.get(name)?;
        Err(Error::NotImplemented {
            what: "is-enabled".to_string(),
        })
    }

    pub fn is_active(&self, name: &str) -> Result<UnitActiveState> {
        Ok(self.units.get(name)?.active())
    }

    /// every known unit once, ordered by id
    pub fn units(&self) -> Vec<Arc<UnitX>> {
        self.units.units()
    }

    pub fn status(&self) -> Result<SystemStatus> {
        let failed = self
            .units
            .units()
            .iter()
            .any(|u| u.active() == UnitActiveState::Failed);
        Ok(SystemStatus {
            state: if failed {
                SystemState::Degraded
            } else {
                SystemState::Running
            },
            since: self.since,
            log: self.log.contents(),
        })
    }

    pub fn status_of(&self, name: &str) -> Result<UnitStatus> {
        let unit = self.units.get(name)?;
        Ok(UnitStatus::new(&unit))
    }

    /// Add a unit which is not backed by a definition file.
    pub fn supervise(&self, name: &str, sub: Box<dyn SubUnit>) -> Result<Arc<UnitX>> {
        self.units.supervise(name, sub)
    }

    /// Load every definition of the search paths.
    pub fn load_all(&self) -> Result<()> {
        self.units.load_all()
    }

    /// the system log, one line per finished job
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::config::ManagerConfig;
    use super::status::SystemState;
    use super::Manager;
    use crate::unit::test::test_utils::TestUnit;
    use libcore::error::Error;
    use libcore::unit::{UnitActiveState, UnitLoadState};
    use tempfile::TempDir;

    fn manager_in(dir: &TempDir) -> Manager {
        let config = ManagerConfig {
            UnitPath: dir.path().to_string_lossy().to_string(),
            LogCapacity: 4096,
            ..Default::default()
        };
        Manager::new(&config)
    }

    #[test]
    fn test_start_by_alias() {
        let dir = libtests::unit_dir().unwrap();
        libtests::write_unit(dir.path(), "b.target", "[Unit]\nDescription=B\n").unwrap();
        libtests::write_unit(dir.path(), "a.target", "[Unit]\nRequires=b.target\nAfter=b\n")
            .unwrap();
        let m = manager_in(&dir);

        // aliases are known once the unit is loaded
        assert!(matches!(m.start(&["a"]), Err(Error::UnsupportedType { .. })));
        m.start(&["a.target"]).unwrap();
        assert_eq!(m.is_active("a").unwrap(), UnitActiveState::Active);
        assert_eq!(m.is_active("b").unwrap(), UnitActiveState::Active);

        let status = m.status_of("b.target").unwrap();
        assert_eq!(status.description, "B");
        assert_eq!(status.activation.sub, "active");
        assert_eq!(m.status().unwrap().state, SystemState::Running);
    }

    #[test]
    fn test_isolate() {
        let dir = libtests::unit_dir().unwrap();
        for name in ["a.target", "b.target", "c.target"] {
            libtests::write_unit(dir.path(), name, "[Unit]\n").unwrap();
        }
        libtests::write_unit(dir.path(), "d.target", "[Unit]\nIgnoreOnIsolate=yes\n").unwrap();
        let m = manager_in(&dir);

        m.start(&["a.target", "b.target", "d.target"]).unwrap();
        m.isolate(&["c.target"]).unwrap();
        assert_eq!(m.is_active("a").unwrap(), UnitActiveState::InActive);
        assert_eq!(m.is_active("b").unwrap(), UnitActiveState::InActive);
        assert_eq!(m.is_active("c").unwrap(), UnitActiveState::Active);
        assert_eq!(m.is_active("d").unwrap(), UnitActiveState::Active);
    }

    #[test]
    fn test_reload_target() {
        let dir = libtests::unit_dir().unwrap();
        libtests::write_unit(dir.path(), "a.target", "[Unit]\n").unwrap();
        let m = manager_in(&dir);

        let ret = m.reload(&["a.target"]);
        assert!(matches!(ret, Err(Error::NoReloadSupport { .. })));
    }

    #[test]
    fn test_resolution_errors() {
        let dir = libtests::unit_dir().unwrap();
        std::fs::create_dir(dir.path().join("d.target")).unwrap();
        let m = manager_in(&dir);

        assert!(matches!(m.start(&["a.mount"]), Err(Error::UnsupportedType { .. })));
        assert!(matches!(m.start(&["a.conf"]), Err(Error::UnsupportedType { .. })));
        assert!(matches!(m.start(&["a.target"]), Err(Error::NotFound { .. })));
        assert!(matches!(m.start(&["d.target"]), Err(Error::IsDirectory { .. })));
        assert!(matches!(m.status_of("a.target"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_invalid_definition() {
        let dir = libtests::unit_dir().unwrap();
        libtests::write_unit(dir.path(), "bad.target", "[Unit]\nOops\n[Bogus]\n").unwrap();
        let m = manager_in(&dir);

        let status = m.status_of("bad.target").unwrap();
        assert_eq!(status.load.loaded, UnitLoadState::Error);
        let log = String::from_utf8_lossy(&status.log).to_string();
        let lines: Vec<&str> = log.lines().collect();
        assert!(lines[0].ends_with("Definition is invalid:"));
        assert_eq!(lines.len(), 3);

        assert!(matches!(m.start(&["bad.target"]), Err(Error::NotLoaded { .. })));
    }

    #[test]
    fn test_enable_disable() {
        let dir = libtests::unit_dir().unwrap();
        libtests::write_unit(dir.path(), "a.target", "[Unit]\n").unwrap();
        let m = manager_in(&dir);

        assert!(matches!(m.enable(&["a.target"]), Err(Error::NotImplemented { .. })));
        assert!(matches!(m.disable(&["a.target"]), Err(Error::NotImplemented { .. })));
        assert!(matches!(m.enable(&["b.target"]), Err(Error::NotFound { .. })));
        assert!(matches!(m.is_enabled("a"), Err(Error::NotImplemented { .. })));

        let log = String::from_utf8_lossy(&m.status_of("a").unwrap().log).to_string();
        let lines: Vec<&str> = log.lines().collect();
        assert!(lines[0].ends_with(" enable"));
        assert!(lines[1].ends_with(" disable"));
    }

    #[test]
    fn test_supervise_and_degraded() {
        let dir = libtests::unit_dir().unwrap();
        let m = manager_in(&dir);
        m.supervise("bad.service", Box::new(TestUnit::new().fail_start()))
            .unwrap();
        let ret = m.supervise("bad.service", Box::new(TestUnit::new()));
        assert!(matches!(ret, Err(Error::AlreadyExists { .. })));

        let ret = m.start(&["bad"]);
        assert!(matches!(ret, Err(Error::JobFailed { unit, .. }) if unit == "bad.service"));
        assert_eq!(m.status().unwrap().state, SystemState::Degraded);
        assert_eq!(m.units().len(), 1);

        let log = String::from_utf8_lossy(&m.log().contents()).to_string();
        assert!(log.contains("start bad.service: failed"));
    }

    #[test]
    fn test_load_all_not_directory() {
        let dir = libtests::unit_dir().unwrap();
        let file = libtests::write_unit(dir.path(), "file", "").unwrap();
        let config = ManagerConfig {
            UnitPath: file.to_string_lossy().to_string(),
            ..Default::default()
        };
        let m = Manager::new(&config);
        assert!(matches!(m.load_all(), Err(Error::NotDirectory { .. })));
    }
}
