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

//! The core of the service unit: the state of the service and its main process.
use super::config::ServiceConfig;
use super::rentry::{ServiceState, ServiceType};
use libcore::error::*;
use libcore::unit::UnitActiveState;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::Child;
use std::sync::{Mutex, MutexGuard};

impl ServiceState {
    fn to_unit_state(self) -> UnitActiveState {
        match self {
            ServiceState::Dead => UnitActiveState::InActive,
            ServiceState::Start => UnitActiveState::Activating,
            ServiceState::Running | ServiceState::Exited => UnitActiveState::Active,
            ServiceState::Reload => UnitActiveState::Reloading,
            ServiceState::Stop => UnitActiveState::DeActivating,
            ServiceState::Failed => UnitActiveState::Failed,
        }
    }
}

pub(super) struct ServiceMng {
    // serializes start, stop and reload; state queries only take `data`
    op: Mutex<()>,
    data: Mutex<ServiceMngData>,
}

impl ServiceMng {
    pub(super) fn new() -> ServiceMng {
        ServiceMng {
            op: Mutex::new(()),
            data: Mutex::new(ServiceMngData::new()),
        }
    }

    pub(super) fn start_action(&self, config: &ServiceConfig) -> Result<()> {
        let _op = self.op()?;
        let cmd = match &config.Service.ExecStart {
            None => {
                self.data()?.set_state(ServiceState::Failed);
                return Err(Error::Other {
                    msg: "no ExecStart= configured".to_string(),
                });
            }
            Some(cmd) => cmd,
        };

        self.data()?.set_state(ServiceState::Start);
        let ret = match config.Service.Type {
            ServiceType::Simple => cmd.spawn().map(|child| {
                log::debug!("Spawned {} with pid {}", cmd.path(), child.id());
                Some(child)
            }),
            ServiceType::Oneshot => cmd.run().map(|_| None),
        };

        let mut data = self.data()?;
        match ret {
            Ok(Some(child)) => {
                data.main_process = Some(child);
                data.set_state(ServiceState::Running);
                Ok(())
            }
            Ok(None) => {
                data.set_state(ServiceState::Exited);
                Ok(())
            }
            Err(e) => {
                data.set_state(ServiceState::Failed);
                Err(e)
            }
        }
    }

    pub(super) fn stop_action(&self, config: &ServiceConfig) -> Result<()> {
        let _op = self.op()?;
        let main_process = {
            let mut data = self.data()?;
            data.set_state(ServiceState::Stop);
            data.main_process.take()
        };

        if let Some(cmd) = &config.Service.ExecStop {
            if let Err(e) = cmd.run() {
                log::warn!("Failed to run ExecStop {}: {}", cmd.path(), e);
            }
        }

        if let Some(mut child) = main_process {
            if let Ok(None) = child.try_wait() {
                let pid = Pid::from_raw(child.id() as i32);
                if let Err(e) = signal::kill(pid, Signal::SIGTERM) {
                    log::warn!("Failed to send SIGTERM to {}: {}", pid, e);
                }
            }
            if let Err(e) = child.wait() {
                self.data()?.set_state(ServiceState::Failed);
                return Err(Error::Io { source: e });
            }
        }

        self.data()?.set_state(ServiceState::Dead);
        Ok(())
    }

    pub(super) fn reload_action(&self, config: &ServiceConfig) -> Result<()> {
        let _op = self.op()?;
        let cmd = match &config.Service.ExecReload {
            None => return Ok(()),
            Some(cmd) => cmd,
        };
        let original = {
            let mut data = self.data()?;
            let original = data.state;
            data.set_state(ServiceState::Reload);
            original
        };
        let ret = cmd.run();
        self.data()?.set_state(original);
        ret
    }

    pub(super) fn state(&self) -> ServiceState {
        match self.data() {
            Ok(mut d) => d.refresh(),
            Err(_) => ServiceState::Failed,
        }
    }

    pub(super) fn to_unit_state(&self) -> UnitActiveState {
        self.state().to_unit_state()
    }

    fn op(&self) -> Result<MutexGuard<'_, ()>> {
        self.op.lock().map_err(|_| Error::Other {
            msg: "service operation lock poisoned".to_string(),
        })
    }

    fn data(&self) -> Result<MutexGuard<'_, ServiceMngData>> {
        self.data.lock().map_err(|_| Error::Other {
            msg: "service state lock poisoned".to_string(),
        })
    }
}

struct ServiceMngData {
    state: ServiceState,
    main_process: Option<Child>,
}

// the declaration "pub(self)" is for identification only.
impl ServiceMngData {
    pub(self) fn new() -> ServiceMngData {
        ServiceMngData {
            state: ServiceState::Dead,
            main_process: None,
        }
    }

    /// pick up an exit of the main process
    pub(self) fn refresh(&mut self) -> ServiceState {
        if self.state != ServiceState::Running {
            return self.state;
        }
        let exited = match self.main_process.as_mut().map(|c| c.try_wait()) {
            Some(Ok(None)) => return self.state,
            Some(Ok(Some(status))) => status.success(),
            Some(Err(_)) | None => false,
        };
        self.main_process = None;
        self.set_state(if exited {
            ServiceState::Dead
        } else {
            ServiceState::Failed
        });
        self.state
    }

    pub(self) fn set_state(&mut self, new_state: ServiceState) {
        if self.state != new_state {
            log::debug!(
                "service original state[{:?}] ->new state[{:?}]",
                self.state,
                new_state
            );
        }
        self.state = new_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(text: &str) -> ServiceConfig {
        ServiceConfig::parse(&mut text.as_bytes()).unwrap()
    }

    #[test]
    fn test_oneshot_lifecycle() {
        let mng = ServiceMng::new();
        let conf = config("[Service]\nType=oneshot\nExecStart=/bin/true\n");
        mng.start_action(&conf).unwrap();
        assert_eq!(mng.state(), ServiceState::Exited);
        assert_eq!(mng.to_unit_state(), UnitActiveState::Active);
        mng.stop_action(&conf).unwrap();
        assert_eq!(mng.state(), ServiceState::Dead);
    }

    #[test]
    fn test_oneshot_failure() {
        let mng = ServiceMng::new();
        let conf = config("[Service]\nType=oneshot\nExecStart=/bin/false\n");
        assert!(mng.start_action(&conf).is_err());
        assert_eq!(mng.to_unit_state(), UnitActiveState::Failed);
    }

    #[test]
    fn test_simple_lifecycle() {
        let mng = ServiceMng::new();
        let conf = config("[Service]\nExecStart=/bin/sleep 30\n");
        mng.start_action(&conf).unwrap();
        assert_eq!(mng.state(), ServiceState::Running);
        mng.stop_action(&conf).unwrap();
        assert_eq!(mng.state(), ServiceState::Dead);
    }

    #[test]
    fn test_state_while_start_runs() {
        let mng = ServiceMng::new();
        let conf = config("[Service]\nType=oneshot\nExecStart=/bin/sleep 1\n");
        std::thread::scope(|s| {
            let starter = s.spawn(|| mng.start_action(&conf));
            let mut state = mng.state();
            for _ in 0..100 {
                if state == ServiceState::Start {
                    break;
                }
                std::thread::sleep(std::time::Duration::from_millis(10));
                state = mng.state();
            }
            let begin = std::time::Instant::now();
            assert_eq!(mng.to_unit_state(), UnitActiveState::Activating);
            assert!(begin.elapsed() < std::time::Duration::from_millis(500));
            starter.join().unwrap().unwrap();
        });
        assert_eq!(mng.to_unit_state(), UnitActiveState::Active);
    }

    #[test]
    fn test_simple_main_process_exit() {
        let mng = ServiceMng::new();
        let conf = config("[Service]\nExecStart=/bin/false\n");
        mng.start_action(&conf).unwrap();
        let mut state = mng.state();
        for _ in 0..100 {
            if state != ServiceState::Running {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
            state = mng.state();
        }
        assert_eq!(state, ServiceState::Failed);
    }
}
