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

//! Service is the entrance of the sub unit, it implements the trait SubUnit.
use super::config::ServiceConfig;
use super::mng::ServiceMng;
use libcore::error::*;
use libcore::unit::{SubUnit, UnitActiveState, UnitRelations};
use std::io::Read;
use std::sync::RwLock;

/// Unit running the process configured by `ExecStart=`.
pub struct Service {
    config: RwLock<ServiceConfig>,
    mng: ServiceMng,
}

impl Service {
    ///
    pub fn new() -> Service {
        Service {
            config: RwLock::new(ServiceConfig::default()),
            mng: ServiceMng::new(),
        }
    }

    fn config(&self) -> ServiceConfig {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl Default for Service {
    fn default() -> Self {
        Service::new()
    }
}

impl SubUnit for Service {
    fn define(&self, source: &mut dyn Read) -> Result<()> {
        let config = ServiceConfig::parse(source)?;
        if let Ok(mut c) = self.config.write() {
            *c = config;
        }
        Ok(())
    }

    fn start(&self) -> Result<()> {
        self.mng.start_action(&self.config())
    }

    fn stop(&self) -> Result<()> {
        self.mng.stop_action(&self.config())
    }

    fn reload(&self) -> Result<()> {
        self.mng.reload_action(&self.config())
    }

    fn can_reload(&self) -> bool {
        self.config().Service.ExecReload.is_some()
    }

    fn current_active_state(&self) -> UnitActiveState {
        self.mng.to_unit_state()
    }

    fn get_subunit_state(&self) -> String {
        self.mng.state().to_string()
    }

    fn description(&self) -> String {
        self.config().Unit.Description
    }

    fn dependencies(&self, relation: UnitRelations) -> Vec<String> {
        self.config().Unit.dependencies(relation)
    }

    fn ignore_on_isolate(&self) -> bool {
        self.config().Unit.IgnoreOnIsolate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_reload_capability() {
        let service = Service::new();
        let text = "[Unit]\nDescription=Reloadable\n[Service]\nType=oneshot\nExecStart=/bin/true\nExecReload=/bin/true\n";
        service.define(&mut text.as_bytes()).unwrap();
        assert!(service.can_reload());
        assert_eq!(service.description(), "Reloadable");

        service.start().unwrap();
        service.reload().unwrap();
        assert_eq!(service.get_subunit_state(), "exited");
        assert_eq!(service.current_active_state(), UnitActiveState::Active);
    }

    #[test]
    fn test_service_invalid_definition_keeps_previous() {
        let service = Service::new();
        let text = "[Unit]\nConflicts=bar.service\n[Service]\nExecStart=/bin/true\n";
        service.define(&mut text.as_bytes()).unwrap();

        let text = "[Service]\nExecStart=\n";
        assert!(service.define(&mut text.as_bytes()).is_err());
        assert_eq!(
            service.dependencies(UnitRelations::UnitConflicts),
            vec!["bar.service"]
        );
        assert!(!service.can_reload());
    }
}
