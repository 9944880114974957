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

//! is the core of the target unit
//!
use super::rentry::TargetState;
use libcore::unit::UnitActiveState;
use std::sync::RwLock;

impl TargetState {
    fn to_unit_state(self) -> UnitActiveState {
        match self {
            TargetState::Dead => UnitActiveState::InActive,
            TargetState::Active => UnitActiveState::Active,
        }
    }
}

pub(super) struct TargetMng {
    state: RwLock<TargetState>,
}

impl TargetMng {
    pub(super) fn new() -> Self {
        TargetMng {
            state: RwLock::new(TargetState::Dead),
        }
    }

    pub(super) fn start_action(&self) {
        self.set_state(TargetState::Active);
    }

    pub(super) fn stop_action(&self) {
        self.set_state(TargetState::Dead);
    }

    pub(super) fn get_state(&self) -> String {
        self.state().to_string()
    }

    fn set_state(&self, new_state: TargetState) {
        let old_state = match self.state.write() {
            Ok(mut state) => std::mem::replace(&mut *state, new_state),
            Err(_) => return,
        };
        if new_state != old_state {
            log::debug!("target original state[{:?}] ->new state[{:?}]", old_state, new_state);
        }
    }

    fn state(&self) -> TargetState {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(TargetState::Dead)
    }

    pub(super) fn to_unit_state(&self) -> UnitActiveState {
        self.state().to_unit_state()
    }
}

#[cfg(test)]
mod tests {
    use super::TargetMng;
    use super::TargetState;
    use libcore::unit::UnitActiveState;

    #[test]
    fn test_target_set_state() {
        let tm = TargetMng::new();
        tm.set_state(TargetState::Active);
        assert_eq!(tm.state(), TargetState::Active)
    }

    #[test]
    fn test_target_stop_action() {
        let tm = TargetMng::new();
        tm.start_action();
        tm.stop_action();
        assert_eq!(tm.state(), TargetState::Dead);
        assert_eq!(tm.get_state(), "dead");
    }

    #[test]
    fn test_target_start_action() {
        let tm = TargetMng::new();
        tm.start_action();
        assert_eq!(tm.to_unit_state(), UnitActiveState::Active)
    }
}
