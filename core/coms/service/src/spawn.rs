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

//! The exec command that was parsed from the unit file, and the way it is run.
use libcore::error::*;
use std::process::{Child, Command, Stdio};

/// `ExecStart=-/bin/foo arg "two words"`: absolute path, arguments, and a
/// leading `-` that makes a failing exit status ignored.
#[derive(PartialEq, Clone, Eq, Debug)]
pub(super) struct ExecCommand {
    path: String,
    argv: Vec<String>,
    ignore_failure: bool,
}

impl ExecCommand {
    pub(super) fn parse(value: &str) -> std::result::Result<ExecCommand, String> {
        let (ignore_failure, value) = match value.trim().strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value.trim()),
        };

        let mut words = split_words(value)?.into_iter();
        let path = match words.next() {
            None => return Err("empty command".to_string()),
            Some(p) => p,
        };
        if !path.starts_with('/') {
            return Err(format!("command path '{}' is not absolute", path));
        }

        Ok(ExecCommand {
            path,
            argv: words.collect(),
            ignore_failure,
        })
    }

    pub(super) fn path(&self) -> &str {
        &self.path
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.args(&self.argv)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    /// start the command and leave it running
    pub(super) fn spawn(&self) -> Result<Child> {
        self.command().spawn().context(SpawnSnafu {
            cmd: self.path.clone(),
        })
    }

    /// run the command to completion
    pub(super) fn run(&self) -> Result<()> {
        let status = self.command().status().context(SpawnSnafu {
            cmd: self.path.clone(),
        })?;
        if status.success() || self.ignore_failure {
            return Ok(());
        }
        Err(Error::Exit {
            cmd: self.path.clone(),
            status: status.to_string(),
        })
    }
}

impl std::fmt::Display for ExecCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ignore_failure {
            write!(f, "-")?;
        }
        write!(f, "{}", self.path)?;
        for arg in self.argv.iter() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// split on whitespace, double quotes group words
fn split_words(s: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in s.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            c => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err("unbalanced quotes".to_string());
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}
