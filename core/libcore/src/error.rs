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

//! Error define. The unit kinds and the sysmaster core share this one Error
//! to avoid frequent conversions between crates.

/// Reuse the Errno from the nix library.
pub use nix::errno::Errno;
use snafu::prelude::*;
#[allow(unused_imports)]
pub use snafu::ResultExt;
use std::path::PathBuf;

/// libcore Error:
/// errors of the underlying crates (nix/io) plus the errors of unit
/// resolution, transactions and unit actions.
#[allow(missing_docs)]
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Unit '{}' not found.", name))]
    NotFound { name: String },

    #[snafu(display("Unit '{}' already exists.", name))]
    AlreadyExists { name: String },

    #[snafu(display("Unit type of '{}' is not supported.", name))]
    UnsupportedType { name: String },

    #[snafu(display("'{}' is a directory.", path.display()))]
    IsDirectory { path: PathBuf },

    #[snafu(display("'{}' is not a directory.", path.display()))]
    NotDirectory { path: PathBuf },

    #[snafu(display("Dependency '{}' of '{}' failed: {}", dependency, unit, reason))]
    DependencyFailure {
        unit: String,
        dependency: String,
        reason: String,
    },

    #[snafu(display("Ordering cycle found: {}", chain.join(" -> ")))]
    DependencyCycle { chain: Vec<String> },

    #[snafu(display(
        "Job '{}' conflicts with pending job '{}' of unit '{}'.",
        requested,
        existing,
        unit
    ))]
    TransactionConflict {
        unit: String,
        existing: String,
        requested: String,
    },

    #[snafu(display("Unit '{}' does not support reload.", unit))]
    NoReloadSupport { unit: String },

    #[snafu(display("Definition is invalid: {}", errors.join("; ")))]
    DefinitionInvalid { errors: Vec<String> },

    #[snafu(display("Unit '{}' is not loaded ({}).", unit, state))]
    NotLoaded { unit: String, state: String },

    #[snafu(display("Unit '{}' is masked.", unit))]
    UnitMasked { unit: String },

    #[snafu(display("Unit '{}' is not active.", unit))]
    UnitNotActive { unit: String },

    #[snafu(display("Job for '{}' failed: {}", unit, source))]
    JobFailed { unit: String, source: Box<Error> },

    #[snafu(display("Not implemented: {}", what))]
    NotImplemented { what: String },

    /// Error for exec command
    #[snafu(display("Failed to spawn '{}': {}", cmd, source))]
    Spawn { cmd: String, source: std::io::Error },
    #[snafu(display("'{}' exited with {}.", cmd, status))]
    Exit { cmd: String, status: String },

    #[snafu(display("IoError(libcore): {}", source))]
    Io { source: std::io::Error },

    #[snafu(display("NixError(libcore): {}", source))]
    Nix { source: nix::Error },

    #[snafu(display("OtherError(libcore): '{}'.", msg))]
    Other { msg: String },
}

/// Convert to the standard linux error code
impl From<Error> for nix::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound { .. } => nix::Error::ENOENT,
            Error::AlreadyExists { .. } => nix::Error::EEXIST,
            Error::UnsupportedType { .. } => nix::Error::EPROTONOSUPPORT,
            Error::IsDirectory { .. } => nix::Error::EISDIR,
            Error::NotDirectory { .. } => nix::Error::ENOTDIR,
            Error::DependencyFailure { .. } => nix::Error::EIO,
            Error::DependencyCycle { .. } => nix::Error::ELOOP,
            Error::TransactionConflict { .. } => nix::Error::EBADR,
            Error::NoReloadSupport { .. } => nix::Error::ENOTSUP,
            Error::DefinitionInvalid { .. } => nix::Error::EINVAL,
            Error::NotLoaded { .. } => nix::Error::ENOEXEC,
            Error::UnitMasked { .. } => nix::Error::ERFKILL,
            Error::UnitNotActive { .. } => nix::Error::ENOEXEC,
            Error::JobFailed { source, .. } => nix::Error::from(*source),
            Error::NotImplemented { .. } => nix::Error::ENOSYS,
            Error::Spawn { .. } => nix::Error::ENOEXEC,
            Error::Exit { .. } => nix::Error::EIO,
            Error::Io { source } => source
                .raw_os_error()
                .map_or(nix::Error::EIO, nix::Error::from_i32),
            Error::Nix { source } => source,
            Error::Other { .. } => nix::Error::EIO,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Error {
        Error::Io { source }
    }
}

impl From<nix::Error> for Error {
    fn from(source: nix::Error) -> Error {
        Error::Nix { source }
    }
}

/// new Result
pub type Result<T, E = Error> = std::result::Result<T, E>;
