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

//! Log targets of the supervisor: console and rotated file.
use log::Log;
use std::{
    fs::{self, File, OpenOptions},
    io::{Error, ErrorKind, Write},
    os::unix::prelude::{OpenOptionsExt, PermissionsExt},
    path::{Path, PathBuf},
    sync::{Mutex, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

pub use log::Level;

/// Format the current local time as `YYYY-MM-DD HH:MM:SS`.
pub fn local_time_str() -> String {
    format_local_time(SystemTime::now())
}

/// Format `time` in the local time zone as `YYYY-MM-DD HH:MM:SS`.
pub fn format_local_time(time: SystemTime) -> String {
    let secs = match time.duration_since(UNIX_EPOCH) {
        Ok(v) => v.as_secs() as libc::time_t,
        Err(_) => 0,
    };
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    if unsafe { libc::localtime_r(&secs, &mut tm) }.is_null() {
        return String::from("0000-00-00 00:00:00");
    }
    format!(
        "{:0>4}-{:0>2}-{:0>2} {:0>2}:{:0>2}:{:0>2}",
        tm.tm_year + 1900, /* tm_year is years since 1900 */
        tm.tm_mon + 1,     /* tm_mon is months since Jan: [0, 11] */
        tm.tm_mday,
        tm.tm_hour,
        tm.tm_min,
        tm.tm_sec
    )
}

fn write_msg_common(writer: &mut impl Write, module: &str, msg: String) {
    let line = format!("{} {} {}\n", local_time_str(), module, msg);
    if let Err(e) = writer.write_all(line.as_bytes()) {
        println!("Failed to log message: {}", e);
    }
}

struct ConsoleLogger {
    level: Level,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stdout = std::io::stdout();
        let module_path = record.module_path().unwrap_or("unknown");
        write_msg_common(&mut stdout, module_path, record.args().to_string());
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

struct FileLogger {
    level: Level,
    file_path: PathBuf,
    file_number: u32,
    max_size: u64,
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut file = match self.file.lock() {
            Err(_) => return,
            Ok(v) => v,
        };

        let module_path = record.module_path().unwrap_or("unknown");
        write_msg_common(&mut *file, module_path, record.args().to_string());

        let current_size = match file.metadata() {
            Err(_) => return,
            Ok(v) => v.len(),
        };
        if current_size <= self.max_size {
            return;
        }

        if let Err(e) = self.rotate() {
            println!("Failed to rotate log file: {}", e);
        }
        if let Err(e) = file.set_len(0) {
            println!("Failed to clear log file: {}", e);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

impl FileLogger {
    fn file_open(file_path: &Path, file_mode: u32) -> Result<File, Error> {
        if let Some(dir) = file_path.parent() {
            fs::create_dir_all(dir)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .mode(file_mode)
            .open(file_path)
    }

    fn new(
        level: Level,
        file_path: PathBuf,
        file_mode: u32,
        max_size: u32,
        file_number: u32,
    ) -> Result<Self, Error> {
        let file = Self::file_open(&file_path, file_mode)?;
        Ok(Self {
            level,
            file_path,
            file_number,
            max_size: u64::from(max_size) * 1024,
            file: Mutex::new(file),
        })
    }

    /// {name.1, name.2, ...} => {name.2, name.3, ...}, then name is copied to name.1.
    /// At most `file_number - 1` rotated files are kept.
    fn rotate(&self) -> Result<(), Error> {
        let dir = self
            .file_path
            .parent()
            .ok_or_else(|| Error::from(ErrorKind::NotFound))?;
        let file_name = self
            .file_path
            .file_name()
            .ok_or_else(|| Error::from(ErrorKind::InvalidData))?
            .to_string_lossy()
            .to_string();
        let file_name_dot = format!("{}.", file_name);

        let mut num_list: Vec<u32> = Vec::new();
        for de in dir.read_dir()?.flatten() {
            let de_file_name = de.file_name().to_string_lossy().to_string();
            if let Some(num) = de_file_name
                .strip_prefix(&file_name_dot)
                .and_then(|n| n.parse::<u32>().ok())
            {
                num_list.push(num);
            }
        }
        num_list.sort_unstable();

        while num_list.len() + 1 >= self.file_number.max(2) as usize {
            if let Some(num) = num_list.pop() {
                let _ = fs::remove_file(dir.join(format!("{}{}", file_name_dot, num)));
            }
        }

        while let Some(num) = num_list.pop() {
            let src = dir.join(format!("{}{}", file_name_dot, num));
            let dst = dir.join(format!("{}{}", file_name_dot, num + 1));
            fs::rename(src, dst)?;
        }

        let dst = dir.join(format!("{}1", file_name_dot));
        fs::copy(&self.file_path, &dst)?;
        fs::set_permissions(dst, fs::Permissions::from_mode(0o400))
    }
}

/// Fans every record out to the configured targets.
struct Dispatcher {
    loggers: RwLock<Vec<Box<dyn Log>>>,
}

impl Log for Dispatcher {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if let Ok(loggers) = self.loggers.read() {
            for logger in loggers.iter() {
                logger.log(record);
            }
        }
    }

    fn flush(&self) {
        if let Ok(loggers) = self.loggers.read() {
            for logger in loggers.iter() {
                logger.flush();
            }
        }
    }
}

static DISPATCHER: Dispatcher = Dispatcher {
    loggers: RwLock::new(Vec::new()),
};

/// Initialize the global logger.
/// Available log `targets` are `console` and `file`; the `file_*` arguments
/// only take effect on the `file` target.
///
/// Calling it again replaces the previous targets.
///
/// # Arguments
///
/// * `name` - The application name that initializes the logger. Just used for debugging.
/// * `level` - Log message level.
/// * `targets` - A set of log targets.
/// * `file_path` - The log file path.
/// * `file_size` - Limit of the log file size in KiB, the file is rotated beyond it.
/// * `file_number` - The log file number.
pub fn init_log(
    name: &str,
    level: Level,
    targets: Vec<&str>,
    file_path: &str,
    file_size: u32,
    file_number: u32,
) {
    let mut loggers: Vec<Box<dyn Log>> = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for target in targets {
        if seen.contains(&target) {
            continue;
        }
        seen.push(target);

        let logger = match target {
            "console" => Box::new(ConsoleLogger { level }) as Box<dyn Log>,
            "file" => match FileLogger::new(
                level,
                PathBuf::from(file_path),
                0o600,
                file_size,
                file_number,
            ) {
                Ok(logger) => Box::new(logger) as Box<dyn Log>,
                Err(e) => {
                    eprintln!(
                        "{} failed to create '{}' file logger: {}",
                        name, file_path, e
                    );
                    continue;
                }
            },
            _ => {
                eprintln!("{}: log target '{}' is strange, ignoring.", name, target);
                continue;
            }
        };
        loggers.push(logger);
    }

    if loggers.is_empty() {
        eprintln!("{}: no available log targets.", name);
    }

    match DISPATCHER.loggers.write() {
        Ok(mut v) => *v = loggers,
        Err(_) => {
            eprintln!("{}: failed to replace log targets.", name);
            return;
        }
    }

    /* the facade only accepts one logger per process, later calls just swap targets */
    let _ = log::set_logger(&DISPATCHER);
    log::set_max_level(level.to_level_filter());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_time_str() {
        let now = local_time_str();
        assert_eq!(now.len(), 19);
        assert_eq!(&now[4..5], "-");
        assert_eq!(&now[10..11], " ");

        assert_eq!(format_local_time(UNIX_EPOCH).len(), 19);
    }

    #[test]
    fn test_file_logger_rotate() {
        let dir = std::env::temp_dir().join(format!("log-rotate-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("sysmaster.log");
        let logger = FileLogger::new(Level::Debug, path.clone(), 0o600, 1, 3).unwrap();

        let msg = "x".repeat(600);
        for _ in 0..8 {
            logger.log(
                &log::Record::builder()
                    .args(format_args!("{}", msg))
                    .level(Level::Info)
                    .module_path_static(Some("test"))
                    .build(),
            );
        }

        assert!(dir.join("sysmaster.log.1").exists());
        assert!(dir.join("sysmaster.log.2").exists());
        assert!(!dir.join("sysmaster.log.3").exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
