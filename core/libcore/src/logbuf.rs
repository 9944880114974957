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

//! Bounded in-memory log backing unit and system status.
//!
//! The content never exceeds the capacity and never starts with a partial
//! line: whenever a write evicts bytes from the head, the head is further
//! trimmed through the next line terminator.
use std::io::{self, Cursor, Read, Write};
use std::sync::{Mutex, MutexGuard};

/// Byte size of the log contents kept in memory
pub const LOG_BUFFER_SIZE: usize = 10000;

pub struct LogBuffer {
    capacity: usize,
    data: Mutex<LogBufferData>,
}

impl LogBuffer {
    ///
    pub fn new(capacity: usize) -> LogBuffer {
        LogBuffer {
            capacity,
            data: Mutex::new(LogBufferData::new(capacity)),
        }
    }

    ///
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    ///
    pub fn len(&self) -> usize {
        self.data().map(|d| d.buf.len()).unwrap_or(0)
    }

    ///
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// copy of the current content, independent of the read position
    pub fn contents(&self) -> Vec<u8> {
        self.data().map(|d| d.buf.clone()).unwrap_or_default()
    }

    /// Drop the whole content.
    pub fn clear(&self) {
        if let Ok(mut d) = self.data() {
            d.buf.clear();
            d.generation += 1;
        }
    }

    /// Append one timestamped line.
    pub fn log_line(&self, msg: &str) {
        let line = format!("{} {}\n", log::local_time_str(), msg);
        let mut w = self;
        if let Err(e) = w.write_all(line.as_bytes()) {
            log::warn!("Failed to write log buffer: {}", e);
        }
    }

    fn data(&self) -> io::Result<MutexGuard<'_, LogBufferData>> {
        self.data
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer lock poisoned"))
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        LogBuffer::new(LOG_BUFFER_SIZE)
    }
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl Write for &LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let capacity = self.capacity;
        self.data()?.append(buf, capacity);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads consume a snapshot taken by the first read. Once the snapshot is
/// drained every read returns 0 until the content changes, then the next
/// read takes a fresh snapshot of the whole content.
impl Read for &LogBuffer {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut d = self.data()?;
        let LogBufferData {
            buf,
            generation,
            reader,
            snapshot_of,
        } = &mut *d;

        if reader.is_none() {
            if *snapshot_of == Some(*generation) {
                return Ok(0);
            }
            *reader = Some(Cursor::new(buf.clone()));
            *snapshot_of = Some(*generation);
        }

        let n = match reader.as_mut() {
            Some(cursor) => cursor.read(out)?,
            None => 0,
        };
        if n == 0 {
            *reader = None;
        }
        Ok(n)
    }
}

impl Read for LogBuffer {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        (&*self).read(out)
    }
}

struct LogBufferData {
    buf: Vec<u8>,
    // bumped by every change of `buf`
    generation: u64,
    reader: Option<Cursor<Vec<u8>>>,
    snapshot_of: Option<u64>,
}

// the declaration "pub(self)" is for identification only.
impl LogBufferData {
    pub(self) fn new(capacity: usize) -> LogBufferData {
        LogBufferData {
            buf: Vec::with_capacity(capacity),
            generation: 0,
            reader: None,
            snapshot_of: None,
        }
    }

    pub(self) fn append(&mut self, data: &[u8], capacity: usize) {
        if data.is_empty() {
            return;
        }
        self.generation += 1;

        if self.buf.len() + data.len() <= capacity {
            self.buf.extend_from_slice(data);
            return;
        }

        if data.len() >= capacity {
            self.buf.clear();
            self.buf.extend_from_slice(&data[data.len() - capacity..]);
        } else {
            let excess = self.buf.len() + data.len() - capacity;
            self.buf.drain(..excess);
            self.buf.extend_from_slice(data);
        }

        // no partial line at the head
        match self.buf.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                self.buf.drain(..=pos);
            }
            None => self.buf.clear(),
        }
    }
}
