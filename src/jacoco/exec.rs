//! Reader and writer for the JaCoCo execution data format.
//!
//! A file is a sequence of blocks, each introduced by a one byte type:
//!
//! * `0x01` header: magic `0xC0C0` and format version `0x1007`
//! * `0x10` session info: id, start and dump timestamps
//! * `0x11` execution data: class id, class name and the probe array
//!
//! Integers are big-endian, strings use Java's modified UTF-8 with a `u16`
//! length prefix, and probe arrays are a var-int length followed by the
//! probes packed eight per byte, least significant bit first. Files written
//! by several agents may simply be concatenated, so headers can repeat.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, info};

use super::store::{ExecutionData, ExecutionStore, SessionInfo};
use crate::error::LoadError;
use crate::pipeline::ExecutionDataLoader;

pub const BLOCK_HEADER: u8 = 0x01;
pub const BLOCK_SESSIONINFO: u8 = 0x10;
pub const BLOCK_EXECUTIONDATA: u8 = 0x11;
pub const MAGIC_NUMBER: u16 = 0xC0C0;
pub const FORMAT_VERSION: u16 = 0x1007;

struct BlockReader<'p, R> {
    inner: R,
    path: &'p Path,
    offset: u64,
}

impl<'p, R: Read> BlockReader<'p, R> {
    fn new(inner: R, path: &'p Path) -> Self {
        Self {
            inner,
            path,
            offset: 0,
        }
    }

    fn io_error(&self, err: io::Error) -> LoadError {
        if err.kind() == ErrorKind::UnexpectedEof {
            LoadError::Truncated {
                path: self.path.to_path_buf(),
                offset: self.offset,
            }
        } else {
            LoadError::Io {
                path: self.path.to_path_buf(),
                source: err,
            }
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> LoadError {
        LoadError::InvalidFile {
            path: self.path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Reads the next block type, `None` on a clean end of input
    fn next_block_type(&mut self) -> Result<Option<u8>, LoadError> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(self.io_error(e)),
            }
        }
    }

    /// Reads exactly `len` bytes without reserving `len` up front
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, LoadError> {
        let mut buf = Vec::new();
        let read = (&mut self.inner).take(len as u64).read_to_end(&mut buf);
        read.map_err(|e| self.io_error(e))?;
        self.offset += buf.len() as u64;
        if buf.len() < len {
            return Err(LoadError::Truncated {
                path: self.path.to_path_buf(),
                offset: self.offset,
            });
        }
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8, LoadError> {
        let value = self.inner.read_u8().map_err(|e| self.io_error(e))?;
        self.offset += 1;
        Ok(value)
    }

    fn read_u16(&mut self) -> Result<u16, LoadError> {
        let value = self
            .inner
            .read_u16::<BigEndian>()
            .map_err(|e| self.io_error(e))?;
        self.offset += 2;
        Ok(value)
    }

    fn read_i64(&mut self) -> Result<i64, LoadError> {
        let value = self
            .inner
            .read_i64::<BigEndian>()
            .map_err(|e| self.io_error(e))?;
        self.offset += 8;
        Ok(value)
    }

    fn read_u64(&mut self) -> Result<u64, LoadError> {
        let value = self
            .inner
            .read_u64::<BigEndian>()
            .map_err(|e| self.io_error(e))?;
        self.offset += 8;
        Ok(value)
    }

    fn read_utf(&mut self) -> Result<String, LoadError> {
        let len = usize::from(self.read_u16()?);
        let buf = self.read_bytes(len)?;
        decode_modified_utf8(&buf).ok_or_else(|| self.invalid("malformed modified UTF-8 string"))
    }

    fn read_var_int(&mut self) -> Result<u32, LoadError> {
        let mut value = 0u32;
        let mut shift = 0;
        loop {
            let byte = self.read_u8()?;
            value |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 32 {
                return Err(self.invalid("var-int exceeds 32 bits"));
            }
        }
    }

    fn read_boolean_array(&mut self) -> Result<Vec<bool>, LoadError> {
        let len = self.read_var_int()? as usize;
        let packed = self.read_bytes(len.div_ceil(8))?;
        Ok((0..len)
            .map(|i| packed[i / 8] & (1 << (i % 8)) != 0)
            .collect())
    }

    fn read_header(&mut self) -> Result<(), LoadError> {
        let magic = self.read_u16()?;
        if magic != MAGIC_NUMBER {
            return Err(self.invalid(format!("bad magic number {magic:#06x}")));
        }
        let version = self.read_u16()?;
        if version != FORMAT_VERSION {
            return Err(LoadError::IncompatibleVersion {
                path: self.path.to_path_buf(),
                found: version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(())
    }

    fn read_into(&mut self, store: &mut ExecutionStore) -> Result<(), LoadError> {
        let mut first = true;
        while let Some(block) = self.next_block_type()? {
            if first && block != BLOCK_HEADER {
                return Err(self.invalid("missing header block"));
            }
            first = false;

            match block {
                BLOCK_HEADER => self.read_header()?,
                BLOCK_SESSIONINFO => {
                    let id = self.read_utf()?;
                    let start = self.read_i64()?;
                    let dump = self.read_i64()?;
                    store.add_session(SessionInfo::new(id, start, dump));
                }
                BLOCK_EXECUTIONDATA => {
                    let id = self.read_u64()?;
                    let name = self.read_utf()?;
                    let probes = self.read_boolean_array()?;
                    store.put(ExecutionData::new(id, name, probes))?;
                }
                other => {
                    return Err(LoadError::UnknownBlock {
                        path: self.path.to_path_buf(),
                        block: other,
                        offset: self.offset - 1,
                    })
                }
            }
        }
        Ok(())
    }
}

/// Decodes Java's modified UTF-8, `None` if the bytes are malformed
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let continuation = |b: u8| (b & 0xC0 == 0x80).then_some(u16::from(b & 0x3F));

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b >> 4 {
            0..=7 => {
                units.push(u16::from(b));
                i += 1;
            }
            12 | 13 => {
                let low = continuation(*bytes.get(i + 1)?)?;
                units.push((u16::from(b & 0x1F) << 6) | low);
                i += 2;
            }
            14 => {
                let mid = continuation(*bytes.get(i + 1)?)?;
                let low = continuation(*bytes.get(i + 2)?)?;
                units.push((u16::from(b & 0x0F) << 12) | (mid << 6) | low);
                i += 3;
            }
            _ => return None,
        }
    }
    String::from_utf16(&units).ok()
}

#[allow(clippy::cast_possible_truncation)]
fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

fn write_utf<W: Write>(out: &mut W, s: &str) -> io::Result<()> {
    let bytes = encode_modified_utf8(s);
    let len = u16::try_from(bytes.len()).map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("string too long for execution data: {} bytes", bytes.len()),
        )
    })?;
    out.write_u16::<BigEndian>(len)?;
    out.write_all(&bytes)
}

#[allow(clippy::cast_possible_truncation)]
fn write_var_int<W: Write>(out: &mut W, mut value: u32) -> io::Result<()> {
    while value & !0x7F != 0 {
        out.write_u8(0x80 | (value & 0x7F) as u8)?;
        value >>= 7;
    }
    out.write_u8(value as u8)
}

fn write_boolean_array<W: Write>(out: &mut W, probes: &[bool]) -> io::Result<()> {
    let len = u32::try_from(probes.len())
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "probe array too large"))?;
    write_var_int(out, len)?;
    let packed: Vec<u8> = probes
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (bit, &hit)| acc | (u8::from(hit) << bit))
        })
        .collect();
    out.write_all(&packed)
}

/// Reads one execution data stream and merges it into `store`
///
/// `path` is only used to label errors.
///
/// # Errors
/// * If the stream is not valid execution data or conflicts with `store`
pub fn read_into<R: Read>(
    reader: R,
    path: &Path,
    store: &mut ExecutionStore,
) -> Result<(), LoadError> {
    BlockReader::new(reader, path).read_into(store)
}

/// Serializes a store: one header, all sessions, then entries by class id
///
/// # Errors
/// * If writing fails or a string does not fit the format
pub fn write_store<W: Write>(store: &ExecutionStore, out: W) -> io::Result<()> {
    let mut out = BufWriter::new(out);

    out.write_u8(BLOCK_HEADER)?;
    out.write_u16::<BigEndian>(MAGIC_NUMBER)?;
    out.write_u16::<BigEndian>(FORMAT_VERSION)?;

    for session in store.sessions() {
        out.write_u8(BLOCK_SESSIONINFO)?;
        write_utf(&mut out, &session.id)?;
        out.write_i64::<BigEndian>(session.start)?;
        out.write_i64::<BigEndian>(session.dump)?;
    }

    for data in store.entries() {
        out.write_u8(BLOCK_EXECUTIONDATA)?;
        out.write_u64::<BigEndian>(data.id)?;
        write_utf(&mut out, &data.name)?;
        write_boolean_array(&mut out, &data.probes)?;
    }

    out.flush()
}

/// Loads execution data files from disk, merging them in the given order
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecFileLoader;

impl ExecFileLoader {
    /// Reads a single file into `store`
    ///
    /// # Errors
    /// * If the file cannot be opened or is not valid execution data
    pub fn load_file(path: &Path, store: &mut ExecutionStore) -> Result<(), LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        read_into(BufReader::new(file), path, store)?;
        debug!(path = %path.display(), classes = store.len(), "read execution data");
        Ok(())
    }
}

impl ExecutionDataLoader for ExecFileLoader {
    fn load(&self, paths: &[PathBuf]) -> Result<ExecutionStore, LoadError> {
        if paths.is_empty() {
            return Err(LoadError::NoInput);
        }

        let mut store = ExecutionStore::new();
        for path in paths {
            let mut file_store = ExecutionStore::new();
            Self::load_file(path, &mut file_store)?;
            store.merge(file_store)?;
        }

        info!(
            files = paths.len(),
            sessions = store.sessions().len(),
            classes = store.len(),
            "loaded execution data"
        );
        Ok(store)
    }
}
