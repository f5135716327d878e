//! Reading branch traces.
//!
//! A binary trace is a flat array of little-endian records:
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 8    | program counter  |
//! | 8      | 8    | resolved target  |
//! | 16     | 4    | [BranchFlags]    |
//! | 20     | 4    | (padding)        |

pub mod synthetic;

use std::fs;
use std::path::{ Path, PathBuf };
use thiserror::Error;
use crate::branch::*;

/// Size of a single record in a binary trace.
pub const RECORD_SIZE: usize = 24;

/// Errors from loading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("couldn't read trace {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trace length {len} isn't a multiple of the record size ({size})")]
    Truncated { len: usize, size: usize },
}

/// A set of trace files, loaded lazily.
pub struct BinaryTraceSet {
    /// A list of filenames
    pub files: Vec<PathBuf>,

    pub cur: usize,
}
impl BinaryTraceSet {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            cur: 0,
        }
    }

    pub fn new_from_slice(paths: &[PathBuf]) -> Self {
        Self {
            files: paths.to_vec(),
            cur: 0,
        }
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }
}
impl Default for BinaryTraceSet {
    fn default() -> Self { Self::new() }
}
impl Iterator for BinaryTraceSet {
    type Item = Result<BinaryTrace, TraceError>;
    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.get(self.cur)?;
        self.cur += 1;
        Some(BinaryTrace::from_file(path))
    }
}


/// A trace of branch records.
#[derive(Clone, Debug)]
pub struct BinaryTrace {
    pub name: String,
    records: Vec<BranchRecord>,
}
impl BinaryTrace {
    fn read_u64(bytes: &[u8]) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[..8]);
        u64::from_le_bytes(buf)
    }

    fn read_u32(bytes: &[u8]) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes[..4]);
        u32::from_le_bytes(buf)
    }

    /// Create a [BinaryTrace] from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &data)
    }

    /// Create a [BinaryTrace] from a buffer.
    ///
    /// NOTE: Flags aren't validated: records with unknown kinds are kept.
    pub fn from_bytes(name: impl ToString, data: &[u8])
        -> Result<Self, TraceError>
    {
        if data.len() % RECORD_SIZE != 0 {
            return Err(TraceError::Truncated {
                len: data.len(),
                size: RECORD_SIZE,
            });
        }
        let records = data.chunks_exact(RECORD_SIZE).map(|rec| {
            BranchRecord {
                pc: Self::read_u64(&rec[0..8]) as usize,
                tgt: Self::read_u64(&rec[8..16]) as usize,
                flags: BranchFlags(Self::read_u32(&rec[16..20])),
            }
        }).collect();
        Ok(Self { name: name.to_string(), records })
    }

    /// Create a [BinaryTrace] from a list of records.
    pub fn from_records(name: impl ToString, records: Vec<BranchRecord>)
        -> Self
    {
        Self { name: name.to_string(), records }
    }

    /// Serialize all records.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.records.len() * RECORD_SIZE);
        for rec in self.records.iter() {
            res.extend_from_slice(&(rec.pc as u64).to_le_bytes());
            res.extend_from_slice(&(rec.tgt as u64).to_le_bytes());
            res.extend_from_slice(&rec.flags.0.to_le_bytes());
            res.extend_from_slice(&[0; 4]);
        }
        res
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.records.len() }

    pub fn name(&self) -> &str { &self.name }

    /// Return a truncated slice of records
    pub fn as_slice_trunc(&self, limit: usize) -> &[BranchRecord] {
        &self.records[..limit.min(self.records.len())]
    }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[BranchRecord] {
        &self.records
    }
}
