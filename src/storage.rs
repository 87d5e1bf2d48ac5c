// ABOUTME: Flat-file persistence for connection aliases, one `name|target|extra_args` line each
// ABOUTME: Loads into an instance-owned map and rewrites or appends the file on every mutation

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const SEPARATOR: char = '|';

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionRecord {
    pub name: String,
    pub target: String,             // user@host handed to ssh
    pub extra_args: Option<String>, // raw flags, split on whitespace at launch
}

impl ConnectionRecord {
    pub fn new(name: String, target: String, extra_args: Option<String>) -> Self {
        // The file cannot tell an empty field from a missing one
        let extra_args = extra_args.filter(|args| !args.is_empty());
        Self { name, target, extra_args }
    }

    /// Checks that the record can be written as a single well-formed line.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Connection name cannot be empty");
        }

        let fields = [
            ("name", self.name.as_str()),
            ("target", self.target.as_str()),
            ("params", self.extra_args.as_deref().unwrap_or("")),
        ];
        for (field, value) in fields {
            if value.contains(['\n', '\r']) {
                anyhow::bail!("Connection {field} cannot contain line breaks: {value:?}");
            }
        }

        Ok(())
    }

    fn to_line(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}\n",
            self.name,
            self.target,
            self.extra_args.as_deref().unwrap_or("")
        )
    }

    fn from_line(line: &str) -> Option<Self> {
        let mut fields = line.split(SEPARATOR);
        let name = fields.next()?;
        let target = fields.next()?;
        let extra_args = fields.next().map(str::to_string);
        Some(Self::new(name.to_string(), target.to_string(), extra_args))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Connection {0} has not been defined")]
    NotFound(String),
}

pub struct Storage {
    path: PathBuf,
    connections: BTreeMap<String, ConnectionRecord>,
}

impl Storage {
    /// Opens the storage file at `path` and loads every alias in it.
    /// A file that does not exist yet is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut storage = Self {
            path: path.into(),
            connections: BTreeMap::new(),
        };
        storage.load()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> Result<()> {
        self.connections = BTreeMap::new();

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Storage file {} does not exist yet", self.path.display());
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open storage file: {}", self.path.display())
                });
            }
        };

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| {
                format!("Failed to read storage file: {}", self.path.display())
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let record = ConnectionRecord::from_line(&line).with_context(|| {
                format!(
                    "Malformed entry on line {} of {}: {:?}",
                    index + 1,
                    self.path.display(),
                    line
                )
            })?;
            self.connections.insert(record.name.clone(), record);
        }

        tracing::debug!(
            "Loaded {} connections from {}",
            self.connections.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn append(&self, record: &ConnectionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open storage file: {}", self.path.display()))?;

        file.write_all(record.to_line().as_bytes())
            .with_context(|| format!("Failed to write storage file: {}", self.path.display()))?;
        Ok(())
    }

    /// Truncates the file and writes back the in-memory map in name order.
    pub fn rewrite_all(&self) -> Result<()> {
        File::create(&self.path)
            .with_context(|| format!("Failed to truncate storage file: {}", self.path.display()))?;

        for record in self.connections.values() {
            self.append(record)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&ConnectionRecord, StorageError> {
        self.connections
            .get(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionRecord> {
        self.connections.values()
    }

    /// Returns false without touching the file if the name is already taken.
    /// Records that fail validation are rejected before anything is written.
    pub fn store(&mut self, record: ConnectionRecord) -> Result<bool> {
        record.validate()?;

        if self.contains(&record.name) {
            tracing::info!("Connection {} already stored, leaving it unchanged", record.name);
            return Ok(false);
        }

        self.append(&record)?;
        self.load()?;
        tracing::info!("Stored connection {} -> {}", record.name, record.target);
        Ok(true)
    }

    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if self.connections.remove(name).is_none() {
            tracing::info!("Connection {} not stored, nothing to remove", name);
            return Ok(false);
        }

        self.rewrite_all()?;
        self.load()?;
        tracing::info!("Removed connection {}", name);
        Ok(true)
    }
}
