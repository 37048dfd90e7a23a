//! Session root, artifact placement, and the export/import protocol.
//!
//! A [`Session`] is rooted at the base folder shared with the transfer
//! bot. All artifact locations resolve against that root, which is fixed
//! for the session's lifetime — re-rooting means opening a new session,
//! and already-written artifacts are never migrated.
//!
//! # Layout
//!
//! ```text
//! {base}/
//!   devinfo/devnuid.txt     — device NUID, read at open
//!   lb/data/{timestamp}/    — one outbound status+snippet batch per cycle
//!   lb/cfg/                 — inbound config records
//!   lb/do-msg/              — outbound general messages
//!   lb/dt-msg/              — inbound general messages
//!   hb/do/data              — outbound bulk folder (symlink once linked)
//!   hb/dt/                  — inbound bulk files
//!   bin/botmain             — the transfer bot executable
//!   exec-status.json        — consolidated result of the last cycle
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;
use serde_json::Value as Json;
use tracing::debug;

use edgelink_proto::{Config, DataSnippet, ExecStatus, General, Status};

use crate::error::{Error, Result};

/// Outbound status+snippet batches, one folder per cycle timestamp.
const LB_DATA_DIR: &str = "lb/data";
/// Inbound config records.
const LB_CONFIG_DIR: &str = "lb/cfg";
/// Outbound general messages.
const LB_GENERAL_OUT_DIR: &str = "lb/do-msg";
/// Inbound general messages.
const LB_GENERAL_IN_DIR: &str = "lb/dt-msg";
/// Outbound bulk data folder (a symlink once linked).
const HB_OUT_DATA_DIR: &str = "hb/do/data";
/// Inbound bulk files.
const HB_IN_DIR: &str = "hb/dt";
/// Device NUID file, relative to the base folder.
const NUID_FILE: &str = "devinfo/devnuid.txt";
/// Status artifact name inside a batch folder.
const STATUS_FILENAME: &str = "sys_status.json";
/// Consolidated execution result, relative to the base folder.
const EXEC_STATUS_FILE: &str = "exec-status.json";

/// A session against one bot base folder.
///
/// Opening the session bootstraps the folder layout and reads the device
/// NUID. All operations are synchronous and block until they complete or
/// fail; nothing is retried internally.
#[derive(Debug)]
pub struct Session {
    /// Root of all artifact locations.
    base: PathBuf,
    /// Device NUID, read once at open.
    nuid: String,
    /// Name counter for outbound general messages.
    general_seq: AtomicU32,
}

impl Session {
    /// Opens a session rooted at `base`.
    ///
    /// Creates the per-kind artifact folders as needed and reads the
    /// device NUID from `devinfo/devnuid.txt`. A base folder without a
    /// NUID file is not a bot folder and is rejected.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let base = root.as_ref().to_path_buf();
        for dir in [
            LB_DATA_DIR,
            LB_CONFIG_DIR,
            LB_GENERAL_OUT_DIR,
            LB_GENERAL_IN_DIR,
            HB_OUT_DATA_DIR,
            HB_IN_DIR,
        ] {
            let path = base.join(dir);
            fs::create_dir_all(&path).map_err(|e| Error::storage(path, e))?;
        }

        let nuid_path = base.join(NUID_FILE);
        let raw = fs::read_to_string(&nuid_path).map_err(|e| Error::storage(&nuid_path, e))?;
        let nuid = raw.lines().next().unwrap_or("").trim().to_owned();
        if nuid.is_empty() {
            return Err(Error::storage(
                nuid_path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "device NUID file is empty"),
            ));
        }

        debug!(base = %base.display(), %nuid, "session opened");
        Ok(Self {
            base,
            nuid,
            general_seq: AtomicU32::new(0),
        })
    }

    /// The base folder this session is rooted at.
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// The device NUID. Readable, never settable.
    pub fn nuid(&self) -> &str {
        &self.nuid
    }

    /// Exports a status and its associated data snippets as one batch.
    ///
    /// All-or-nothing: the status, every snippet, and every referenced
    /// payload file are checked before anything is written. Returns the
    /// batch folder path.
    pub fn export_data(&self, status: &Status, snippets: &[DataSnippet]) -> Result<PathBuf> {
        status.validate()?;
        for snippet in snippets {
            snippet.validate()?;
            if let Some(src) = snippet.data_file() {
                fs::metadata(src).map_err(|e| Error::storage(src, e))?;
            }
        }

        let dir = self.base.join(LB_DATA_DIR).join(status.timestamp());
        fs::create_dir_all(&dir).map_err(|e| Error::storage(&dir, e))?;
        write_json(&dir.join(STATUS_FILENAME), status)?;

        for snippet in snippets {
            let staged = stage_data_file(snippet, &dir)?;
            let name = format!("{}{}.json", snippet.snippet_type(), snippet.instance());
            write_json(&dir.join(name), &staged)?;
        }

        debug!(batch = %dir.display(), snippets = snippets.len(), "exported data batch");
        Ok(dir)
    }

    /// Re-imports one status+snippet batch by its cycle timestamp.
    ///
    /// Snippets come back in directory-enumeration order.
    pub fn import_data(&self, timestamp: &str) -> Result<(Status, Vec<DataSnippet>)> {
        let dir = self.base.join(LB_DATA_DIR).join(timestamp);
        let status: Status = read_json(&dir.join(STATUS_FILENAME))?;
        status.validate()?;

        let mut snippets = Vec::new();
        for path in json_entries(&dir)? {
            if path.file_name().is_some_and(|n| n == STATUS_FILENAME) {
                continue;
            }
            let snippet: DataSnippet = read_json(&path)?;
            snippet.validate()?;
            snippets.push(snippet);
        }
        Ok((status, snippets))
    }

    /// Exports a general message to the outbound folder and returns the
    /// artifact path. Artifact names are unique within a session.
    pub fn export_general(&self, general: &General) -> Result<PathBuf> {
        let doc = general.to_json()?;
        let seq = self.general_seq.fetch_add(1, Ordering::Relaxed);
        let path = self
            .base
            .join(LB_GENERAL_OUT_DIR)
            .join(format!("general_do_{seq}.json"));
        write_json(&path, &doc)?;
        debug!(artifact = %path.display(), "exported general message");
        Ok(path)
    }

    /// Imports one inbound general message by artifact name.
    pub fn import_general(&self, name: &str) -> Result<General> {
        let path = self.base.join(LB_GENERAL_IN_DIR).join(name);
        Ok(General::from_json(&read_json::<Json>(&path)?)?)
    }

    /// Imports every inbound general message, in directory-enumeration
    /// order. An empty folder yields an empty vec, not an error.
    pub fn import_all_general(&self) -> Result<Vec<General>> {
        let dir = self.base.join(LB_GENERAL_IN_DIR);
        let mut messages = Vec::new();
        for path in json_entries(&dir)? {
            messages.push(General::from_json(&read_json::<Json>(&path)?)?);
        }
        debug!(count = messages.len(), "imported general messages");
        Ok(messages)
    }

    /// Imports one inbound config record by artifact name.
    pub fn import_config(&self, name: &str) -> Result<Config> {
        let path = self.base.join(LB_CONFIG_DIR).join(name);
        Ok(Config::from_json(&read_json::<Json>(&path)?)?)
    }

    /// Imports every inbound config record, in directory-enumeration
    /// order. An empty folder yields an empty vec, not an error.
    pub fn import_all_config(&self) -> Result<Vec<Config>> {
        let dir = self.base.join(LB_CONFIG_DIR);
        let mut configs = Vec::new();
        for path in json_entries(&dir)? {
            configs.push(Config::from_json(&read_json::<Json>(&path)?)?);
        }
        debug!(count = configs.len(), "imported config records");
        Ok(configs)
    }

    /// Imports the consolidated execution result of the last cycle in
    /// one pass.
    ///
    /// A channel the engine reported nothing for comes back as an empty
    /// sequence; only a missing or unparseable artifact is an error.
    pub fn import_exec_status(&self) -> Result<ExecStatus> {
        let status: ExecStatus = read_json(&self.base.join(EXEC_STATUS_FILE))?;
        debug!(
            lb = status.lb_connections().len(),
            hb = status.hb_connections().len(),
            software_updated = status.software_was_updated(),
            "imported execution status"
        );
        Ok(status)
    }

    /// Points the outbound bulk folder at `data_folder`.
    ///
    /// The folder is created if missing; an existing link (or the empty
    /// placeholder folder from [`Session::open`]) is replaced.
    #[cfg(unix)]
    pub fn link_hb_data_folder(&self, data_folder: impl AsRef<Path>) -> Result<()> {
        let folder = data_folder.as_ref();
        fs::create_dir_all(folder).map_err(|e| Error::storage(folder, e))?;

        let target = self.base.join(HB_OUT_DATA_DIR);
        if let Ok(meta) = fs::symlink_metadata(&target) {
            let removed = if meta.is_dir() {
                fs::remove_dir(&target)
            } else {
                fs::remove_file(&target)
            };
            removed.map_err(|e| Error::storage(&target, e))?;
        }
        std::os::unix::fs::symlink(folder, &target).map_err(|e| Error::storage(&target, e))?;
        debug!(folder = %folder.display(), "linked bulk data folder");
        Ok(())
    }

    /// Removes the outbound bulk folder link, if one is installed.
    #[cfg(unix)]
    pub fn unlink_hb_data_folder(&self) -> Result<()> {
        let target = self.base.join(HB_OUT_DATA_DIR);
        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_symlink() => {
                fs::remove_file(&target).map_err(|e| Error::storage(&target, e))
            }
            _ => Ok(()),
        }
    }
}

/// Stages a snippet's payload file into the batch folder and returns the
/// snippet as it should be serialized (payload path rewritten to the
/// bare filename).
fn stage_data_file(snippet: &DataSnippet, dir: &Path) -> Result<DataSnippet> {
    let Some(src) = snippet.data_file() else {
        return Ok(snippet.clone());
    };
    let name = src
        .file_name()
        .ok_or_else(|| {
            Error::storage(
                src,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "payload path has no name"),
            )
        })?
        .to_owned();
    let dest = dir.join(&name);
    if snippet.delete_data_file() {
        fs::rename(src, &dest).map_err(|e| Error::storage(src, e))?;
    } else {
        fs::copy(src, &dest).map_err(|e| Error::storage(src, e))?;
    }

    let mut staged = snippet.clone();
    staged.set_data_file(PathBuf::from(name), false);
    Ok(staged)
}

/// Lists `*.json` entries of `dir` in directory-enumeration order.
///
/// No re-sorting: callers must not assume chronological order unless the
/// engine guarantees it.
fn json_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::storage(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::storage(dir, e))?.path();
        if path.extension().is_some_and(|e| e == "json") {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Writes a value as pretty-printed JSON, creating the file.
fn write_json<T: ?Sized + Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| Error::storage(path, e))?;
    serde_json::to_writer_pretty(file, value).map_err(|e| Error::invalid_format(path, e))
}

/// Reads and parses one JSON artifact.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|e| Error::storage(path, e))?;
    serde_json::from_str(&data).map_err(|e| Error::invalid_format(path, e))
}
