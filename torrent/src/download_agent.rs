use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::info;
use tokio::process::Command;

/// aria2c, started once per magnet and left alone afterwards.
#[derive(Debug, Clone)]
pub struct DownloadAgent {
    pub binary: PathBuf,
}

impl DownloadAgent {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Starts the transfer and returns as soon as the process exists. The child
    /// is not awaited or killed; it exits by itself once seeding is skipped.
    pub fn start(&self, magnet: &str, destination: &Path) -> DownloadAgentResult<()> {
        let result = Command::new(&self.binary)
            .args(Self::arguments(magnet, destination))
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn();

        match result {
            Ok(child) => {
                info!(
                    "Started {} (pid {:?}) into {}",
                    self.binary.display(),
                    child.id(),
                    destination.display()
                );
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(
                DownloadAgentError::BinaryNotFound(self.binary.to_string_lossy().into()),
            ),
            Err(err) => Err(DownloadAgentError::CantSpawn(err.to_string().into())),
        }
    }

    pub(crate) fn arguments(magnet: &str, destination: &Path) -> Vec<OsString> {
        vec![
            "--seed-time=0".into(),
            "--enable-dht=true".into(),
            "--continue=true".into(),
            "--max-connection-per-server=4".into(),
            "--dir".into(),
            destination.as_os_str().to_owned(),
            magnet.into(),
        ]
    }
}

pub type DownloadAgentResult<T> = Result<T, DownloadAgentError>;

#[derive(Debug)]
pub enum DownloadAgentError {
    BinaryNotFound(Box<str>),
    CantSpawn(Box<str>),
}

impl std::fmt::Display for DownloadAgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadAgentError::BinaryNotFound(binary) => {
                f.write_fmt(format_args!("Downloader binary not found: {binary}"))
            }
            DownloadAgentError::CantSpawn(reason) => {
                f.write_fmt(format_args!("Failed to start download: {reason}"))
            }
        }
    }
}

impl std::error::Error for DownloadAgentError {}
