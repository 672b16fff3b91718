// src/services/aspect_ratio.rs
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run ffprobe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffprobe did not finish within {0:?}")]
    Timeout(Duration),

    #[error("ffprobe exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("failed to parse ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ffprobe reported no streams")]
    NoStreams,

    #[error("first stream has no dimensions")]
    MissingDimensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Landscape,
    Portrait,
    Other,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Landscape => "landscape",
            Classification::Portrait => "portrait",
            Classification::Other => "other",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Deserialize)]
pub struct StreamInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Reads stream information for a local media file.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ProbeError>;
}

pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ProbeError> {
        let child = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_probe_output(&output.stdout)
    }
}

pub fn parse_probe_output(stdout: &[u8]) -> Result<ProbeOutput, ProbeError> {
    Ok(serde_json::from_slice(stdout)?)
}

/// Coarse aspect-ratio bucket using truncating integer division: a quotient
/// of exactly 1 in either direction decides the orientation.
pub fn classify(width: u32, height: u32) -> Classification {
    if width.checked_div(height) == Some(1) {
        Classification::Landscape
    } else if height.checked_div(width) == Some(1) {
        Classification::Portrait
    } else {
        Classification::Other
    }
}

/// Classifies the video at `path` from its first stream.
pub async fn aspect_ratio(
    prober: &dyn MediaProber,
    path: &Path,
) -> Result<Classification, ProbeError> {
    let output = prober.probe(path).await?;
    let stream = output.streams.first().ok_or(ProbeError::NoStreams)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok(classify(width, height)),
        _ => Err(ProbeError::MissingDimensions),
    }
}
