// vigil-core/src/infrastructure/artifacts.rs

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::application::alert::{AlertPayload, AlertSink};
use crate::domain::check::FleetReport;
use crate::error::VigilError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::render::render_html;

/// Write content to a file atomically using a temporary file in the same
/// directory. The artifact is either fully written or absent; a crashed
/// run never leaves a half-rendered report behind.
fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;
    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Persist the merged fleet report as JSON next to the other run
/// artifacts, for the dashboard and for diffing runs.
pub fn write_fleet_report(target_dir: &Path, report: &FleetReport) -> Result<PathBuf, VigilError> {
    let path = target_dir.join("fleet_report.json");
    let content = serde_json::to_string_pretty(report)
        .map_err(|e| VigilError::InternalError(format!("Serialization: {}", e)))?;
    atomic_write(&path, content)?;
    Ok(path)
}

/// Alert sink that renders the payload to HTML and drops it in the
/// target directory. Stands in for the mailer in local runs; the payload
/// contract is identical.
pub struct FileAlertSink {
    target_dir: PathBuf,
}

impl FileAlertSink {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        FileAlertSink {
            target_dir: target_dir.into(),
        }
    }

    pub fn alert_path(&self) -> PathBuf {
        self.target_dir.join("alert.html")
    }
}

#[async_trait]
impl AlertSink for FileAlertSink {
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), VigilError> {
        let path = self.alert_path();
        atomic_write(&path, render_html(payload))?;
        info!(path = ?path, subject = %payload.subject(), "Alert written");
        Ok(())
    }
}
