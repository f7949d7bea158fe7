use std::path::Path;

use domain::QueueRecord;
use tokio::io::AsyncWriteExt;

use super::IntakeError;

/// Appends `record` as one JSON line. Existing lines are never touched.
pub async fn append(queue_file: &Path, record: &QueueRecord) -> Result<(), IntakeError> {
    if let Some(parent) = queue_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent).await.map_err(|err| {
            IntakeError::CantWriteQueue(
                format!(
                    "Couldn't create queue dir at {}. Reason: {err}",
                    parent.display()
                )
                .into(),
            )
        })?;
    }

    let line = {
        let mut line = serde_json::to_string(record).map_err(|err| {
            IntakeError::CantWriteQueue(
                format!("Can't serialize queue record. Reason: {err}").into(),
            )
        })?;
        line.push('\n');
        line
    };

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(queue_file)
        .await
        .map_err(|err| {
            IntakeError::CantWriteQueue(
                format!(
                    "Can't open queue file at {}. Reason: {err}",
                    queue_file.display()
                )
                .into(),
            )
        })?;

    file.write_all(line.as_bytes()).await.map_err(|err| {
        IntakeError::CantWriteQueue(format!("Couldn't append to queue. Reason: {err}").into())
    })?;

    file.flush().await.map_err(|err| {
        IntakeError::CantWriteQueue(format!("Couldn't flush queue file. Reason: {err}").into())
    })?;

    Ok(())
}
