use crate::errors::AppError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error};

/// Loads the tracker snapshot. A missing file is an empty tracker; an
/// unreadable or malformed one is logged and also treated as empty.
pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    debug!(path = %path.display(), goals = data.goals.len(), "data persisted");
    Ok(())
}
