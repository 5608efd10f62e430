use crate::errors::AppError;
use crate::models::PortalData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("PORTAL_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/portal.json"))
}

pub async fn load_data(path: &Path) -> PortalData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                PortalData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => PortalData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            PortalData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &PortalData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
