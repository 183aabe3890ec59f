use crate::errors::AppError;
use crate::models::AppData;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => decode_data(&bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Decodes a stored blob. Each top-level key is defaulted on its own when it
/// is missing or malformed, and collection entries that fail to decode are
/// dropped one at a time.
pub fn decode_data(bytes: &[u8]) -> AppData {
    let fields = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            error!("data file is not a JSON object");
            return AppData::default();
        }
        Err(err) => {
            error!("failed to parse data file: {err}");
            return AppData::default();
        }
    };

    AppData {
        classes: collection(&fields, "classes"),
        attendance: collection(&fields, "attendance"),
        holidays: collection(&fields, "holidays"),
        daily_biometrics: collection(&fields, "dailyBiometrics"),
        theme: field(&fields, "theme"),
    }
}

fn field<T: DeserializeOwned + Default>(fields: &Map<String, Value>, key: &str) -> T {
    match fields.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => T::deserialize(value).unwrap_or_else(|err| {
            warn!("ignoring malformed '{key}': {err}");
            T::default()
        }),
    }
}

fn collection<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Vec<T> {
    match fields.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match T::deserialize(item) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("dropping malformed {key}[{index}]: {err}");
                    None
                }
            })
            .collect(),
        Some(_) => {
            warn!("ignoring '{key}': expected an array");
            Vec::new()
        }
    }
}

/// Overwrites the data file with the whole aggregate. The blob is written
/// next to the target and renamed over it.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await.map_err(AppError::internal)?;
    fs::rename(&staging, path).await.map_err(AppError::internal)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "state.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
