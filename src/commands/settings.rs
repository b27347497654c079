use super::{AppError, AppState, CommandResult};
use crate::config::{mask_secret, SETTING_KEYS};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize, Clone)]
pub struct AiStatus {
    pub remote: bool,
    pub models: Vec<String>,
    pub preferred_model: Option<String>,
}

pub fn get_settings(state: &AppState) -> CommandResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    for key in SETTING_KEYS {
        if let Some(value) = state.db.get_setting(key)? {
            map.insert(key.to_string(), mask_secret(key, &value));
        }
    }
    Ok(map)
}

fn check_key(key: &str) -> CommandResult<()> {
    if SETTING_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(AppError::UnknownSetting(key.to_string()))
    }
}

/// Store a setting and rebuild the dispatcher so it takes effect.
pub async fn set_setting(state: &AppState, key: &str, value: &str) -> CommandResult<()> {
    check_key(key)?;
    state.db.set_setting(key, value)?;
    state.reload_dispatcher().await
}

pub async fn delete_setting(state: &AppState, key: &str) -> CommandResult<()> {
    check_key(key)?;
    state.db.delete_setting(key)?;
    state.reload_dispatcher().await
}

pub async fn get_ai_status(state: &AppState) -> AiStatus {
    let dispatcher = state.dispatcher().await;
    let models = dispatcher.models().to_vec();
    AiStatus {
        remote: dispatcher.is_remote(),
        preferred_model: models.get(dispatcher.preferred_index()).cloned(),
        models,
    }
}
