use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub store_path: String,
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8090".into(),
            store_path: "./data/suggestions.json".into(),
            page_size: 5,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("bot.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("store_path") {
                settings.store_path = v.clone();
            }
            if let Some(v) = file_cfg.get("page_size") {
                if let Ok(parsed) = v.parse::<usize>() {
                    if parsed > 0 {
                        settings.page_size = parsed;
                    }
                }
            }
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("STORE_PATH") {
        settings.store_path = v;
    }
    if let Ok(v) = std::env::var("APP__STORE_PATH") {
        settings.store_path = v;
    }

    if let Ok(v) = std::env::var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<usize>() {
            if parsed > 0 {
                settings.page_size = parsed;
            }
        }
    }

    settings
}

pub fn prepare_store_path(raw_store_path: &str) -> anyhow::Result<PathBuf> {
    let store_path = normalize_store_path(raw_store_path);
    ensure_parent_dir_exists(&store_path)?;
    Ok(store_path)
}

fn normalize_store_path(raw_store_path: &str) -> PathBuf {
    let raw_store_path = raw_store_path.trim();

    if raw_store_path.is_empty() {
        return PathBuf::from(Settings::default().store_path);
    }

    PathBuf::from(raw_store_path.replace('\\', "/"))
}

fn ensure_parent_dir_exists(path: &Path) -> anyhow::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for store path '{}'",
            parent.display(),
            path.display()
        )
    })?;

    Ok(())
}
