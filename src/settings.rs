//! 用户偏好
//!
//! `SettingsStore` 是不透明的键值存储；`Preferences` 在其上提供类型化的读写。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::exercise::ExerciseConfig;

pub const KEY_FOLDER: &str = "selected_folder";
pub const KEY_SPEED: &str = "speed_ms";
pub const KEY_DELAY: &str = "delay_ms";
pub const KEY_SHUFFLE: &str = "shuffle_words";

/// 键值存储
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// TOML 文件存储，每次 `set` 都会写回
#[derive(Debug, Clone)]
pub struct TomlSettings {
    path: PathBuf,
    data: SettingsFile,
}

impl TomlSettings {
    /// 从文件加载，文件不存在时为空
    pub fn load(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// 空存储，首次 `set` 时创建文件
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            data: SettingsFile::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.data)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SettingsStore for TomlSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.data.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.data.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.data.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

/// 类型化偏好
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub folder: Option<PathBuf>,
    pub exercise: ExerciseConfig,
}

impl Preferences {
    /// 读取偏好；缺失或无法解析的值使用默认值
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        let defaults = ExerciseConfig::default();
        Self {
            folder: store.get(KEY_FOLDER).map(PathBuf::from),
            exercise: ExerciseConfig {
                speed_ms: parse_or(store, KEY_SPEED, defaults.speed_ms),
                delay_ms: parse_or(store, KEY_DELAY, defaults.delay_ms),
                shuffle_words: parse_or(store, KEY_SHUFFLE, defaults.shuffle_words),
            },
        }
    }

    pub fn store<S: SettingsStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        if let Some(folder) = &self.folder {
            store.set(KEY_FOLDER, &folder.to_string_lossy())?;
        }
        store.set(KEY_SPEED, &self.exercise.speed_ms.to_string())?;
        store.set(KEY_DELAY, &self.exercise.delay_ms.to_string())?;
        store.set(KEY_SHUFFLE, &self.exercise.shuffle_words.to_string())?;
        Ok(())
    }
}

fn parse_or<S, T>(store: &S, key: &str, default: T) -> T
where
    S: SettingsStore + ?Sized,
    T: std::str::FromStr,
{
    match store.get(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid setting {} = {:?}", key, raw);
            default
        }),
        None => default,
    }
}
