use std::io;

use thiserror::Error;

/// 应用错误类型
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cannot read settings: {0}")]
    SettingsRead(#[from] toml::de::Error),

    #[error("cannot write settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
