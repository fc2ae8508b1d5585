use thiserror::Error;
use tnt_types::TntError;

pub type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Ошибка чтения или обработки файла TNT
    #[error("TNT error: {0}")]
    Tnt(#[from] TntError),

    /// Ошибка ввода/вывода
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Внешняя команда (git/svn) завершилась с ошибкой
    #[error("Command `{command}` failed: {status}")]
    Command { command: String, status: String },

    /// Недопустимое значение аргумента
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
