use thiserror::Error;

/// Результат для операций с файлами TNT
pub type TntResult<T> = std::result::Result<T, TntError>;

/// Категория ошибки.
///
/// `Format` всегда фатальна при открытии файла, `Lookup` фатальна в точке
/// обращения, `Value` относится к одной таблице задержек и не прерывает
/// разбор файла целиком.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Lookup,
    Value,
    Io,
}

/// Типы ошибок формата TNT.
#[derive(Debug, Error)]
pub enum TntError {
    /// Неправильное магическое число
    #[error("Invalid magic: {0}")]
    InvalidMagic(String),

    /// Длина секции не совпадает со схемой или с размером массива выборок
    #[error("Section {tag} length mismatch: found {found}, expected {expected}")]
    LengthMismatch {
        tag: String,
        found: u64,
        expected: u64,
    },

    /// Нарушение формата (усечённые данные, секция за концом файла)
    #[error("Format violation: {0}")]
    FormatViolation(String),

    /// Обязательная секция отсутствует в таблице
    #[error("Missing section: {0}")]
    MissingSection(String),

    /// Поле не найдено ни в TMAG, ни в TMG2
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Некорректное значение (токен таблицы задержек, дата)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TntError {
    /// Удобные конструкторы
    pub fn invalid_magic<S: Into<String>>(s: S) -> Self {
        Self::InvalidMagic(s.into())
    }

    pub fn format_violation<S: Into<String>>(s: S) -> Self {
        Self::FormatViolation(s.into())
    }

    pub fn invalid_value<S: Into<String>>(s: S) -> Self {
        Self::InvalidValue(s.into())
    }

    pub fn length_mismatch<S: Into<String>>(
        tag: S,
        found: u64,
        expected: u64,
    ) -> Self {
        Self::LengthMismatch {
            tag: tag.into(),
            found,
            expected,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TntError::InvalidMagic(_)
            | TntError::LengthMismatch { .. }
            | TntError::FormatViolation(_) => ErrorKind::Format,
            TntError::MissingSection(_) | TntError::UnknownField(_) => ErrorKind::Lookup,
            TntError::InvalidValue(_) => ErrorKind::Value,
            TntError::Io(_) => ErrorKind::Io,
        }
    }
}
