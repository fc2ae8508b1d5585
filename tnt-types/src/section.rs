use serde::Serialize;

/// Запись таблицы секций (тег/длина/значение).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRecord {
    /// Четырёхсимвольный тег секции (`TMAG`, `DATA`, ...)
    pub tag: String,
    /// Смещение полезной нагрузки от начала файла
    pub offset: u64,
    /// Длина полезной нагрузки в байтах
    pub length: u32,
    /// Булев флаг из заголовка секции
    pub flag: bool,
    /// Нагрузка, прочитанная сразу (только для небольших секций)
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
}

impl SectionRecord {
    /// Декодирует тег как Latin-1.
    pub fn tag_from_bytes(raw: &[u8; 4]) -> String {
        raw.iter().map(|&b| b as char).collect()
    }

    /// Первый байт после нагрузки.
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }

    pub fn is_inline(&self) -> bool {
        self.data.is_some()
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}
