//! Контейнер TNT (TecMag TNMR)
//!
//! Файл начинается с 8-байтной сигнатуры `TNT1.xxx`, за которой следует
//! последовательность секций:
//!
//! ```text
//! [0..4]   TAG     [u8; 4] - тег секции (Latin-1)
//! [4..8]   FLAG    u32     - булев флаг
//! [8..12]  LENGTH  u32     - длина нагрузки в байтах
//! [12..]   PAYLOAD [u8]    - LENGTH байт
//! ```
//!
//! Все многобайтовые числа хранятся в порядке little-endian.

use std::io::{self, Read, Seek, SeekFrom};

use log::debug;
use tnt_types::{SectionRecord, TntError, TntResult};

use crate::binary::read_u32_le;

/// Размер сигнатуры файла
pub const TNT_MAGIC_SIZE: usize = 8;

/// Начало сигнатуры, за ним три ASCII-цифры версии
pub const TNT_MAGIC_PREFIX: &[u8; 5] = b"TNT1.";

/// Размер заголовка секции (тег + флаг + длина)
pub const TNT_SECTION_HEADER_SIZE: usize = 12;

/// Секции не длиннее этого порога читаются в память сразу, более длинные
/// только запоминаются по смещению.
pub const INLINE_PAYLOAD_LIMIT: u32 = 4096;

pub const TAG_TMAG: &str = "TMAG";
pub const TAG_TMG2: &str = "TMG2";
pub const TAG_DATA: &str = "DATA";
pub const TAG_PSEQ: &str = "PSEQ";

/// Проверяет сигнатуру `TNT1.` + три цифры.
pub fn is_tnt_magic(magic: &[u8]) -> bool {
    magic.len() == TNT_MAGIC_SIZE
        && magic.starts_with(TNT_MAGIC_PREFIX)
        && magic[TNT_MAGIC_PREFIX.len()..]
            .iter()
            .all(|b| b.is_ascii_digit())
}

/// Упорядоченная таблица секций.
///
/// Повторный тег перезаписывает более раннюю запись, сохраняя её позицию.
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    records: Vec<SectionRecord>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        record: SectionRecord,
    ) {
        match self.records.iter_mut().find(|r| r.tag == record.tag) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn get(
        &self,
        tag: &str,
    ) -> Option<&SectionRecord> {
        self.records.iter().find(|r| r.tag == tag)
    }

    /// Как [`get`](Self::get), но отсутствие секции является ошибкой поиска.
    pub fn require(
        &self,
        tag: &str,
    ) -> TntResult<&SectionRecord> {
        self.get(tag)
            .ok_or_else(|| TntError::MissingSection(tag.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionRecord> {
        self.records.iter()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.tag.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Сумма объявленных длин всех секций.
    pub fn payload_total(&self) -> u64 {
        self.records.iter().map(|r| r.length as u64).sum()
    }
}

/// Результат разбора контейнера: сигнатура и таблица секций.
#[derive(Debug, Clone)]
pub struct Container {
    pub magic: String,
    pub sections: SectionTable,
}

/// Разбор сигнатуры и таблицы секций.
#[derive(Debug, Clone, Copy)]
pub struct ContainerParser {
    inline_limit: u32,
}

impl Default for ContainerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerParser {
    pub fn new() -> Self {
        Self {
            inline_limit: INLINE_PAYLOAD_LIMIT,
        }
    }

    /// Переопределяет порог буферизации нагрузки.
    pub fn with_inline_limit(limit: u32) -> Self {
        Self {
            inline_limit: limit,
        }
    }

    pub fn inline_limit(&self) -> u32 {
        self.inline_limit
    }

    /// Читает и проверяет сигнатуру файла.
    pub fn read_magic<R: Read>(reader: &mut R) -> TntResult<String> {
        let mut magic = [0u8; TNT_MAGIC_SIZE];
        let n = read_full(reader, &mut magic)?;

        if n < TNT_MAGIC_SIZE {
            return Err(TntError::invalid_magic(format!(
                "file too short for a TNT signature ({n} bytes)"
            )));
        }

        if !is_tnt_magic(&magic) {
            return Err(TntError::invalid_magic(format!(
                "not a TNT file (signature {:?})",
                String::from_utf8_lossy(&magic)
            )));
        }

        Ok(magic.iter().map(|&b| b as char).collect())
    }

    /// Читает сигнатуру и все заголовки секций.
    ///
    /// Неполный заголовок в конце файла означает конец таблицы, а не ошибку.
    pub fn parse<R: Read + Seek>(
        &self,
        reader: &mut R,
    ) -> TntResult<Container> {
        let magic = Self::read_magic(reader)?;
        let mut sections = SectionTable::new();
        let mut hdr = [0u8; TNT_SECTION_HEADER_SIZE];

        while read_full(reader, &mut hdr)? == TNT_SECTION_HEADER_SIZE {
            let tag = SectionRecord::tag_from_bytes(&[hdr[0], hdr[1], hdr[2], hdr[3]]);
            let mut off = 4;
            let flag = read_u32_le(&hdr, &mut off) != 0;
            let length = read_u32_le(&hdr, &mut off);
            let offset = reader.stream_position()?;

            let data = if length <= self.inline_limit {
                let mut payload = vec![0u8; length as usize];
                reader.read_exact(&mut payload).map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => TntError::format_violation(format!(
                        "section {tag} truncated: expected {length} bytes"
                    )),
                    _ => TntError::Io(e),
                })?;
                Some(payload)
            } else {
                reader.seek(SeekFrom::Current(length as i64))?;
                None
            };

            debug!("section {tag}: offset={offset} length={length} flag={flag}");

            sections.insert(SectionRecord {
                tag,
                offset,
                length,
                flag,
                data,
            });
        }

        Ok(Container { magic, sections })
    }
}

/// Читает до заполнения буфера или до EOF, возвращает число прочитанных байт.
fn read_full<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tnt_types::ErrorKind;

    use super::*;

    fn section(
        tag: &[u8; 4],
        flag: u32,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(tag);
        buf.extend_from_slice(&flag.to_le_bytes());
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_magic_pattern() {
        assert!(is_tnt_magic(b"TNT1.005"));
        assert!(is_tnt_magic(b"TNT1.000"));
        assert!(!is_tnt_magic(b"TNT1.0a5"));
        assert!(!is_tnt_magic(b"TNT2.005"));
        assert!(!is_tnt_magic(&[0u8; 8]));
        assert!(!is_tnt_magic(b"TNT1.00"));
    }

    #[test]
    fn test_parse_sections() {
        let mut raw = b"TNT1.005".to_vec();
        raw.extend(section(b"TMAG", 1, &[7u8; 16]));
        raw.extend(section(b"DATA", 0, &[0u8; 5000]));
        raw.extend(section(b"TMG2", 1, &[9u8; 3]));

        let c = ContainerParser::new().parse(&mut Cursor::new(&raw)).unwrap();

        assert_eq!(c.magic, "TNT1.005");
        assert_eq!(c.sections.tags().collect::<Vec<_>>(), ["TMAG", "DATA", "TMG2"]);

        let tmag = c.sections.get("TMAG").unwrap();
        assert_eq!(tmag.offset, 20);
        assert_eq!(tmag.length, 16);
        assert!(tmag.flag);
        assert_eq!(tmag.payload(), Some(&[7u8; 16][..]));

        let data = c.sections.get("DATA").unwrap();
        assert_eq!(data.offset, 20 + 16 + 12);
        assert!(!data.is_inline(), "большая секция не должна буферизоваться");
        assert!(!data.flag);

        let tmg2 = c.sections.get("TMG2").unwrap();
        assert_eq!(tmg2.offset, data.end() + 12);
    }

    #[test]
    fn test_header_fields_little_endian() {
        let mut raw = b"TNT1.005".to_vec();
        raw.extend_from_slice(b"TMAG");
        raw.extend_from_slice(&[0, 0, 0, 1]);
        raw.extend_from_slice(&[3, 0, 0, 0]);
        raw.extend_from_slice(&[1, 2, 3]);

        let c = ContainerParser::new().parse(&mut Cursor::new(&raw)).unwrap();
        let tmag = c.sections.get("TMAG").unwrap();

        // старший байт флага ненулевой
        assert!(tmag.flag);
        assert_eq!(tmag.length, 3);
        assert_eq!(tmag.offset, 20);
        assert_eq!(tmag.payload(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_sizes_add_up() {
        let mut raw = b"TNT1.005".to_vec();
        raw.extend(section(b"TMAG", 1, &[0u8; 100]));
        raw.extend(section(b"DATA", 1, &[0u8; 8192]));
        raw.extend(section(b"PSEQ", 1, &[]));

        let c = ContainerParser::new().parse(&mut Cursor::new(&raw)).unwrap();
        let overhead = (c.sections.len() * TNT_SECTION_HEADER_SIZE) as u64;

        assert_eq!(
            c.sections.payload_total() + overhead,
            (raw.len() - TNT_MAGIC_SIZE) as u64
        );
    }

    #[test]
    fn test_duplicate_tag_last_write_wins() {
        let mut raw = b"TNT1.005".to_vec();
        raw.extend(section(b"TMAG", 0, &[1u8; 4]));
        raw.extend(section(b"DATA", 0, &[0u8; 8]));
        raw.extend(section(b"TMAG", 1, &[2u8; 6]));

        let c = ContainerParser::new().parse(&mut Cursor::new(&raw)).unwrap();

        assert_eq!(c.sections.len(), 2);
        assert_eq!(c.sections.tags().collect::<Vec<_>>(), ["TMAG", "DATA"]);

        let tmag = c.sections.get("TMAG").unwrap();
        assert_eq!(tmag.length, 6);
        assert_eq!(tmag.payload(), Some(&[2u8; 6][..]));
    }

    #[test]
    fn test_partial_header_ends_table() {
        let mut raw = b"TNT1.005".to_vec();
        raw.extend(section(b"TMAG", 0, &[1u8; 4]));
        raw.extend_from_slice(b"DAT"); // обрывок заголовка

        let c = ContainerParser::new().parse(&mut Cursor::new(&raw)).unwrap();

        assert_eq!(c.sections.len(), 1);
    }

    #[test]
    fn test_truncated_inline_payload() {
        let mut raw = b"TNT1.005".to_vec();
        raw.extend_from_slice(b"TMAG");
        raw.extend_from_slice(&0u32.to_le_bytes());
        raw.extend_from_slice(&64u32.to_le_bytes());
        raw.extend_from_slice(&[0u8; 10]);

        let err = ContainerParser::new()
            .parse(&mut Cursor::new(&raw))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_zero_bytes_rejected() {
        let raw = vec![0u8; 4096];
        let err = ContainerParser::new()
            .parse(&mut Cursor::new(&raw))
            .unwrap_err();

        assert!(matches!(err, TntError::InvalidMagic(_)));
    }

    #[test]
    fn test_short_file_rejected() {
        let err = ContainerParser::new()
            .parse(&mut Cursor::new(b"TNT"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_inline_limit_override() {
        let mut raw = b"TNT1.005".to_vec();
        raw.extend(section(b"TMAG", 0, &[1u8; 64]));

        let c = ContainerParser::with_inline_limit(16)
            .parse(&mut Cursor::new(&raw))
            .unwrap();

        assert!(!c.sections.get("TMAG").unwrap().is_inline());
    }

    #[test]
    fn test_require_missing_section() {
        let table = SectionTable::new();
        let err = table.require("DATA").unwrap_err();

        assert!(matches!(err, TntError::MissingSection(ref t) if t == "DATA"));
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }
}
