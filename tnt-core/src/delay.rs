//! Таблицы задержек, встроенные в секцию импульсной последовательности (PSEQ).
//!
//! Каждая таблица хранится как две строки с 32-битным префиксом длины:
//!
//! ```text
//! [u32 LE] имя  ("de7:2")
//! [u32 LE] значения через пробел ("1u 2u 5m ...")
//! ```
//!
//! Структура секции PSEQ не описана, поэтому таблицы находятся поиском
//! имени по шаблону `de<цифры>:<цифра>`.

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use tnt_types::{TntError, TntResult};

/// Множитель SI-приставки. `s` означает секунды, без масштабирования.
pub fn si_prefix(c: char) -> Option<f64> {
    let scale = match c {
        'y' => 1e-24,
        'z' => 1e-21,
        'a' => 1e-18,
        'f' => 1e-15,
        'p' => 1e-12,
        'n' => 1e-9,
        'u' => 1e-6,
        'm' => 1e-3,
        's' => 1.0,
        'k' => 1e3,
        'M' => 1e6,
        'G' => 1e9,
        'T' => 1e12,
        'P' => 1e15,
        'E' => 1e18,
        'Z' => 1e21,
        'Y' => 1e24,
        _ => return None,
    };
    Some(scale)
}

/// Разбирает токен вида `12.5`, `5m`, `2k`.
pub fn parse_delay_value(token: &str) -> TntResult<f64> {
    if let Ok(v) = token.parse::<f64>() {
        return Ok(v);
    }

    let mut chars = token.chars();
    let suffix = chars
        .next_back()
        .ok_or_else(|| TntError::invalid_value("empty delay token"))?;
    let number = chars.as_str();

    let scale = si_prefix(suffix).ok_or_else(|| {
        TntError::invalid_value(format!("unknown SI suffix '{suffix}' in '{token}'"))
    })?;
    let value = number
        .parse::<f64>()
        .map_err(|e| TntError::invalid_value(format!("invalid delay value '{token}': {e}")))?;

    Ok(value * scale)
}

/// Таблица, которую не удалось декодировать.
#[derive(Debug)]
pub struct DelayTableError {
    pub name: String,
    pub error: TntError,
}

/// Результат сканирования: таблицы по имени и ошибки отдельных таблиц.
#[derive(Debug, Default)]
pub struct DelayTables {
    tables: BTreeMap<String, Vec<f64>>,
    errors: Vec<DelayTableError>,
}

impl DelayTables {
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&[f64]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn tables(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.tables
    }

    /// Таблицы, отброшенные из-за некорректных значений.
    pub fn errors(&self) -> &[DelayTableError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Поиск таблиц задержек в сырых байтах секции PSEQ.
pub struct DelayTableScanner<'a> {
    buf: &'a [u8],
}

impl<'a> DelayTableScanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn scan(&self) -> DelayTables {
        let mut result = DelayTables::default();
        let mut pos = 0;

        while let Some((start, end)) = find_marker(self.buf, pos) {
            pos = end;

            let Some((name, values)) = self.read_table(start, end) else {
                debug!("delay marker at {start} has no valid length prefix, skipping");
                continue;
            };

            let tokens: Vec<&str> = values.split_whitespace().collect();
            if tokens.len() < 2 {
                debug!("delay table {name} has {} token(s), discarded", tokens.len());
                continue;
            }

            match tokens
                .iter()
                .map(|t| parse_delay_value(t))
                .collect::<TntResult<Vec<f64>>>()
            {
                Ok(parsed) => {
                    debug!("delay table {name}: {} values", parsed.len());
                    result.tables.insert(name, parsed);
                }
                Err(error) => {
                    warn!("delay table {name} could not be decoded: {error}");
                    result.tables.remove(&name);
                    result.errors.push(DelayTableError { name, error });
                }
            }
        }

        result
    }

    /// Читает имя (с префиксом длины за 4 байта до маркера) и строку значений.
    fn read_table(
        &self,
        marker: usize,
        marker_end: usize,
    ) -> Option<(String, String)> {
        let mut off = marker.checked_sub(4)?;

        let name = read_prefixed(self.buf, &mut off)?;
        if name.len() < marker_end - marker {
            return None;
        }
        let values = read_prefixed(self.buf, &mut off)?;

        Some((name, values))
    }
}

/// Строка Latin-1 с префиксом длины u32 LE.
fn read_prefixed(
    buf: &[u8],
    off: &mut usize,
) -> Option<String> {
    let len_end = off.checked_add(4)?;
    let len = LittleEndian::read_u32(buf.get(*off..len_end)?) as usize;
    let end = len_end.checked_add(len)?;
    let raw = buf.get(len_end..end)?;
    *off = end;
    Some(raw.iter().map(|&b| b as char).collect())
}

/// Ищет `de<цифры>:<цифра>` начиная с `from`, возвращает `(start, end)`.
fn find_marker(
    buf: &[u8],
    from: usize,
) -> Option<(usize, usize)> {
    let mut i = from;

    while i + 1 < buf.len() {
        if buf[i] == b'd' && buf[i + 1] == b'e' {
            if let Some(end) = match_marker_tail(buf, i + 2) {
                return Some((i, end));
            }
        }
        i += 1;
    }

    None
}

fn match_marker_tail(
    buf: &[u8],
    start: usize,
) -> Option<usize> {
    let digits = buf
        .get(start..)?
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }

    let colon = start + digits;
    if buf.get(colon) == Some(&b':') && buf.get(colon + 1).is_some_and(u8::is_ascii_digit) {
        Some(colon + 2)
    } else {
        None
    }
}
