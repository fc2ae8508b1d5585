use std::fmt;

use serde::Serialize;

/// Тип поля в структурах TMAG/TMG2 (все числа little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
    /// Строка фиксированной длины (Latin-1, дополнена нулями)
    Text(usize),
    /// Зарезервированные байты, не декодируются
    Reserved(usize),
}

impl FieldKind {
    /// Размер одного элемента в байтах
    pub fn size(&self) -> usize {
        match self {
            FieldKind::I16 | FieldKind::U16 => 2,
            FieldKind::I32 | FieldKind::U32 | FieldKind::F32 => 4,
            FieldKind::F64 => 8,
            FieldKind::Text(n) | FieldKind::Reserved(n) => *n,
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self, FieldKind::Reserved(_))
    }
}

/// Декодированное значение поля.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Text(String),
    Reserved,
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            FieldValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            FieldValue::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for FieldValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Ints(v) => write_list(f, v),
            FieldValue::Floats(v) => write_list(f, v),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Reserved => Ok(()),
        }
    }
}
