//! Текстовый и JSON-дамп параметров TMAG/TMG2.

use std::io::Write;

use serde_json::{Map, Value};
use tnt_types::TntResult;

use crate::{params::Parameters, schema::Record};

pub const TMAG_TITLE: &str = "TMAG struct (acquisition parameters):";
pub const TMG2_TITLE: &str = "TMG2 struct (processing parameters):";

/// Пишет `name:\tvalue` для каждого поля, кроме зарезервированных.
pub fn dump_params<W: Write>(
    writer: &mut W,
    params: &Parameters,
) -> TntResult<()> {
    writeln!(writer, "{TMAG_TITLE}")?;
    dump_record(writer, params.acquisition.record())?;

    writeln!(writer)?;
    writeln!(writer, "{TMG2_TITLE}")?;
    dump_record(writer, params.processing.record())?;

    Ok(())
}

fn dump_record<W: Write>(
    writer: &mut W,
    record: &Record,
) -> TntResult<()> {
    for (field, value) in record.iter() {
        if field.kind.is_reserved() {
            continue;
        }
        writeln!(writer, "{}:\t{}", field.name, value)?;
    }
    Ok(())
}

/// Те же поля в виде `{"TMAG": {...}, "TMG2": {...}}`.
pub fn params_to_json(params: &Parameters) -> Value {
    let mut root = Map::new();
    root.insert("TMAG".into(), record_to_json(params.acquisition.record()));
    root.insert("TMG2".into(), record_to_json(params.processing.record()));
    Value::Object(root)
}

fn record_to_json(record: &Record) -> Value {
    let fields = record
        .iter()
        .filter(|(field, _)| !field.kind.is_reserved())
        .map(|(field, value)| {
            let json = serde_json::to_value(value).unwrap_or(Value::Null);
            (field.name.to_string(), json)
        })
        .collect::<Map<_, _>>();

    Value::Object(fields)
}
