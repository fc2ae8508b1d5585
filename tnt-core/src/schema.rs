//! Схемы фиксированных структур TMAG (1024 байта) и TMG2 (2048 байт).
//!
//! Поля упакованы без выравнивания: смещение каждого поля равно сумме
//! размеров предыдущих.

use std::{collections::HashMap, sync::LazyLock};

use tnt_types::{
    FieldKind::{self, Reserved, Text, F32, F64, I16, I32, U16, U32},
    FieldValue, TntError, TntResult,
};

use crate::{
    binary::{
        read_f32_le, read_f64_le, read_i16_le, read_i32_le, read_latin1, read_u16_le, read_u32_le,
    },
    format::{TAG_TMAG, TAG_TMG2},
};

/// Описание поля в таблице схемы.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub count: usize,
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        kind: FieldKind,
        count: usize,
    ) -> Self {
        Self { name, kind, count }
    }
}

/// Поле с вычисленным смещением.
#[derive(Debug, Clone, Copy)]
pub struct FieldLayout {
    pub name: &'static str,
    pub kind: FieldKind,
    pub count: usize,
    pub offset: usize,
}

impl FieldLayout {
    pub fn byte_len(&self) -> usize {
        self.kind.size() * self.count
    }
}

/// Схема структуры: упорядоченные поля и индекс по имени.
#[derive(Debug)]
pub struct Schema {
    tag: &'static str,
    fields: Vec<FieldLayout>,
    index: HashMap<&'static str, usize>,
    size: usize,
}

impl Schema {
    pub fn new(
        tag: &'static str,
        specs: &[FieldSpec],
    ) -> Self {
        let mut fields = Vec::with_capacity(specs.len());
        let mut index = HashMap::with_capacity(specs.len());
        let mut offset = 0;

        for spec in specs {
            index.insert(spec.name, fields.len());
            fields.push(FieldLayout {
                name: spec.name,
                kind: spec.kind,
                count: spec.count,
                offset,
            });
            offset += spec.kind.size() * spec.count;
        }

        Self {
            tag,
            fields,
            index,
            size: offset,
        }
    }

    /// Тег секции, которую описывает схема
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Ожидаемая длина секции в байтах
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    pub fn field(
        &self,
        name: &str,
    ) -> Option<&FieldLayout> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn offset_of(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.field(name).map(|f| f.offset)
    }

    /// Декодирует нагрузку секции; длина должна точно совпадать со схемой.
    pub fn decode(
        &'static self,
        payload: &[u8],
    ) -> TntResult<Record> {
        if payload.len() != self.size {
            return Err(TntError::length_mismatch(
                self.tag,
                payload.len() as u64,
                self.size as u64,
            ));
        }

        let values = self
            .fields
            .iter()
            .map(|f| decode_field(payload, f))
            .collect();

        Ok(Record {
            schema: self,
            values,
        })
    }
}

fn decode_field(
    buf: &[u8],
    field: &FieldLayout,
) -> FieldValue {
    let mut off = field.offset;

    let read_int = |off: &mut usize| -> i64 {
        match field.kind {
            FieldKind::I16 => read_i16_le(buf, off) as i64,
            FieldKind::U16 => read_u16_le(buf, off) as i64,
            FieldKind::I32 => read_i32_le(buf, off) as i64,
            _ => read_u32_le(buf, off) as i64,
        }
    };

    match field.kind {
        FieldKind::Reserved(_) => FieldValue::Reserved,
        FieldKind::Text(_) => FieldValue::Text(read_latin1(buf, &mut off, field.byte_len())),
        FieldKind::F32 | FieldKind::F64 => {
            let read_float = |off: &mut usize| match field.kind {
                FieldKind::F32 => read_f32_le(buf, off) as f64,
                _ => read_f64_le(buf, off),
            };
            if field.count == 1 {
                FieldValue::Float(read_float(&mut off))
            } else {
                FieldValue::Floats((0..field.count).map(|_| read_float(&mut off)).collect())
            }
        }
        _ => {
            if field.count == 1 {
                FieldValue::Int(read_int(&mut off))
            } else {
                FieldValue::Ints((0..field.count).map(|_| read_int(&mut off)).collect())
            }
        }
    }
}

/// Декодированная структура: значения в порядке полей схемы.
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<FieldValue>,
}

impl Record {
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&FieldValue> {
        self.schema.index.get(name).map(|&i| &self.values[i])
    }

    /// Пары (поле, значение) в порядке схемы.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldLayout, &FieldValue)> {
        self.schema.fields.iter().zip(self.values.iter())
    }

    pub(crate) fn int(
        &self,
        name: &str,
    ) -> TntResult<i64> {
        self.get(name)
            .and_then(FieldValue::as_int)
            .ok_or_else(|| TntError::UnknownField(name.to_string()))
    }

    pub(crate) fn float(
        &self,
        name: &str,
    ) -> TntResult<f64> {
        self.get(name)
            .and_then(FieldValue::as_float)
            .ok_or_else(|| TntError::UnknownField(name.to_string()))
    }

    pub(crate) fn ints<const N: usize>(
        &self,
        name: &str,
    ) -> TntResult<[i64; N]> {
        self.get(name)
            .and_then(FieldValue::as_ints)
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| TntError::UnknownField(name.to_string()))
    }

    pub(crate) fn floats<const N: usize>(
        &self,
        name: &str,
    ) -> TntResult<[f64; N]> {
        self.get(name)
            .and_then(FieldValue::as_floats)
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| TntError::UnknownField(name.to_string()))
    }

    pub(crate) fn text(
        &self,
        name: &str,
    ) -> TntResult<String> {
        self.get(name)
            .and_then(FieldValue::as_text)
            .map(str::to_string)
            .ok_or_else(|| TntError::UnknownField(name.to_string()))
    }
}

const TMAG_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("npts", I32, 4),
    FieldSpec::new("actual_npts", I32, 4),
    FieldSpec::new("acq_points", I32, 1),
    FieldSpec::new("npts_start", I32, 4),
    FieldSpec::new("scans", I32, 1),
    FieldSpec::new("actual_scans", I32, 1),
    FieldSpec::new("dummy_scans", I32, 1),
    FieldSpec::new("repeat_times", I32, 1),
    FieldSpec::new("sadimension", I32, 1),
    FieldSpec::new("samode", I32, 1),
    // частоты
    FieldSpec::new("magnet_field", F64, 1),
    FieldSpec::new("ob_freq", F64, 4),
    FieldSpec::new("base_freq", F64, 4),
    FieldSpec::new("offset_freq", F64, 4),
    FieldSpec::new("ref_freq", F64, 1),
    FieldSpec::new("NMR_frequency", F64, 1),
    FieldSpec::new("obs_channel", I16, 1),
    FieldSpec::new("space2", Reserved(42), 1),
    // спектральная ширина и время
    FieldSpec::new("sw", F64, 4),
    FieldSpec::new("dwell", F64, 4),
    FieldSpec::new("filter", F64, 1),
    FieldSpec::new("experiment_time", F64, 1),
    FieldSpec::new("acq_time", F64, 1),
    FieldSpec::new("last_delay", F64, 1),
    FieldSpec::new("spectrum_direction", I16, 1),
    FieldSpec::new("hardware_sideband", I16, 1),
    FieldSpec::new("Taps", I16, 1),
    FieldSpec::new("Type", I16, 1),
    FieldSpec::new("bDigRec", U32, 1),
    FieldSpec::new("nDigitalCenter", I32, 1),
    FieldSpec::new("space3", Reserved(16), 1),
    // аппаратные параметры
    FieldSpec::new("transmitter_gain", I16, 1),
    FieldSpec::new("receiver_gain", I16, 1),
    FieldSpec::new("NumberOfReceivers", I16, 1),
    FieldSpec::new("RG2", I16, 1),
    FieldSpec::new("receiver_phase", F64, 1),
    FieldSpec::new("space4", Reserved(4), 1),
    FieldSpec::new("set_spin_rate", U16, 1),
    FieldSpec::new("actual_spin_rate", U16, 1),
    // lock
    FieldSpec::new("lock_field", I16, 1),
    FieldSpec::new("lock_power", I16, 1),
    FieldSpec::new("lock_gain", I16, 1),
    FieldSpec::new("lock_phase", I16, 1),
    FieldSpec::new("lock_freq_mhz", F64, 1),
    FieldSpec::new("lock_ppm", F64, 1),
    FieldSpec::new("H2O_freq_ref", F64, 1),
    FieldSpec::new("space5", Reserved(16), 1),
    // температура и шиммы
    FieldSpec::new("set_temperature", F64, 1),
    FieldSpec::new("actual_temperature", F64, 1),
    FieldSpec::new("shim_units", F64, 1),
    FieldSpec::new("shims", I16, 36),
    FieldSpec::new("shim_FWHM", F64, 1),
    FieldSpec::new("HH_dcpl_attn", I16, 1),
    FieldSpec::new("DF_DN", I16, 1),
    FieldSpec::new("F1_tran_mode", I16, 7),
    FieldSpec::new("dec_BW", I16, 1),
    FieldSpec::new("grd_orientation", Text(4), 1),
    FieldSpec::new("LatchLP", I32, 1),
    FieldSpec::new("grd_Theta", F64, 1),
    FieldSpec::new("grd_Phi", F64, 1),
    FieldSpec::new("space6", Reserved(264), 1),
    // время эксперимента
    FieldSpec::new("start_time", U32, 1),
    FieldSpec::new("finish_time", U32, 1),
    FieldSpec::new("elapsed_time", I32, 1),
    FieldSpec::new("date", Text(32), 1),
    FieldSpec::new("nucleus", Text(16), 1),
    FieldSpec::new("nucleus_2D", Text(16), 1),
    FieldSpec::new("nucleus_3D", Text(16), 1),
    FieldSpec::new("nucleus_4D", Text(16), 1),
    FieldSpec::new("sequence", Text(32), 1),
    FieldSpec::new("lock_solvent", Text(16), 1),
    FieldSpec::new("lock_nucleus", Text(16), 1),
];

const TMG2_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("real_flag", U32, 1),
    FieldSpec::new("imag_flag", U32, 1),
    FieldSpec::new("magn_flag", U32, 1),
    FieldSpec::new("axis_visible", U32, 1),
    FieldSpec::new("auto_scale", U32, 1),
    FieldSpec::new("line_display", U32, 1),
    FieldSpec::new("show_shim_units", U32, 1),
    FieldSpec::new("integral_display", U32, 1),
    FieldSpec::new("fit_display", U32, 1),
    FieldSpec::new("show_pivot", U32, 1),
    FieldSpec::new("label_peaks", U32, 1),
    FieldSpec::new("keep_manual_peaks", U32, 1),
    FieldSpec::new("label_peaks_in", U32, 1),
    FieldSpec::new("integral_dc", U32, 1),
    FieldSpec::new("integral_show_multiplier", U32, 1),
    FieldSpec::new("Boolean_space", Reserved(4), 9),
    FieldSpec::new("all_ffts_done", U32, 4),
    FieldSpec::new("all_phase_done", U32, 4),
    // отображение
    FieldSpec::new("amp", F64, 1),
    FieldSpec::new("ampbits", F64, 1),
    FieldSpec::new("ampCtl", F64, 1),
    FieldSpec::new("offset", I32, 1),
    FieldSpec::new("axis_set", Reserved(48), 1),
    FieldSpec::new("display_units", I16, 4),
    FieldSpec::new("ref_point", I32, 4),
    FieldSpec::new("ref_value", F64, 4),
    FieldSpec::new("z_start", I32, 1),
    FieldSpec::new("z_end", I32, 1),
    FieldSpec::new("z_select_start", I32, 1),
    FieldSpec::new("z_select_end", I32, 1),
    FieldSpec::new("last_zoom_start", I32, 1),
    FieldSpec::new("last_zoom_end", I32, 1),
    FieldSpec::new("index_2D", I32, 1),
    FieldSpec::new("index_3D", I32, 1),
    FieldSpec::new("index_4D", I32, 1),
    // аподизация
    FieldSpec::new("apodization_done", I32, 4),
    FieldSpec::new("linebrd", F64, 4),
    FieldSpec::new("gaussbrd", F64, 4),
    FieldSpec::new("dmbrd", F64, 4),
    FieldSpec::new("sine_bell_shift", F64, 4),
    FieldSpec::new("sine_bell_width", F64, 4),
    FieldSpec::new("sine_bell_skew", F64, 4),
    FieldSpec::new("Trapezoid_points", I32, 16),
    FieldSpec::new("trap_height", F64, 1),
    FieldSpec::new("echo_center", F64, 4),
    FieldSpec::new("data_shift_points", I32, 4),
    FieldSpec::new("DC_offset", F64, 4),
    // фаза
    FieldSpec::new("cumm_0_phase", F64, 4),
    FieldSpec::new("cumm_1_phase", F64, 4),
    FieldSpec::new("manual_0_phase", F64, 1),
    FieldSpec::new("manual_1_phase", F64, 1),
    FieldSpec::new("phase_0_value", F64, 1),
    FieldSpec::new("phase_1_value", F64, 1),
    FieldSpec::new("session_phase_0", F64, 1),
    FieldSpec::new("session_phase_1", F64, 1),
    // пики и интегралы
    FieldSpec::new("max_index", I32, 1),
    FieldSpec::new("min_index", I32, 1),
    FieldSpec::new("peak_threshold", F32, 1),
    FieldSpec::new("peak_noise", F32, 1),
    FieldSpec::new("integral_dc_points", I16, 1),
    FieldSpec::new("integral_label_type", I16, 1),
    FieldSpec::new("integral_scale_factor", F32, 1),
    FieldSpec::new("auto_integrate_shoulder", I32, 1),
    FieldSpec::new("auto_integrate_dc_points", I32, 1),
    FieldSpec::new("auto_integrate_shoulder_thresh", F32, 1),
    FieldSpec::new("space", Reserved(4), 1),
    FieldSpec::new("unused", Reserved(1240), 1),
];

/// Схема параметров сбора данных (секция TMAG)
pub static TMAG_SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema::new(TAG_TMAG, TMAG_FIELDS));

/// Схема параметров обработки (секция TMG2)
pub static TMG2_SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema::new(TAG_TMG2, TMG2_FIELDS));
