#![allow(dead_code)]

use std::{f64::consts::PI, io::Write};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use tempfile::NamedTempFile;
use tnt_core::{Complex32, Schema, TMAG_SCHEMA, TMG2_SCHEMA};

// ===========================================================================
// Структуры TMAG / TMG2
// ===========================================================================

/// Буфер фиксированной структуры, заполняемый по именам полей.
#[derive(Clone)]
pub struct StructBuf {
    schema: &'static Schema,
    pub buf: Vec<u8>,
}

impl StructBuf {
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            buf: vec![0u8; schema.size()],
        }
    }

    pub fn put(
        &mut self,
        name: &str,
        bytes: &[u8],
    ) -> &mut Self {
        let off = self
            .schema
            .offset_of(name)
            .unwrap_or_else(|| panic!("no field {name}"));
        self.buf[off..off + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub fn i32s(
        &mut self,
        name: &str,
        values: &[i32],
    ) -> &mut Self {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.put(name, &bytes)
    }

    pub fn u32(
        &mut self,
        name: &str,
        value: u32,
    ) -> &mut Self {
        self.put(name, &value.to_le_bytes())
    }

    pub fn f64s(
        &mut self,
        name: &str,
        values: &[f64],
    ) -> &mut Self {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.put(name, &bytes)
    }
}

// ===========================================================================
// Секции и файл
// ===========================================================================

/// Заголовок секции (тег, флаг, длина) и нагрузка.
pub fn section(
    tag: &[u8; 4],
    flag: u32,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + payload.len());
    out.extend_from_slice(tag);
    out.extend_from_slice(&flag.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Строка с префиксом длины u32 LE.
pub fn prefixed(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

/// Нагрузка PSEQ с таблицами задержек среди мусора, не короче `min_len`.
pub fn pseq(
    tables: &[(&str, &str)],
    min_len: usize,
) -> Vec<u8> {
    let mut out = b"PSEQ\x00\x01junk-de-header".to_vec();
    for (name, values) in tables {
        out.extend_from_slice(&[0x5A; 13]);
        out.extend(prefixed(name));
        out.extend(prefixed(values));
    }
    if out.len() < min_len {
        out.resize(min_len, 0);
    }
    out
}

pub fn encode_samples(samples: &[Complex32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|c| {
            let mut b = [0u8; 8];
            b[..4].copy_from_slice(&c.re.to_le_bytes());
            b[4..].copy_from_slice(&c.im.to_le_bytes());
            b
        })
        .collect()
}

/// Детерминированный шум амплитуды `amp`.
pub fn noise(
    seed: u64,
    n: usize,
    amp: f32,
) -> Vec<Complex32> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Complex32::new(rng.gen_range(-amp..amp), rng.gen_range(-amp..amp)))
        .collect()
}

/// Затухающий FID с частотой `freq_hz` (знак соответствует оси ppm файла).
pub fn decaying_fid(
    n: usize,
    dwell: f64,
    freq_hz: f64,
    t2: f64,
) -> Vec<Complex32> {
    (0..n)
        .map(|k| {
            let t = k as f64 * dwell;
            let amp = (-t / t2).exp();
            let phase = -2.0 * PI * freq_hz * t;
            Complex32::new((amp * phase.cos()) as f32, (amp * phase.sin()) as f32)
        })
        .collect()
}

/// Сборщик синтетического файла `.tnt`.
#[derive(Clone)]
pub struct TntBuilder {
    pub magic: Vec<u8>,
    pub tmag: StructBuf,
    pub tmg2: StructBuf,
    pub data: Vec<u8>,
    pub pseq: Option<Vec<u8>>,
    pub extra: Vec<Vec<u8>>,
}

impl TntBuilder {
    /// Файл с нулевыми отсчётами формы `npts`.
    pub fn new(
        npts: [i32; 4],
        dwell: f64,
        ob_freq: f64,
    ) -> Self {
        let mut tmag = StructBuf::new(&TMAG_SCHEMA);
        tmag.i32s("npts", &npts)
            .i32s("actual_npts", &npts)
            .i32s("scans", &[8])
            .i32s("actual_scans", &[8])
            .f64s("dwell", &[dwell, 0.0, 0.0, 0.0])
            .f64s("ob_freq", &[ob_freq, 0.0, 0.0, 0.0])
            .f64s("acq_time", &[dwell * npts[0] as f64])
            .f64s("last_delay", &[1.0])
            .u32("start_time", 1_380_565_000)
            .u32("finish_time", 1_380_565_340)
            .put("date", b"2013/09/30 20:22:29")
            .put("nucleus", b"7Li");

        let total: usize = npts.iter().map(|&n| n.max(0) as usize).product();

        Self {
            magic: b"TNT1.005".to_vec(),
            tmag,
            tmg2: StructBuf::new(&TMG2_SCHEMA),
            data: vec![0u8; total * 8],
            pseq: None,
            extra: Vec::new(),
        }
    }

    pub fn samples(
        mut self,
        samples: &[Complex32],
    ) -> Self {
        self.data = encode_samples(samples);
        self
    }

    pub fn with_pseq(
        mut self,
        payload: Vec<u8>,
    ) -> Self {
        self.pseq = Some(payload);
        self
    }

    pub fn with_section(
        mut self,
        raw: Vec<u8>,
    ) -> Self {
        self.extra.push(raw);
        self
    }

    /// Порядок секций: TMAG, DATA, TMG2, PSEQ, затем дополнительные.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.magic.clone();
        out.extend(section(b"TMAG", 1, &self.tmag.buf));
        out.extend(section(b"DATA", 1, &self.data));
        out.extend(section(b"TMG2", 1, &self.tmg2.buf));
        if let Some(p) = &self.pseq {
            out.extend(section(b"PSEQ", 1, p));
        }
        for raw in &self.extra {
            out.extend_from_slice(raw);
        }
        out
    }

    pub fn write(&self) -> NamedTempFile {
        write_bytes(&self.bytes())
    }
}

pub fn write_bytes(bytes: &[u8]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp file");
    tmp.write_all(bytes).expect("write temp file");
    tmp.flush().expect("flush temp file");
    tmp
}
