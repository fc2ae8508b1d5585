//! Отображение секции DATA в память.
//!
//! Отсчёты хранятся как пары `f32` LE (re, im) в порядке по столбцам,
//! форма массива совпадает с `actual_npts`. Секция не копируется:
//! страницы подгружаются по мере обращения.

use std::fs::File;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::{Mmap, MmapOptions};
use rustfft::num_complex::{Complex32, Complex64};
use tnt_types::{SectionRecord, TntError, TntResult};

use crate::array::{column_major_index, ComplexArray};

/// Размер одного комплексного отсчёта в байтах
pub const SAMPLE_SIZE: usize = 8;

/// Комплексные отсчёты секции DATA, доступные только для чтения.
#[derive(Debug)]
pub struct SampleArray {
    shape: [usize; 4],
    map: Option<Mmap>,
}

impl SampleArray {
    /// Отображает нагрузку секции DATA из `file`.
    ///
    /// Длина секции обязана равняться `product(shape) * 8`. Пустая секция
    /// допустима и не создаёт отображения.
    pub fn map(
        file: &File,
        section: &SectionRecord,
        shape: [usize; 4],
    ) -> TntResult<Self> {
        let expected = shape
            .iter()
            .try_fold(SAMPLE_SIZE as u64, |acc, &n| acc.checked_mul(n as u64))
            .ok_or_else(|| {
                TntError::format_violation(format!("sample array shape {shape:?} overflows"))
            })?;

        if section.length as u64 != expected {
            return Err(TntError::length_mismatch(
                &section.tag,
                section.length as u64,
                expected,
            ));
        }

        if expected == 0 {
            return Ok(Self { shape, map: None });
        }

        // SAFETY: отображение копируется при записи и открыто только на
        // чтение; длина секции проверена по размеру файла при разборе.
        let map = unsafe {
            MmapOptions::new()
                .offset(section.offset)
                .len(section.length as usize)
                .map_copy_read_only(file)?
        };

        Ok(Self {
            shape,
            map: Some(map),
        })
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Число комплексных отсчётов
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Сырые байты секции.
    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    fn sample_at(
        &self,
        linear: usize,
    ) -> Complex32 {
        let raw = &self.as_bytes()[linear * SAMPLE_SIZE..(linear + 1) * SAMPLE_SIZE];
        Complex32::new(
            LittleEndian::read_f32(&raw[..4]),
            LittleEndian::read_f32(&raw[4..]),
        )
    }

    /// Отсчёт по индексу `[i, j, k, l]`; `None` за пределами формы.
    pub fn get(
        &self,
        idx: [usize; 4],
    ) -> Option<Complex32> {
        column_major_index(&self.shape, idx).map(|i| self.sample_at(i))
    }

    /// Все отсчёты в порядке хранения.
    pub fn iter(&self) -> impl Iterator<Item = Complex32> + '_ {
        self.as_bytes().chunks_exact(SAMPLE_SIZE).map(|raw| {
            Complex32::new(
                LittleEndian::read_f32(&raw[..4]),
                LittleEndian::read_f32(&raw[4..]),
            )
        })
    }

    /// Одна трасса по индексам косвенных измерений.
    pub fn trace(
        &self,
        j: usize,
        k: usize,
        l: usize,
    ) -> Option<Vec<Complex32>> {
        let n = self.shape[0];
        let start = column_major_index(&self.shape, [0, j, k, l])?;
        Some((start..start + n).map(|i| self.sample_at(i)).collect())
    }

    /// Копия всех отсчётов с повышением точности до `f64`.
    pub fn to_complex_array(&self) -> ComplexArray {
        let data: Vec<Complex64> = self
            .iter()
            .map(|c| Complex64::new(c.re as f64, c.im as f64))
            .collect();

        ComplexArray::from_parts(self.shape, data)
    }
}
