//! Преобразование FID в спектр (LBfft).
//!
//! Порядок шагов для каждой трассы:
//!
//! 1. вычитание постоянной составляющей (среднее по последней 1/8 трассы);
//! 2. экспоненциальное окно `exp(-pi * LB * dwell * i)`;
//! 3. БПФ длины `n * 2^zf` с дополнением нулями;
//! 4. fftshift и нормировка на `sqrt(N)`;
//! 5. фазовая коррекция (автоматическая либо заданная 0-го и 1-го порядка).

use std::{f64::consts::PI, io::Write};

use log::debug;
use rustfft::{num_complex::Complex64, FftPlanner};
use tnt_types::{TntError, TntResult};

use crate::{array::ComplexArray, params::ProcessingParameters};

/// Параметры конвейера LBfft. Фазы в радианах.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LbFft {
    /// Уширение линии, Гц
    pub line_broadening: f64,
    /// Степень дополнения нулями: длина БПФ = n * 2^zero_fill
    pub zero_fill: u32,
    /// Фаза 0-го порядка; `None` включает автоматическую фазировку
    pub phase: Option<f64>,
    /// Фаза 1-го порядка, линейная по частотной оси от -0.5 до 0.5
    pub ph1: f64,
    /// Явная постоянная составляющая вместо вычисленной
    pub dc_offset: Option<Complex64>,
}

impl Default for LbFft {
    fn default() -> Self {
        Self {
            line_broadening: 0.0,
            zero_fill: 0,
            phase: None,
            ph1: 0.0,
            dc_offset: None,
        }
    }
}

impl LbFft {
    pub fn new(
        line_broadening: f64,
        zero_fill: u32,
    ) -> Self {
        Self {
            line_broadening,
            zero_fill,
            ..Self::default()
        }
    }

    /// Параметры, сохранённые в TMG2 (фазы там в градусах).
    pub fn from_processing(
        processing: &ProcessingParameters,
        zero_fill: u32,
    ) -> Self {
        Self {
            line_broadening: processing.linebrd[0],
            zero_fill,
            phase: Some(processing.cumm_0_phase[0].to_radians()),
            ph1: processing.cumm_1_phase[0].to_radians(),
            dc_offset: None,
        }
    }

    pub fn with_phase(
        mut self,
        phase: f64,
    ) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_ph1(
        mut self,
        ph1: f64,
    ) -> Self {
        self.ph1 = ph1;
        self
    }

    pub fn with_dc_offset(
        mut self,
        dc_offset: Complex64,
    ) -> Self {
        self.dc_offset = Some(dc_offset);
        self
    }

    /// Длина БПФ для трассы из `n` точек.
    pub fn padded_len(
        &self,
        n: usize,
    ) -> TntResult<usize> {
        1usize
            .checked_shl(self.zero_fill)
            .and_then(|factor| n.checked_mul(factor))
            .ok_or_else(|| {
                TntError::invalid_value(format!(
                    "zero fill 2^{} of {n} points overflows",
                    self.zero_fill
                ))
            })
    }

    /// Применяет конвейер к `input` (первая ось - время).
    ///
    /// Если задан `progress`, в него пишется строка с величиной
    /// постоянной составляющей.
    pub fn process(
        &self,
        input: &ComplexArray,
        dwell: f64,
        progress: Option<&mut dyn Write>,
    ) -> TntResult<ComplexArray> {
        let n = input.trace_len();
        let padded = self.padded_len(n)?;
        let shape = input.shape();
        let mut out = ComplexArray::zeros([padded, shape[1], shape[2], shape[3]]);

        if padded == 0 {
            return Ok(out);
        }

        let offsets: Vec<Complex64> = match self.dc_offset {
            Some(dc) => vec![dc; input.n_traces()],
            None => input.traces().map(dc_offset).collect(),
        };

        let mean_abs = offsets.iter().map(|c| c.norm()).sum::<f64>() / offsets.len().max(1) as f64;
        debug!("DC offset: mean magnitude {mean_abs:e} over {} traces", offsets.len());
        if let Some(sink) = progress {
            writeln!(sink, "average DC offset is {mean_abs}")?;
        }

        let window = lb_window(self.line_broadening, dwell, n);
        let fft = FftPlanner::<f64>::new().plan_fft_forward(padded);
        let norm = 1.0 / (padded as f64).sqrt();

        for (t, dc) in offsets.iter().enumerate() {
            let src = input.trace(t);
            let dst = out.trace_mut(t);

            for ((d, &s), &w) in dst.iter_mut().zip(src).zip(&window) {
                *d = (s - *dc) * w;
            }

            fft.process(dst);
            fftshift(dst);
            dst.iter_mut().for_each(|v| *v *= norm);
        }

        match self.phase {
            None => {
                let rot = Complex64::from_polar(1.0, -out.sum().arg());
                out.map_inplace(|_, v| *v *= rot);
            }
            Some(phase) => {
                let ramp = linspace(-0.5, 0.5, padded);
                let rot: Vec<Complex64> = ramp
                    .iter()
                    .map(|r| Complex64::from_polar(1.0, phase + self.ph1 * r))
                    .collect();
                out.map_inplace(|i, v| *v *= rot[i]);
            }
        }

        Ok(out)
    }
}

/// Среднее по последней восьмой части трассы.
pub fn dc_offset(trace: &[Complex64]) -> Complex64 {
    let n = trace.len();
    let tail = &trace[n * 7 / 8..];

    if tail.is_empty() {
        return Complex64::new(0.0, 0.0);
    }

    tail.iter().sum::<Complex64>() / tail.len() as f64
}

/// Экспоненциальное окно уширения линии.
pub fn lb_window(
    line_broadening: f64,
    dwell: f64,
    n: usize,
) -> Vec<f64> {
    let k = -PI * line_broadening * dwell;
    (0..n).map(|i| (k * i as f64).exp()).collect()
}

/// Перестановка, после которой нулевая частота оказывается в центре.
pub fn fftshift<T>(data: &mut [T]) {
    let half = data.len() / 2;
    data.rotate_right(half);
}

/// `n` равноотстоящих точек от `start` до `stop` включительно.
pub fn linspace(
    start: f64,
    stop: f64,
    n: usize,
) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
