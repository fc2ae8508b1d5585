use rustfft::num_complex::Complex64;
use tnt_types::{TntError, TntResult};

/// Линейный индекс в 4-мерном массиве с порядком по столбцам
/// (первая ось меняется быстрее всех).
pub fn column_major_index(
    shape: &[usize; 4],
    idx: [usize; 4],
) -> Option<usize> {
    if idx.iter().zip(shape.iter()).any(|(&i, &n)| i >= n) {
        return None;
    }

    Some(idx[0] + shape[0] * (idx[1] + shape[1] * (idx[2] + shape[2] * idx[3])))
}

/// 4-мерный массив комплексных чисел в порядке по столбцам.
///
/// Первая ось - точки одной трассы (время или частота), остальные оси
/// нумеруют трассы. Каждая трасса лежит в памяти непрерывно.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexArray {
    shape: [usize; 4],
    data: Vec<Complex64>,
}

impl ComplexArray {
    pub fn zeros(shape: [usize; 4]) -> Self {
        Self {
            shape,
            data: vec![Complex64::new(0.0, 0.0); shape.iter().product()],
        }
    }

    pub fn from_vec(
        shape: [usize; 4],
        data: Vec<Complex64>,
    ) -> TntResult<Self> {
        let expected: usize = shape.iter().product();

        if data.len() != expected {
            return Err(TntError::invalid_value(format!(
                "array of shape {shape:?} needs {expected} elements, got {}",
                data.len()
            )));
        }

        Ok(Self { shape, data })
    }

    /// Без проверки длины: вызывающий гарантирует `data.len() == product(shape)`.
    pub(crate) fn from_parts(
        shape: [usize; 4],
        data: Vec<Complex64>,
    ) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        Self { shape, data }
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Длина одной трассы (первая ось)
    pub fn trace_len(&self) -> usize {
        self.shape[0]
    }

    /// Число трасс (произведение осей 1..4)
    pub fn n_traces(&self) -> usize {
        self.shape[1..].iter().product()
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    pub fn get(
        &self,
        idx: [usize; 4],
    ) -> Option<Complex64> {
        column_major_index(&self.shape, idx).map(|i| self.data[i])
    }

    pub fn trace(
        &self,
        t: usize,
    ) -> &[Complex64] {
        let n = self.shape[0];
        &self.data[t * n..(t + 1) * n]
    }

    pub fn trace_mut(
        &mut self,
        t: usize,
    ) -> &mut [Complex64] {
        let n = self.shape[0];
        &mut self.data[t * n..(t + 1) * n]
    }

    pub fn traces(&self) -> impl Iterator<Item = &[Complex64]> {
        (0..self.n_traces()).map(move |t| self.trace(t))
    }

    /// Сумма всех элементов
    pub fn sum(&self) -> Complex64 {
        self.data.iter().sum()
    }

    pub fn map_inplace<F: FnMut(usize, &mut Complex64)>(
        &mut self,
        mut f: F,
    ) {
        let n = self.shape[0].max(1);
        for (i, v) in self.data.iter_mut().enumerate() {
            f(i % n, v);
        }
    }
}
