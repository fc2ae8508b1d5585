//! Оси частоты, химического сдвига и времени.
//!
//! Спектры TNMR хранятся от больших ppm к меньшим, поэтому частотная ось
//! убывает: частоты центрированных (как после fftshift) бинов берутся с
//! обратным знаком, а затем к ним прибавляется опорная частота `ref_freq`.
//! Бин `i` спектра [`LbFft`](crate::spectrum::LbFft) получает ровно свою
//! частоту.

use crate::params::AcquisitionParameters;

impl AcquisitionParameters {
    /// Частотная ось в Гц длины `n` (убывающая).
    ///
    /// `freq[i] = -(i - n/2) / (n * dwell) + ref_freq`
    pub fn freq_hz(
        &self,
        n: usize,
    ) -> Vec<f64> {
        let span = n as f64 * self.dwell[0];
        let half = (n / 2) as f64;

        (0..n)
            .map(|i| -(i as f64 - half) / span + self.ref_freq)
            .collect()
    }

    /// Ось химического сдвига: `freq_hz(n) / ob_freq[0]`.
    pub fn freq_ppm(
        &self,
        n: usize,
    ) -> Vec<f64> {
        let ob = self.ob_freq[0];
        self.freq_hz(n).into_iter().map(|f| f / ob).collect()
    }

    /// Моменты отсчётов FID: `0, dwell, 2*dwell, ...`
    pub fn fid_times(
        &self,
        n: usize,
    ) -> Vec<f64> {
        (0..n).map(|i| i as f64 * self.dwell[0]).collect()
    }

    /// Полуоткрытый диапазон индексов `[i_max, i_min)` оси ppm длины `n`,
    /// попадающий в `[min_ppm, max_ppm]`.
    ///
    /// До `i_max` все значения строго больше `max_ppm`, начиная с `i_min`
    /// строго меньше `min_ppm`. Границы вне оси зажимаются в `0..=n`.
    pub fn ppm_points(
        &self,
        max_ppm: f64,
        min_ppm: f64,
        n: usize,
    ) -> (usize, usize) {
        let ppm = self.freq_ppm(n);

        let i_max = ppm.partition_point(|&p| p > max_ppm);
        let i_min = ppm.partition_point(|&p| p >= min_ppm).max(i_max);

        (i_max, i_min)
    }

    /// `(i_min - 1, i_max - 1)` для обхода того же диапазона в обратном
    /// порядке. Значение `-1` означает «перед началом оси».
    pub fn ppm_points_reverse(
        &self,
        min_ppm: f64,
        max_ppm: f64,
        n: usize,
    ) -> (isize, isize) {
        let (i_max, i_min) = self.ppm_points(max_ppm, min_ppm, n);
        (i_min as isize - 1, i_max as isize - 1)
    }

    /// Длительность одного спектра: `scans * (acq_time + last_delay)`.
    pub fn spec_acq_time(&self) -> f64 {
        self.scans as f64 * (self.acq_time + self.last_delay)
    }

    /// Моменты начала первых `n` спектров относительно старта.
    pub fn spec_times(
        &self,
        n: usize,
    ) -> Vec<f64> {
        let step = self.spec_acq_time();
        (0..n).map(|i| i as f64 * step).collect()
    }

    /// [`spec_times`](Self::spec_times) для всех трасс файла.
    pub fn all_spec_times(&self) -> Vec<f64> {
        self.spec_times(self.actual_npts[1..].iter().product())
    }

    /// Число полностью накопленных спектров.
    ///
    /// Если накопление прервано (`actual_scans != scans`), последний
    /// спектр неполон и не учитывается.
    pub fn n_complete_spec(&self) -> usize {
        if self.scans == self.actual_scans {
            self.actual_npts[1]
        } else {
            self.actual_npts[1].saturating_sub(1)
        }
    }
}
