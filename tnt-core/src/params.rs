use tnt_types::{FieldValue, TntError, TntResult};

use crate::schema::{Record, TMAG_SCHEMA, TMG2_SCHEMA};

/// Параметры сбора данных (секция TMAG).
///
/// Поля, которыми пользуется обработка, вынесены в типизированный вид;
/// полная структура доступна через [`record`](Self::record).
#[derive(Debug, Clone)]
pub struct AcquisitionParameters {
    /// Число точек по измерениям: прямое + до трёх косвенных
    pub actual_npts: [usize; 4],
    /// Интервал дискретизации по измерениям, с
    pub dwell: [f64; 4],
    /// Частота передатчика по измерениям, МГц
    pub ob_freq: [f64; 4],
    /// Опорная частота, Гц
    pub ref_freq: f64,
    /// Заданное число накоплений
    pub scans: i64,
    /// Фактически выполненное число накоплений
    pub actual_scans: i64,
    /// Время регистрации одного накопления, с
    pub acq_time: f64,
    /// Задержка после регистрации, с
    pub last_delay: f64,
    /// Начало эксперимента (Unix time, с)
    pub start_time: u32,
    /// Окончание эксперимента (Unix time, с)
    pub finish_time: u32,
    /// Дата сохранения, `YYYY/MM/DD hh:mm:ss`
    pub date: String,
    record: Record,
}

impl AcquisitionParameters {
    /// Декодирует нагрузку секции TMAG.
    pub fn decode(payload: &[u8]) -> TntResult<Self> {
        let record = TMAG_SCHEMA.decode(payload)?;

        let npts = record.ints::<4>("actual_npts")?;
        let mut actual_npts = [0usize; 4];
        for (dst, &n) in actual_npts.iter_mut().zip(npts.iter()) {
            *dst = usize::try_from(n).map_err(|_| {
                TntError::format_violation(format!("negative point count in actual_npts: {npts:?}"))
            })?;
        }

        Ok(Self {
            actual_npts,
            dwell: record.floats::<4>("dwell")?,
            ob_freq: record.floats::<4>("ob_freq")?,
            ref_freq: record.float("ref_freq")?,
            scans: record.int("scans")?,
            actual_scans: record.int("actual_scans")?,
            acq_time: record.float("acq_time")?,
            last_delay: record.float("last_delay")?,
            start_time: record.int("start_time")? as u32,
            finish_time: record.int("finish_time")? as u32,
            date: record.text("date")?,
            record,
        })
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Общее число комплексных точек.
    pub fn total_points(&self) -> usize {
        self.actual_npts.iter().product()
    }
}

/// Параметры обработки (секция TMG2).
#[derive(Debug, Clone)]
pub struct ProcessingParameters {
    /// Уширение линии по измерениям, Гц
    pub linebrd: [f64; 4],
    /// Накопленная фаза нулевого порядка, градусы
    pub cumm_0_phase: [f64; 4],
    /// Накопленная фаза первого порядка, градусы
    pub cumm_1_phase: [f64; 4],
    record: Record,
}

impl ProcessingParameters {
    /// Декодирует нагрузку секции TMG2.
    pub fn decode(payload: &[u8]) -> TntResult<Self> {
        let record = TMG2_SCHEMA.decode(payload)?;

        Ok(Self {
            linebrd: record.floats::<4>("linebrd")?,
            cumm_0_phase: record.floats::<4>("cumm_0_phase")?,
            cumm_1_phase: record.floats::<4>("cumm_1_phase")?,
            record,
        })
    }

    pub fn record(&self) -> &Record {
        &self.record
    }
}

/// Обе структуры метаданных с единым поиском поля по имени.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub acquisition: AcquisitionParameters,
    pub processing: ProcessingParameters,
}

impl Parameters {
    pub fn new(
        acquisition: AcquisitionParameters,
        processing: ProcessingParameters,
    ) -> Self {
        Self {
            acquisition,
            processing,
        }
    }

    /// Ищет поле сначала в TMAG, затем в TMG2.
    pub fn field(
        &self,
        name: &str,
    ) -> TntResult<&FieldValue> {
        self.acquisition
            .record
            .get(name)
            .or_else(|| self.processing.record.get(name))
            .ok_or_else(|| TntError::UnknownField(name.to_string()))
    }
}
