use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use tnt_types::{TntError, TntResult};

use crate::params::AcquisitionParameters;

/// Формат поля `date` в TMAG
pub const TNT_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Unix time (с) в локальное время.
pub fn epoch_to_local(secs: u32) -> TntResult<DateTime<Local>> {
    Local
        .timestamp_opt(secs as i64, 0)
        .single()
        .ok_or_else(|| TntError::invalid_value(format!("timestamp {secs} has no local time")))
}

/// Разбирает строку даты TNMR (`2013/09/30 20:22:29`).
pub fn parse_tnt_date(text: &str) -> TntResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TNT_DATE_FORMAT)
        .map_err(|e| TntError::invalid_value(format!("invalid date '{text}': {e}")))
}

impl AcquisitionParameters {
    /// Начало эксперимента
    pub fn start_datetime(&self) -> TntResult<DateTime<Local>> {
        epoch_to_local(self.start_time)
    }

    /// Окончание эксперимента
    pub fn finish_datetime(&self) -> TntResult<DateTime<Local>> {
        epoch_to_local(self.finish_time)
    }

    /// Момент сохранения файла (местное время без часового пояса).
    pub fn saved_date(&self) -> TntResult<NaiveDateTime> {
        parse_tnt_date(&self.date)
    }
}
