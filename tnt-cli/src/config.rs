use std::path::PathBuf;

use tnt_core::{LbFft, ProcessingParameters};

/// Что делать с найденной резервной копией.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupAction {
    /// Вывести полный путь
    Print,
    /// Вывести только имя файла
    Basename,
    /// Удалить файл
    Delete,
    /// `git rm` в каталоге файла
    GitRm,
    /// `svn rm` в каталоге файла
    SvnRm,
}

/// Параметры команды `fft`.
#[derive(Debug, Clone)]
pub struct FftConfig {
    /// Уширение линии, Гц (None = из TMG2 или 0)
    pub line_broadening: Option<f64>,
    /// Степень дополнения нулями
    pub zero_fill: u32,
    /// Фаза 0-го порядка, градусы
    pub phase_deg: Option<f64>,
    /// Фаза 1-го порядка, градусы
    pub ph1_deg: Option<f64>,
    /// Автоматическая фазировка (перекрывает любые фазы)
    pub auto_phase: bool,
    /// Брать параметры обработки из TMG2
    pub use_stored: bool,
    /// Верхняя граница окна, ppm
    pub max_ppm: f64,
    /// Нижняя граница окна, ppm
    pub min_ppm: f64,
    /// Путь к матрице gnuplot
    pub output_path: PathBuf,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl FftConfig {
    /// Параметры LBfft: сохранённые в файле (если `use_stored`) с
    /// переопределениями из командной строки.
    pub fn lb_fft(
        &self,
        processing: &ProcessingParameters,
    ) -> LbFft {
        let mut lb = if self.use_stored {
            LbFft::from_processing(processing, self.zero_fill)
        } else {
            LbFft::new(0.0, self.zero_fill)
        };

        if let Some(v) = self.line_broadening {
            lb.line_broadening = v;
        }
        if let Some(deg) = self.phase_deg {
            lb.phase = Some(deg.to_radians());
        }
        if let Some(deg) = self.ph1_deg {
            lb.ph1 = deg.to_radians();
        }
        if self.auto_phase {
            lb.phase = None;
        }

        lb
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для BackupAction, FftConfig
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for BackupAction {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            BackupAction::Print => write!(f, "print"),
            BackupAction::Basename => write!(f, "basename"),
            BackupAction::Delete => write!(f, "delete"),
            BackupAction::GitRm => write!(f, "gitrm"),
            BackupAction::SvnRm => write!(f, "svnrm"),
        }
    }
}

impl std::str::FromStr for BackupAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "print" => Ok(BackupAction::Print),
            "basename" | "print_basename" => Ok(BackupAction::Basename),
            "delete" | "rm" => Ok(BackupAction::Delete),
            "gitrm" | "git" => Ok(BackupAction::GitRm),
            "svnrm" | "svn" => Ok(BackupAction::SvnRm),
            _ => Err(format!(
                "Unknown backup action: '{s}'. Use: print, basename, delete, gitrm, svnrm"
            )),
        }
    }
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            line_broadening: None,
            zero_fill: 0,
            phase_deg: None,
            ph1_deg: None,
            auto_phase: false,
            use_stored: true,
            max_ppm: f64::INFINITY,
            min_ppm: f64::NEG_INFINITY,
            output_path: PathBuf::from("spectrum.gpt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_action_roundtrip() {
        for action in [
            BackupAction::Print,
            BackupAction::Basename,
            BackupAction::Delete,
            BackupAction::GitRm,
            BackupAction::SvnRm,
        ] {
            assert_eq!(action.to_string().parse::<BackupAction>(), Ok(action));
        }

        assert_eq!("GIT".parse::<BackupAction>(), Ok(BackupAction::GitRm));
        assert!("shred".parse::<BackupAction>().is_err());
    }

    #[test]
    fn test_fft_config_default() {
        let cfg = FftConfig::default();

        assert!(cfg.use_stored);
        assert_eq!(cfg.zero_fill, 0);
        assert!(cfg.max_ppm.is_infinite() && cfg.max_ppm > 0.0);
        assert!(cfg.min_ppm.is_infinite() && cfg.min_ppm < 0.0);
    }

    #[test]
    fn test_overrides_applied_over_stored() {
        let stored = ProcessingParameters::decode(&[0u8; 2048]).unwrap();
        let cfg = FftConfig {
            line_broadening: Some(20.0),
            zero_fill: 2,
            phase_deg: Some(90.0),
            ..FftConfig::default()
        };

        let lb = cfg.lb_fft(&stored);
        assert_eq!(lb.line_broadening, 20.0);
        assert_eq!(lb.zero_fill, 2);
        assert_eq!(lb.phase, Some(90f64.to_radians()));
        assert_eq!(lb.ph1, 0.0);

        let auto = FftConfig {
            auto_phase: true,
            ..cfg
        };
        assert_eq!(auto.lb_fft(&stored).phase, None);
    }
}
