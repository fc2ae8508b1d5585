//! Открытый файл TNT: таблица секций, параметры, таблицы задержек и
//! отображённые в память отсчёты.
//!
//! Файл открывается целиком или не открывается вовсе: любая ошибка
//! проверки прерывает [`TntFile::open`].

use std::{
    borrow::Cow,
    fs::File,
    io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};
use tnt_types::{FieldValue, SectionRecord, TntError, TntResult};

use crate::{
    array::ComplexArray,
    data::SampleArray,
    delay::{DelayTableScanner, DelayTables},
    export::write_gnuplot_matrix,
    format::{ContainerParser, SectionTable, TAG_DATA, TAG_PSEQ, TAG_TMAG, TAG_TMG2},
    params::{AcquisitionParameters, Parameters, ProcessingParameters},
    spectrum::LbFft,
};

#[derive(Debug)]
pub struct TntFile {
    path: PathBuf,
    magic: String,
    sections: SectionTable,
    params: Parameters,
    delay_tables: DelayTables,
    samples: SampleArray,
}

impl TntFile {
    pub fn open<P: AsRef<Path>>(path: P) -> TntResult<Self> {
        Self::open_with(path, ContainerParser::new())
    }

    /// Открывает файл с заданным парсером контейнера (например, с другим
    /// порогом буферизации секций).
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        parser: ContainerParser,
    ) -> TntResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        let container = parser.parse(&mut BufReader::new(&file))?;
        let sections = container.sections;

        if let Some(r) = sections.iter().find(|r| r.end() > file_len) {
            return Err(TntError::format_violation(format!(
                "section {} ends at byte {} past end of file ({file_len} bytes)",
                r.tag,
                r.end()
            )));
        }

        let acquisition =
            AcquisitionParameters::decode(&section_payload(&file, sections.require(TAG_TMAG)?)?)?;

        let samples = SampleArray::map(
            &file,
            sections.require(TAG_DATA)?,
            acquisition.actual_npts,
        )?;

        let processing =
            ProcessingParameters::decode(&section_payload(&file, sections.require(TAG_TMG2)?)?)?;

        let delay_tables = match sections.get(TAG_PSEQ) {
            Some(pseq) => DelayTableScanner::new(&section_payload(&file, pseq)?).scan(),
            None => {
                debug!("no {TAG_PSEQ} section, delay tables unavailable");
                DelayTables::default()
            }
        };

        info!(
            "opened {} ({}): {} sections, npts={:?}, {} delay tables",
            path.display(),
            container.magic,
            sections.len(),
            acquisition.actual_npts,
            delay_tables.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            magic: container.magic,
            sections,
            params: Parameters::new(acquisition, processing),
            delay_tables,
            samples,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn magic(&self) -> &str {
        &self.magic
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    pub fn acquisition(&self) -> &AcquisitionParameters {
        &self.params.acquisition
    }

    pub fn processing(&self) -> &ProcessingParameters {
        &self.params.processing
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Поле по имени: сначала TMAG, затем TMG2.
    pub fn field(
        &self,
        name: &str,
    ) -> TntResult<&FieldValue> {
        self.params.field(name)
    }

    pub fn delay_tables(&self) -> &DelayTables {
        &self.delay_tables
    }

    pub fn samples(&self) -> &SampleArray {
        &self.samples
    }

    /// Спектр по отсчётам файла или по `alt`, если он задан.
    pub fn lb_fft(
        &self,
        params: &LbFft,
        alt: Option<&ComplexArray>,
        progress: Option<&mut dyn Write>,
    ) -> TntResult<ComplexArray> {
        let owned;
        let input = match alt {
            Some(a) => a,
            None => {
                owned = self.samples.to_complex_array();
                &owned
            }
        };

        params.process(input, self.acquisition().dwell[0], progress)
    }

    /// Длина первой оси: у `alt`, если задан, иначе `actual_npts[0]`.
    fn npts(
        &self,
        alt: Option<&ComplexArray>,
    ) -> usize {
        alt.map_or(self.acquisition().actual_npts[0], ComplexArray::trace_len)
    }

    pub fn freq_hz(
        &self,
        alt: Option<&ComplexArray>,
    ) -> Vec<f64> {
        self.acquisition().freq_hz(self.npts(alt))
    }

    pub fn freq_ppm(
        &self,
        alt: Option<&ComplexArray>,
    ) -> Vec<f64> {
        self.acquisition().freq_ppm(self.npts(alt))
    }

    pub fn fid_times(
        &self,
        alt: Option<&ComplexArray>,
    ) -> Vec<f64> {
        self.acquisition().fid_times(self.npts(alt))
    }

    pub fn ppm_points(
        &self,
        max_ppm: f64,
        min_ppm: f64,
        alt: Option<&ComplexArray>,
    ) -> (usize, usize) {
        self.acquisition()
            .ppm_points(max_ppm, min_ppm, self.npts(alt))
    }

    pub fn ppm_points_reverse(
        &self,
        min_ppm: f64,
        max_ppm: f64,
        alt: Option<&ComplexArray>,
    ) -> (isize, isize) {
        self.acquisition()
            .ppm_points_reverse(min_ppm, max_ppm, self.npts(alt))
    }

    pub fn spec_acq_time(&self) -> f64 {
        self.acquisition().spec_acq_time()
    }

    /// Моменты начала спектров; по умолчанию для всех трасс файла.
    pub fn spec_times(
        &self,
        nspec: Option<usize>,
    ) -> Vec<f64> {
        match nspec {
            Some(n) => self.acquisition().spec_times(n),
            None => self.acquisition().all_spec_times(),
        }
    }

    pub fn n_complete_spec(&self) -> usize {
        self.acquisition().n_complete_spec()
    }

    /// Сохраняет действительную часть `spectrum` в диапазоне
    /// `[min_ppm, max_ppm]` как матрицу gnuplot.
    ///
    /// По умолчанию берутся `n_complete_spec()` спектров (не больше, чем
    /// есть во второй оси) и времена [`spec_times`](Self::spec_times).
    pub fn save_gnuplot_matrix<P: AsRef<Path>>(
        &self,
        path: P,
        spectrum: &ComplexArray,
        max_ppm: f64,
        min_ppm: f64,
        nspec: Option<usize>,
        times: Option<&[f64]>,
    ) -> TntResult<()> {
        let available = spectrum.shape()[1];
        let nspec = match nspec {
            Some(n) if n > spectrum.n_traces() => {
                return Err(TntError::invalid_value(format!(
                    "requested {n} spectra, array holds {}",
                    spectrum.n_traces()
                )));
            }
            Some(n) => n,
            None => self.n_complete_spec().min(available),
        };

        let n = spectrum.trace_len();
        let (i_max, i_min) = self.acquisition().ppm_points(max_ppm, min_ppm, n);
        let axis = self.acquisition().freq_ppm(n);
        let ppm = &axis[i_max..i_min];

        let columns: Vec<Vec<f64>> = (0..nspec)
            .map(|j| spectrum.trace(j)[i_max..i_min].iter().map(|c| c.re).collect())
            .collect();

        let default_times;
        let times = match times {
            Some(t) => t,
            None => {
                default_times = self.acquisition().spec_times(nspec);
                &default_times
            }
        };

        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        write_gnuplot_matrix(&mut writer, ppm, &columns, times)?;
        writer.flush()?;

        info!(
            "gnuplot matrix {}: {} points x {nspec} spectra",
            path.as_ref().display(),
            ppm.len()
        );
        Ok(())
    }

    /// Закрывает файл и освобождает отображение секции DATA.
    pub fn close(self) {
        debug!("closing {}", self.path.display());
    }
}

/// Нагрузка секции: из буфера, если она была прочитана при разборе,
/// иначе с диска по смещению.
fn section_payload<'a>(
    file: &File,
    record: &'a SectionRecord,
) -> TntResult<Cow<'a, [u8]>> {
    if let Some(data) = record.payload() {
        return Ok(Cow::Borrowed(data));
    }

    let mut handle = file;
    let mut buf = vec![0u8; record.length as usize];
    handle.seek(SeekFrom::Start(record.offset))?;
    handle.read_exact(&mut buf)?;

    Ok(Cow::Owned(buf))
}
