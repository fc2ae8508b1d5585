use std::{io::Write, path::Path};

use log::{info, warn};
use tnt_core::{dump_params, params_to_json, TntFile};

use crate::{
    backup::{apply_action, find_backup_files},
    config::{BackupAction, FftConfig},
    error::CliResult,
};

/// Краткая сводка о файле: секции, размеры, частоты, время, таблицы задержек.
pub fn write_info<W: Write>(
    out: &mut W,
    tnt: &TntFile,
) -> CliResult<()> {
    let acq = tnt.acquisition();

    writeln!(out, "File          : {}", tnt.path().display())?;
    writeln!(out, "Magic         : {}", tnt.magic())?;
    writeln!(out, "Sections      :")?;
    for s in tnt.sections().iter() {
        writeln!(
            out,
            "  {:4}  offset={:<10} length={:<10} flag={}",
            s.tag, s.offset, s.length, s.flag
        )?;
    }

    writeln!(out, "Points        : {:?}", acq.actual_npts)?;
    writeln!(out, "Dwell         : {:e} s", acq.dwell[0])?;
    writeln!(out, "Observe freq  : {:.6} MHz", acq.ob_freq[0])?;
    writeln!(out, "Reference     : {} Hz", acq.ref_freq)?;
    writeln!(out, "Scans         : {} of {}", acq.actual_scans, acq.scans)?;
    writeln!(out, "Complete spec : {}", acq.n_complete_spec())?;
    writeln!(out, "Spectrum time : {:.3} s", acq.spec_acq_time())?;

    match (acq.start_datetime(), acq.finish_datetime()) {
        (Ok(start), Ok(finish)) => {
            writeln!(out, "Started       : {}", start.format("%Y-%m-%d %H:%M:%S"))?;
            writeln!(out, "Finished      : {}", finish.format("%Y-%m-%d %H:%M:%S"))?;
        }
        (Err(e), _) | (_, Err(e)) => warn!("acquisition times unavailable: {e}"),
    }
    match acq.saved_date() {
        Ok(d) => writeln!(out, "Saved         : {d}")?,
        Err(e) => warn!("{e}"),
    }

    let tables = tnt.delay_tables();
    writeln!(out, "Delay tables  : {}", tables.len())?;
    for (name, values) in tables.tables() {
        writeln!(out, "  {name}: {} values", values.len())?;
    }
    for failed in tables.errors() {
        writeln!(out, "  {}: {}", failed.name, failed.error)?;
    }

    Ok(())
}

/// Дамп параметров в текстовом виде или в JSON.
pub fn write_dump<W: Write>(
    out: &mut W,
    tnt: &TntFile,
    json: bool,
) -> CliResult<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &params_to_json(tnt.parameters()))?;
        writeln!(out)?;
    } else {
        dump_params(out, tnt.parameters())?;
    }
    Ok(())
}

/// Спектр по файлу `input`, сохранённый как матрица gnuplot.
///
/// Возвращает число точек по частоте в сохранённом окне.
pub fn run_fft(
    input: &Path,
    config: &FftConfig,
) -> CliResult<usize> {
    let tnt = TntFile::open(input)?;
    let lb = config.lb_fft(tnt.processing());

    info!(
        "LBfft: LB={} Hz, zf={}, phase={:?}, ph1={}",
        lb.line_broadening, lb.zero_fill, lb.phase, lb.ph1
    );

    let mut progress = std::io::stderr();
    let spectrum = tnt.lb_fft(&lb, None, Some(&mut progress))?;

    let (i_max, i_min) = tnt.ppm_points(config.max_ppm, config.min_ppm, Some(&spectrum));
    tnt.save_gnuplot_matrix(
        &config.output_path,
        &spectrum,
        config.max_ppm,
        config.min_ppm,
        None,
        None,
    )?;
    tnt.close();

    Ok(i_min - i_max)
}

/// Ищет резервные копии под `root` и применяет к каждой все действия.
pub fn run_backups<W: Write>(
    root: &Path,
    actions: &[BackupAction],
    out: &mut W,
) -> CliResult<usize> {
    let found = find_backup_files(root)?;

    for path in &found {
        for &action in actions {
            apply_action(action, path, out)?;
        }
    }

    info!("{} backup files under {}", found.len(), root.display());
    Ok(found.len())
}
