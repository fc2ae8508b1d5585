use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use log::{error, info};
use tnt_cli::{run_backups, run_fft, write_dump, write_info, BackupAction, CliResult, FftConfig};
use tnt_core::TntFile;

#[derive(Parser, Debug)]
#[command(
    name = "tnt",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and process TecMag TNMR (.tnt) files",
    long_about = None,
)]
struct Cli {
    /// Тихий режим (только ошибки)
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Сводка о файле
    Info {
        /// Файл .tnt
        file: PathBuf,
    },
    /// Параметры TMAG/TMG2
    Dump {
        /// Файл .tnt
        file: PathBuf,
        /// Вывод в JSON
        #[arg(long)]
        json: bool,
        /// Файл для вывода (по умолчанию stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Спектр (LBfft) в матрицу gnuplot
    Fft {
        /// Файл .tnt
        file: PathBuf,
        /// Уширение линии, Гц (по умолчанию из файла)
        #[arg(long)]
        lb: Option<f64>,
        /// Степень дополнения нулями
        #[arg(long, default_value = "0")]
        zf: u32,
        /// Фаза 0-го порядка, градусы
        #[arg(long, allow_hyphen_values = true)]
        phase: Option<f64>,
        /// Фаза 1-го порядка, градусы
        #[arg(long, allow_hyphen_values = true)]
        ph1: Option<f64>,
        /// Автоматическая фазировка
        #[arg(long)]
        auto_phase: bool,
        /// Не использовать параметры обработки из файла
        #[arg(long)]
        ignore_stored: bool,
        /// Верхняя граница, ppm
        #[arg(long, allow_hyphen_values = true)]
        max_ppm: Option<f64>,
        /// Нижняя граница, ppm
        #[arg(long, allow_hyphen_values = true)]
        min_ppm: Option<f64>,
        /// Путь к матрице gnuplot
        #[arg(short, long, default_value = "spectrum.gpt")]
        output: PathBuf,
    },
    /// Поиск резервных копий TNMR (`*_N.tnt`)
    Backups {
        /// Каталог для поиска
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Действие: print, basename, delete, gitrm, svnrm (можно несколько)
        #[arg(short, long = "action")]
        actions: Vec<BackupAction>,
    },
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Info { file } => {
            let tnt = TntFile::open(&file)?;
            write_info(&mut io::stdout().lock(), &tnt)?;
        }
        Command::Dump { file, json, output } => {
            let tnt = TntFile::open(&file)?;
            match output {
                Some(path) => {
                    let mut out = BufWriter::new(File::create(&path)?);
                    write_dump(&mut out, &tnt, json)?;
                    out.flush()?;
                    info!("parameters written to {}", path.display());
                }
                None => write_dump(&mut io::stdout().lock(), &tnt, json)?,
            }
        }
        Command::Fft {
            file,
            lb,
            zf,
            phase,
            ph1,
            auto_phase,
            ignore_stored,
            max_ppm,
            min_ppm,
            output,
        } => {
            let defaults = FftConfig::default();
            let config = FftConfig {
                line_broadening: lb,
                zero_fill: zf,
                phase_deg: phase,
                ph1_deg: ph1,
                auto_phase,
                use_stored: !ignore_stored,
                max_ppm: max_ppm.unwrap_or(defaults.max_ppm),
                min_ppm: min_ppm.unwrap_or(defaults.min_ppm),
                output_path: output,
            };
            let npts = run_fft(&file, &config)?;
            info!("{npts} points written to {}", config.output_path.display());
        }
        Command::Backups { path, actions } => {
            let actions = if actions.is_empty() {
                vec![BackupAction::Print]
            } else {
                actions
            };
            run_backups(&path, &actions, &mut io::stdout().lock())?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    if let Err(e) = run(cli.command) {
        error!("{e}");
        std::process::exit(1);
    }
}
