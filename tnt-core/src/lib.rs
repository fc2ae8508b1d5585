//! Чтение файлов TecMag TNMR (`.tnt`) и обработка спектров ЯМР
//!
//! Разбор контейнера секций, структур параметров TMAG/TMG2, таблиц
//! задержек из импульсной последовательности и отображение отсчётов FID
//! в память; преобразование FID в спектр (LBfft) и оси частоты/ppm.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use tnt_core::{LbFft, TntFile};
//!
//! let tnt = TntFile::open("LiCl_ref1.tnt")?;
//! let lb = LbFft::from_processing(tnt.processing(), 1);
//! let spectrum = tnt.lb_fft(&lb, None, None)?;
//! let (i_max, i_min) = tnt.ppm_points(10.0, -10.0, Some(&spectrum));
//! println!("{} points in [-10, 10] ppm", i_min - i_max);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod array;
pub mod axis;
pub mod binary;
pub mod data;
pub mod delay;
pub mod dump;
pub mod export;
pub mod file;
pub mod format;
pub mod params;
pub mod schema;
pub mod spectrum;
pub mod time;

pub use array::*;
pub use binary::*;
pub use data::*;
pub use delay::*;
pub use dump::*;
pub use export::*;
pub use file::*;
pub use format::*;
pub use params::*;
pub use rustfft::num_complex::{Complex32, Complex64};
pub use schema::*;
pub use spectrum::*;
pub use time::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
