//! Двоичная матрица для `gnuplot` (`binary matrix`).
//!
//! Матрица `(npts + 1) x (nspec + 1)` из `f32` LE, порядок по столбцам:
//!
//! ```text
//! [0, 0]      число точек npts
//! [1.., 0]    ось ppm
//! [0, 1..]    время начала каждого спектра
//! [1.., 1..]  действительная часть спектров
//! ```

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use tnt_types::{TntError, TntResult};

/// Записывает матрицу; `columns[j]` - срез спектра `j` той же длины, что `ppm`.
pub fn write_gnuplot_matrix<W: Write, C: AsRef<[f64]>>(
    writer: &mut W,
    ppm: &[f64],
    columns: &[C],
    times: &[f64],
) -> TntResult<()> {
    if times.len() < columns.len() {
        return Err(TntError::invalid_value(format!(
            "{} spectra but only {} timestamps",
            columns.len(),
            times.len()
        )));
    }

    if let Some((j, col)) = columns
        .iter()
        .enumerate()
        .find(|(_, c)| c.as_ref().len() != ppm.len())
    {
        return Err(TntError::invalid_value(format!(
            "spectrum {j} has {} points, axis has {}",
            col.as_ref().len(),
            ppm.len()
        )));
    }

    writer.write_f32::<LittleEndian>(ppm.len() as f32)?;
    for &p in ppm {
        writer.write_f32::<LittleEndian>(p as f32)?;
    }

    for (col, &t) in columns.iter().zip(times) {
        writer.write_f32::<LittleEndian>(t as f32)?;
        for &v in col.as_ref() {
            writer.write_f32::<LittleEndian>(v as f32)?;
        }
    }

    Ok(())
}
