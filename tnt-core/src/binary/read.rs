use byteorder::{ByteOrder, LittleEndian};

// Все чтения little-endian, `off` сдвигается на размер прочитанного.

pub fn read_i16_le(
    buf: &[u8],
    off: &mut usize,
) -> i16 {
    let v = LittleEndian::read_i16(&buf[*off..*off + 2]);
    *off += 2;
    v
}

pub fn read_u16_le(
    buf: &[u8],
    off: &mut usize,
) -> u16 {
    let v = LittleEndian::read_u16(&buf[*off..*off + 2]);
    *off += 2;
    v
}

pub fn read_i32_le(
    buf: &[u8],
    off: &mut usize,
) -> i32 {
    let v = LittleEndian::read_i32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_u32_le(
    buf: &[u8],
    off: &mut usize,
) -> u32 {
    let v = LittleEndian::read_u32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_f32_le(
    buf: &[u8],
    off: &mut usize,
) -> f32 {
    let v = LittleEndian::read_f32(&buf[*off..*off + 4]);
    *off += 4;
    v
}

pub fn read_f64_le(
    buf: &[u8],
    off: &mut usize,
) -> f64 {
    let v = LittleEndian::read_f64(&buf[*off..*off + 8]);
    *off += 8;
    v
}

/// Строка фиксированной длины: обрезается по первому нулю, Latin-1.
pub fn read_latin1(
    buf: &[u8],
    off: &mut usize,
    len: usize,
) -> String {
    let raw = &buf[*off..*off + len];
    *off += len;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..end].iter().map(|&b| b as char).collect()
}
