//! CRC-32 family reference kernel
//!
//! The init parameter is the reflected polynomial, so CRC-32 and CRC-32C
//! share one module.

use super::state::{StateReader, StateWriter};
use std::borrow::Cow;
use std::sync::OnceLock;

pub(super) const STATE_SIZE: usize = 8;
pub(super) const OUTPUT_LEN: usize = 4;

/// Reflected IEEE 802.3 polynomial, used when the init parameter is zero
pub const POLY_IEEE: u32 = 0xEDB88320;

/// Reflected Castagnoli polynomial
pub const POLY_CASTAGNOLI: u32 = 0x82F63B78;

fn build_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mut crc = i as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
        }
        *entry = crc;
    }
    table
}

/// Lookup table for `poly`; the two shipped polynomials are built once
fn table(poly: u32) -> Cow<'static, [u32; 256]> {
    static IEEE: OnceLock<[u32; 256]> = OnceLock::new();
    static CASTAGNOLI: OnceLock<[u32; 256]> = OnceLock::new();
    match poly {
        POLY_IEEE => Cow::Borrowed(IEEE.get_or_init(|| build_table(POLY_IEEE))),
        POLY_CASTAGNOLI => Cow::Borrowed(CASTAGNOLI.get_or_init(|| build_table(POLY_CASTAGNOLI))),
        other => Cow::Owned(build_table(other)),
    }
}

pub(super) fn init(state: &mut [u8], _buffer: &[u8], param: u32) {
    let poly = if param == 0 { POLY_IEEE } else { param };
    let mut writer = StateWriter::new(state);
    writer.u32(0xFFFF_FFFF);
    writer.u32(poly);
}

pub(super) fn update(state: &mut [u8], data: &[u8]) {
    let mut reader = StateReader::new(state);
    let mut crc = reader.u32();
    let poly = reader.u32();

    let table = table(poly);
    for &byte in data {
        crc = table[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }

    StateWriter::new(state).u32(crc);
}

pub(super) fn finalize(state: &mut [u8], out: &mut [u8], _param: u32) {
    let crc = StateReader::new(state).u32();
    out[..OUTPUT_LEN].copy_from_slice(&(!crc).to_be_bytes());
}
