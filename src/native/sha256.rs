//! SHA-224 / SHA-256 reference kernel
//!
//! The init parameter selects the variant (224, or 256 / 0 for SHA-256).
//! Block compression comes from the `sha2` crate.

use super::state::{BlockBuffer, StateReader, StateWriter};
use sha2::digest::generic_array::GenericArray;

pub(super) const STATE_SIZE: usize = 32 + BlockBuffer::<64>::ENCODED_LEN;
pub(super) const OUTPUT_LEN: usize = 32;

const IV_256: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const IV_224: [u32; 8] = [
    0xc1059ed8, 0x367cd507, 0x3070dd17, 0xf70e5939, 0xffc00b31, 0x68581511, 0x64f98fa7, 0xbefa4fa4,
];

struct Sha256State {
    h: [u32; 8],
    buffer: BlockBuffer<64>,
}

impl Sha256State {
    fn read(state: &[u8]) -> Self {
        let mut reader = StateReader::new(state);
        Self {
            h: reader.words(),
            buffer: BlockBuffer::read(&mut reader),
        }
    }

    fn write(&self, state: &mut [u8]) {
        let mut writer = StateWriter::new(state);
        writer.words(&self.h);
        self.buffer.write(&mut writer);
    }
}

fn compress(h: &mut [u32; 8], block: &[u8]) {
    sha2::compress256(h, &[GenericArray::clone_from_slice(block)]);
}

pub(super) fn init(state: &mut [u8], _buffer: &[u8], param: u32) {
    let h = if param == 224 { IV_224 } else { IV_256 };
    Sha256State {
        h,
        buffer: BlockBuffer::new(),
    }
    .write(state);
}

pub(super) fn update(state: &mut [u8], data: &[u8]) {
    let mut s = Sha256State::read(state);
    let h = &mut s.h;
    s.buffer.absorb(data, |block| compress(h, block));
    s.write(state);
}

pub(super) fn finalize(state: &mut [u8], out: &mut [u8], _param: u32) {
    let mut s = Sha256State::read(state);
    let bits = s.buffer.total().wrapping_mul(8);
    let h = &mut s.h;
    s.buffer.pad(bits.to_be_bytes(), |block| compress(h, block));
    for (chunk, word) in out[..OUTPUT_LEN].chunks_exact_mut(4).zip(s.h.iter()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    s.write(state);
}
