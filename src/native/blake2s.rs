//! BLAKE2s reference kernel
//!
//! Init parameter layout: output bits in the low 16 bits, key length in
//! bytes above them. A keyed init reads the key from the start of the I/O
//! buffer, so the key must be staged there before `init`.

use super::state::{StateReader, StateWriter};

pub(super) const STATE_SIZE: usize = 32 + 8 + 64 + 4 + 4;
pub(super) const OUTPUT_LEN: usize = 32;

/// Longest key BLAKE2s accepts
pub const MAX_KEY_LEN: usize = 32;

const BLOCK_LEN: usize = 64;

const IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

/// Pack output bits and key length into an init parameter
pub fn init_param(output_bits: u32, key_len: usize) -> u32 {
    output_bits | ((key_len as u32) << 16)
}

struct Blake2sState {
    h: [u32; 8],
    counter: u64,
    block: [u8; BLOCK_LEN],
    filled: usize,
    out_len: usize,
}

impl Blake2sState {
    fn read(state: &[u8]) -> Self {
        let mut reader = StateReader::new(state);
        let h = reader.words();
        let counter = reader.u64();
        let block = reader.array();
        let filled = (reader.u32() as usize).min(BLOCK_LEN);
        let out_len = (reader.u32() as usize).clamp(1, OUTPUT_LEN);
        Self {
            h,
            counter,
            block,
            filled,
            out_len,
        }
    }

    fn write(&self, state: &mut [u8]) {
        let mut writer = StateWriter::new(state);
        writer.words(&self.h);
        writer.u64(self.counter);
        writer.bytes(&self.block);
        writer.u32(self.filled as u32);
        writer.u32(self.out_len as u32);
    }

    fn compress(&mut self, last: bool) {
        let mut m = [0u32; 16];
        for (word, bytes) in m.iter_mut().zip(self.block.chunks_exact(4)) {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        let mut v = [0u32; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..].copy_from_slice(&IV);
        v[12] ^= self.counter as u32;
        v[13] ^= (self.counter >> 32) as u32;
        if last {
            v[14] = !v[14];
        }

        for s in SIGMA.iter() {
            g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
            g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
            g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
            g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
            g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
            g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
            g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
            g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
        }

        for i in 0..8 {
            self.h[i] ^= v[i] ^ v[i + 8];
        }
    }
}

#[inline(always)]
fn g(v: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize, x: u32, y: u32) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(12);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(8);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(7);
}

pub(super) fn init(state: &mut [u8], buffer: &[u8], param: u32) {
    let bits = param & 0xFFFF;
    let out_len = if bits == 0 {
        OUTPUT_LEN
    } else {
        ((bits / 8) as usize).clamp(1, OUTPUT_LEN)
    };
    let key_len = ((param >> 16) as usize).min(MAX_KEY_LEN).min(buffer.len());

    let mut h = IV;
    h[0] ^= 0x0101_0000 ^ ((key_len as u32) << 8) ^ out_len as u32;

    let mut s = Blake2sState {
        h,
        counter: 0,
        block: [0u8; BLOCK_LEN],
        filled: 0,
        out_len,
    };

    // The padded key is the first message block
    if key_len > 0 {
        s.block[..key_len].copy_from_slice(&buffer[..key_len]);
        s.filled = BLOCK_LEN;
    }

    s.write(state);
}

pub(super) fn update(state: &mut [u8], mut data: &[u8]) {
    let mut s = Blake2sState::read(state);

    // The final block is held back until finalize sets the last-block flag
    while !data.is_empty() {
        if s.filled == BLOCK_LEN {
            s.counter = s.counter.wrapping_add(BLOCK_LEN as u64);
            s.compress(false);
            s.filled = 0;
        }
        let take = (BLOCK_LEN - s.filled).min(data.len());
        s.block[s.filled..s.filled + take].copy_from_slice(&data[..take]);
        s.filled += take;
        data = &data[take..];
    }

    s.write(state);
}

pub(super) fn finalize(state: &mut [u8], out: &mut [u8], _param: u32) {
    let mut s = Blake2sState::read(state);
    s.counter = s.counter.wrapping_add(s.filled as u64);
    s.block[s.filled..].fill(0);
    s.compress(true);

    let mut digest = [0u8; OUTPUT_LEN];
    for (chunk, word) in digest.chunks_exact_mut(4).zip(s.h.iter()) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out[..OUTPUT_LEN].fill(0);
    out[..s.out_len].copy_from_slice(&digest[..s.out_len]);
    s.filled = 0;
    s.write(state);
}
