//! xxHash64 reference kernel
//!
//! Init reads the 64-bit little-endian seed from the start of the I/O
//! buffer; the init parameter is ignored.

use super::state::{BlockBuffer, StateReader, StateWriter};

pub(super) const STATE_SIZE: usize = 32 + 8 + BlockBuffer::<32>::ENCODED_LEN;
pub(super) const OUTPUT_LEN: usize = 8;

/// Seed width in bytes
pub const SEED_LEN: usize = 8;

const PRIME64_1: u64 = 0x9E3779B185EBCA87;
const PRIME64_2: u64 = 0xC2B2AE3D27D4EB4F;
const PRIME64_3: u64 = 0x165667B19E3779F9;
const PRIME64_4: u64 = 0x85EBCA77C2B2AE63;
const PRIME64_5: u64 = 0x27D4EB2F165667C5;

struct XxHash64State {
    lanes: [u64; 4],
    seed: u64,
    buffer: BlockBuffer<32>,
}

impl XxHash64State {
    fn read(state: &[u8]) -> Self {
        let mut reader = StateReader::new(state);
        Self {
            lanes: reader.words64(),
            seed: reader.u64(),
            buffer: BlockBuffer::read(&mut reader),
        }
    }

    fn write(&self, state: &mut [u8]) {
        let mut writer = StateWriter::new(state);
        writer.words64(&self.lanes);
        writer.u64(self.seed);
        self.buffer.write(&mut writer);
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word)
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline(always)]
fn round(acc: u64, input: u64) -> u64 {
    acc.wrapping_add(input.wrapping_mul(PRIME64_2))
        .rotate_left(31)
        .wrapping_mul(PRIME64_1)
}

#[inline(always)]
fn merge_round(acc: u64, lane: u64) -> u64 {
    (acc ^ round(0, lane))
        .wrapping_mul(PRIME64_1)
        .wrapping_add(PRIME64_4)
}

fn stripe(lanes: &mut [u64; 4], block: &[u8]) {
    for (lane, word) in lanes.iter_mut().zip(block.chunks_exact(8)) {
        *lane = round(*lane, read_u64(word));
    }
}

pub(super) fn init(state: &mut [u8], buffer: &[u8], _param: u32) {
    let seed = if buffer.len() >= SEED_LEN {
        read_u64(buffer)
    } else {
        0
    };

    XxHash64State {
        lanes: [
            seed.wrapping_add(PRIME64_1).wrapping_add(PRIME64_2),
            seed.wrapping_add(PRIME64_2),
            seed,
            seed.wrapping_sub(PRIME64_1),
        ],
        seed,
        buffer: BlockBuffer::new(),
    }
    .write(state);
}

pub(super) fn update(state: &mut [u8], data: &[u8]) {
    let mut s = XxHash64State::read(state);
    let lanes = &mut s.lanes;
    s.buffer.absorb(data, |block| stripe(lanes, block));
    s.write(state);
}

pub(super) fn finalize(state: &mut [u8], out: &mut [u8], _param: u32) {
    let s = XxHash64State::read(state);
    let total = s.buffer.total();

    let mut h = if total >= 32 {
        let [v1, v2, v3, v4] = s.lanes;
        let mut h = v1
            .rotate_left(1)
            .wrapping_add(v2.rotate_left(7))
            .wrapping_add(v3.rotate_left(12))
            .wrapping_add(v4.rotate_left(18));
        for lane in s.lanes {
            h = merge_round(h, lane);
        }
        h
    } else {
        s.seed.wrapping_add(PRIME64_5)
    };
    h = h.wrapping_add(total);

    let mut tail = s.buffer.pending();
    while tail.len() >= 8 {
        h ^= round(0, read_u64(tail));
        h = h.rotate_left(27).wrapping_mul(PRIME64_1).wrapping_add(PRIME64_4);
        tail = &tail[8..];
    }
    if tail.len() >= 4 {
        h ^= (read_u32(tail) as u64).wrapping_mul(PRIME64_1);
        h = h.rotate_left(23).wrapping_mul(PRIME64_2).wrapping_add(PRIME64_3);
        tail = &tail[4..];
    }
    for &byte in tail {
        h ^= (byte as u64).wrapping_mul(PRIME64_5);
        h = h.rotate_left(11).wrapping_mul(PRIME64_1);
    }

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME64_2);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME64_3);
    h ^= h >> 32;

    out[..OUTPUT_LEN].copy_from_slice(&h.to_be_bytes());
}
