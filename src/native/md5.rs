//! MD5 reference kernel

use super::state::{BlockBuffer, StateReader, StateWriter};

pub(super) const STATE_SIZE: usize = 16 + BlockBuffer::<64>::ENCODED_LEN;
pub(super) const OUTPUT_LEN: usize = 16;

const IV: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

const SHIFTS: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22,
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20,
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23,
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

const K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed, 0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

struct Md5State {
    h: [u32; 4],
    buffer: BlockBuffer<64>,
}

impl Md5State {
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

fn compress(h: &mut [u32; 4], block: &[u8]) {
    let mut m = [0u32; 16];
    for (word, bytes) in m.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *h;
    for i in 0..64 {
        let (f, g) = match i / 16 {
            0 => ((b & c) | (!b & d), i),
            1 => ((d & b) | (!d & c), (5 * i + 1) % 16),
            2 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };
        let f = f.wrapping_add(a).wrapping_add(K[i]).wrapping_add(m[g]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(f.rotate_left(SHIFTS[i]));
    }

    h[0] = h[0].wrapping_add(a);
    h[1] = h[1].wrapping_add(b);
    h[2] = h[2].wrapping_add(c);
    h[3] = h[3].wrapping_add(d);
}

pub(super) fn init(state: &mut [u8], _buffer: &[u8], _param: u32) {
    Md5State {
        h: IV,
        buffer: BlockBuffer::new(),
    }
    .write(state);
}

pub(super) fn update(state: &mut [u8], data: &[u8]) {
    let mut s = Md5State::read(state);
    let h = &mut s.h;
    s.buffer.absorb(data, |block| compress(h, block));
    s.write(state);
}

pub(super) fn finalize(state: &mut [u8], out: &mut [u8], _param: u32) {
    let mut s = Md5State::read(state);
    let bits = s.buffer.total().wrapping_mul(8);
    let h = &mut s.h;
    s.buffer.pad(bits.to_le_bytes(), |block| compress(h, block));
    for (chunk, word) in out[..OUTPUT_LEN].chunks_exact_mut(4).zip(s.h.iter()) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    s.write(state);
}
