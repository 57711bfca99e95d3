//! Byte-level state encoding shared by the reference kernels
//!
//! Kernels never hold state in Rust values between calls: every export
//! decodes the state region, does its work and encodes it back, so the
//! region alone is a complete snapshot.

/// Sequential little-endian reader over a state region
pub(super) struct StateReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    pub(super) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(super) fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    pub(super) fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }

    pub(super) fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.array())
    }

    pub(super) fn words<const N: usize>(&mut self) -> [u32; N] {
        let mut out = [0u32; N];
        for word in out.iter_mut() {
            *word = self.u32();
        }
        out
    }

    pub(super) fn words64<const N: usize>(&mut self) -> [u64; N] {
        let mut out = [0u64; N];
        for word in out.iter_mut() {
            *word = self.u64();
        }
        out
    }
}

/// Sequential little-endian writer over a state region
pub(super) struct StateWriter<'a> {
    bytes: &'a mut [u8],
    pos: usize,
}

impl<'a> StateWriter<'a> {
    pub(super) fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(super) fn bytes(&mut self, data: &[u8]) {
        self.bytes[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
    }

    pub(super) fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    pub(super) fn u64(&mut self, value: u64) {
        self.bytes(&value.to_le_bytes());
    }

    pub(super) fn words(&mut self, words: &[u32]) {
        for &word in words {
            self.u32(word);
        }
    }

    pub(super) fn words64(&mut self, words: &[u64]) {
        for &word in words {
            self.u64(word);
        }
    }
}

/// Partial-block buffer for block-oriented kernels
pub(super) struct BlockBuffer<const N: usize> {
    block: [u8; N],
    filled: usize,
    total: u64,
}

impl<const N: usize> BlockBuffer<N> {
    /// Encoded size: block, fill level, total length
    pub(super) const ENCODED_LEN: usize = N + 4 + 8;

    pub(super) fn new() -> Self {
        Self {
            block: [0u8; N],
            filled: 0,
            total: 0,
        }
    }

    pub(super) fn read(reader: &mut StateReader<'_>) -> Self {
        let block = reader.array::<N>();
        // A hand-crafted snapshot must not push the fill level past the block
        let filled = (reader.u32() as usize).min(N - 1);
        let total = reader.u64();
        Self { block, filled, total }
    }

    pub(super) fn write(&self, writer: &mut StateWriter<'_>) {
        writer.bytes(&self.block);
        writer.u32(self.filled as u32);
        writer.u64(self.total);
    }

    /// Total bytes absorbed so far
    pub(super) fn total(&self) -> u64 {
        self.total
    }

    /// Bytes waiting for a full block
    pub(super) fn pending(&self) -> &[u8] {
        &self.block[..self.filled]
    }

    /// Absorb input, calling `compress` for every complete block
    pub(super) fn absorb(&mut self, mut data: &[u8], mut compress: impl FnMut(&[u8])) {
        self.total = self.total.wrapping_add(data.len() as u64);

        if self.filled > 0 {
            let take = (N - self.filled).min(data.len());
            self.block[self.filled..self.filled + take].copy_from_slice(&data[..take]);
            self.filled += take;
            data = &data[take..];
            if self.filled < N {
                return;
            }
            compress(&self.block);
            self.filled = 0;
        }

        let mut blocks = data.chunks_exact(N);
        for block in &mut blocks {
            compress(block);
        }
        let rest = blocks.remainder();
        self.block[..rest.len()].copy_from_slice(rest);
        self.filled = rest.len();
    }

    /// Merkle-Damgard padding: 0x80, zeros, then the encoded bit length
    pub(super) fn pad(&mut self, length: [u8; 8], mut compress: impl FnMut(&[u8])) {
        self.block[self.filled] = 0x80;
        self.filled += 1;

        if self.filled > N - 8 {
            self.block[self.filled..].fill(0);
            compress(&self.block);
            self.filled = 0;
        }

        self.block[self.filled..N - 8].fill(0);
        self.block[N - 8..].copy_from_slice(&length);
        compress(&self.block);
        self.filled = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_buffer_emits_whole_blocks() {
        let mut buffer = BlockBuffer::<4>::new();
        let mut blocks = Vec::new();

        buffer.absorb(b"ab", |b| blocks.push(b.to_vec()));
        assert!(blocks.is_empty());
        assert_eq!(buffer.pending(), b"ab");

        buffer.absorb(b"cdefghij", |b| blocks.push(b.to_vec()));
        assert_eq!(blocks, vec![b"abcd".to_vec(), b"efgh".to_vec()]);
        assert_eq!(buffer.pending(), b"ij");
        assert_eq!(buffer.total(), 10);
    }

    #[test]
    fn test_block_buffer_state_roundtrip() {
        let mut buffer = BlockBuffer::<8>::new();
        buffer.absorb(b"hello", |_| {});

        let mut region = vec![0u8; BlockBuffer::<8>::ENCODED_LEN];
        buffer.write(&mut StateWriter::new(&mut region));
        let restored = BlockBuffer::<8>::read(&mut StateReader::new(&region));

        assert_eq!(restored.pending(), b"hello");
        assert_eq!(restored.total(), 5);
    }
}
