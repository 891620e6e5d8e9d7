//! MSB-first bit packing for SWF bit fields (RECT and friends)

/// Accumulates values MSB-first into bytes, the way SWF bit fields are laid
/// out. Flushing pads the final partial byte with zero bits.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_pos: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            let bit = (value >> i) & 1;
            if self.bit_pos == 0 {
                self.bytes.push(0);
            }
            if bit != 0 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 1 << (7 - self.bit_pos);
            }
            self.bit_pos = (self.bit_pos + 1) % 8;
        }
    }

    /// Byte-align and return the packed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Minimum bit width that holds `value` as a signed field.
    pub fn signed_bits(value: i32) -> u8 {
        let magnitude = if value < 0 { !value as u32 } else { value as u32 };
        (32 - magnitude.leading_zeros() + 1) as u8
    }
}

/// Pack an axis-aligned rectangle (values in twips) as an SWF RECT.
pub fn pack_rect(xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> Vec<u8> {
    let nbits = [xmin, xmax, ymin, ymax]
        .iter()
        .map(|&v| BitWriter::signed_bits(v))
        .max()
        .unwrap_or(1);

    let mut bw = BitWriter::new();
    bw.write_bits(nbits as u32, 5);
    for v in [xmin, xmax, ymin, ymax] {
        bw.write_bits(v as u32, nbits);
    }
    bw.into_bytes()
}
