use std::ops::RangeInclusive;

/// Bit helpers for 32-bit control registers.
/// Bit indices count from the lsb (bit 0) to the msb (bit 31).
pub trait Bits: Copy {
    fn get_bit(self, bit_idx: u8) -> bool;

    fn set_bit(&mut self, bit_idx: u8, value: bool);

    /// Extracts `bits_range` and shifts it down to bit 0.
    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self;

    /// Replaces `bits_range` with the low bits of `value`, leaving the rest untouched.
    fn set_bits(&mut self, bits_range: RangeInclusive<u8>, value: Self);
}

const fn field_mask(start: u8, end: u8) -> u32 {
    let length = end - start + 1;
    if length >= 32 {
        u32::MAX
    } else {
        ((1_u32 << length) - 1) << start
    }
}

impl Bits for u32 {
    fn get_bit(self, bit_idx: u8) -> bool {
        debug_assert!(bit_idx < 32);
        self & (1 << bit_idx) != 0
    }

    fn set_bit(&mut self, bit_idx: u8, value: bool) {
        debug_assert!(bit_idx < 32);
        if value {
            *self |= 1 << bit_idx;
        } else {
            *self &= !(1 << bit_idx);
        }
    }

    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self {
        let (start, end) = (*bits_range.start(), *bits_range.end());
        debug_assert!(start <= end && end < 32);
        (self & field_mask(start, end)) >> start
    }

    fn set_bits(&mut self, bits_range: RangeInclusive<u8>, value: Self) {
        let (start, end) = (*bits_range.start(), *bits_range.end());
        debug_assert!(start <= end && end < 32);
        let mask = field_mask(start, end);
        *self = (*self & !mask) | ((value << start) & mask);
    }
}
