//! MSB-first bit packing for entropy-coded segments.

use crate::jpeg_marker_code::{JPEG_MARKER_START_BYTE, JpegMarkerCode};

/// Appends entropy-coded bits to a byte vector, stuffing a zero byte after
/// every emitted 0xFF.
pub struct JpegBitWriter<'a> {
    destination: &'a mut Vec<u8>,
    bit_buffer: u32,
    bits_in_buffer: u32,
}

impl<'a> JpegBitWriter<'a> {
    pub fn new(destination: &'a mut Vec<u8>) -> Self {
        Self {
            destination,
            bit_buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Writes the low `length` bits of `value`, most significant first.
    #[inline]
    pub fn write_bits(&mut self, value: u16, length: u8) {
        if length == 0 {
            return;
        }
        let length = length as u32;
        let mask = (1u32 << length) - 1;
        self.bit_buffer = (self.bit_buffer << length) | (value as u32 & mask);
        self.bits_in_buffer += length;

        while self.bits_in_buffer >= 8 {
            let shift = self.bits_in_buffer - 8;
            let byte = ((self.bit_buffer >> shift) & 0xFF) as u8;
            self.emit_byte(byte);
            self.bits_in_buffer = shift;
            self.bit_buffer &= (1u32 << shift) - 1;
        }
    }

    #[inline]
    fn emit_byte(&mut self, byte: u8) {
        self.destination.push(byte);
        if byte == JPEG_MARKER_START_BYTE {
            self.destination.push(0x00);
        }
    }

    /// Pads the last partial byte with 1-bits.
    pub fn flush(&mut self) {
        if self.bits_in_buffer > 0 {
            let pad_bits = 8 - self.bits_in_buffer;
            let value = (1u32 << pad_bits) - 1;
            self.write_bits(value as u16, pad_bits as u8);
        }
    }

    /// Flushes and then emits a marker without stuffing (used for RSTn).
    pub fn write_marker(&mut self, marker: JpegMarkerCode) {
        self.flush();
        self.destination.push(JPEG_MARKER_START_BYTE);
        self.destination.push(marker.into());
    }

    /// Total bytes in the destination, including anything written before.
    pub fn len(&self) -> usize {
        self.destination.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destination.is_empty()
    }
}
