//! Big-endian byte stream for TrueType/OpenType data.
//!
//! [`BinaryStream`] is a growable buffer with two independent positions:
//! writes always append to the end, while reads go through an explicit
//! cursor that can be moved with [`BinaryStream::set_pos`].
//!
//! The numeric encodings follow the OpenType data types:
//!
//! | type         | width | method                                   |
//! |--------------|-------|------------------------------------------|
//! | BYTE / CHAR  | 8     | `write_byte` / `write_char`              |
//! | USHORT/SHORT | 16    | `write_ushort` / `write_short`           |
//! | UINT24       | 24    | `write_uint24`                           |
//! | ULONG / LONG | 32    | `write_ulong` / `write_long`             |
//! | Fixed        | 32    | `write_fixed`                            |
//! | FWORD/UFWORD | 16    | `write_fword` / `write_ufword`           |
//! | F2DOT14      | 16    | `write_f2dot14`                          |
//! | LONGDATETIME | 64    | `write_date_time`                        |
//!
//! Reading is lenient: every byte read past the end of the buffer yields 0,
//! so a truncated table decodes as zero-filled rather than failing.

mod fixed;

pub use fixed::Fixed;
pub use font_types::{F2Dot14, LongDateTime, Uint24};

/// A big-endian byte buffer with an append-only writer and a seekable reader.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BinaryStream {
    data: Vec<u8>,
    read_pos: usize,
}

impl BinaryStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity), read_pos: 0 }
    }

    /// Create a stream over a copy of `data`, with the read cursor at 0.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into(), read_pos: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read cursor.
    pub fn pos(&self) -> usize {
        self.read_pos
    }

    /// Move the read cursor. Positions past the end are allowed; reads from
    /// there return 0.
    pub fn set_pos(&mut self, pos: usize) {
        self.read_pos = pos;
    }

    /// Bytes left between the read cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.read_pos)
    }

    // ---------------------------------------------------------------------
    // writing

    pub fn write_byte(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_char(&mut self, value: i8) {
        self.data.push(value as u8);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_ushort(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_short(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_fword(&mut self, value: i16) {
        self.write_short(value);
    }

    pub fn write_ufword(&mut self, value: u16) {
        self.write_ushort(value);
    }

    pub fn write_uint24(&mut self, value: Uint24) {
        let value = u32::from(value);
        self.data.extend_from_slice(&value.to_be_bytes()[1..]);
    }

    pub fn write_ulong(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_long(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a 16.16 value as its high half followed by its low half.
    pub fn write_fixed(&mut self, value: Fixed) {
        self.write_short(value.high);
        self.write_short(value.low);
    }

    pub fn write_f2dot14(&mut self, value: F2Dot14) {
        self.write_short(value.to_bits());
    }

    /// Write seconds since 1904-01-01 as a signed 64-bit value.
    pub fn write_date_time(&mut self, value: LongDateTime) {
        let secs = value.as_secs();
        self.write_ulong((secs >> 32) as u32);
        self.write_ulong(secs as u32);
    }

    /// Append zero bytes until the length is a multiple of `alignment`.
    pub fn pad_to(&mut self, alignment: usize) {
        if alignment > 1 {
            let rem = self.data.len() % alignment;
            if rem != 0 {
                self.data.resize(self.data.len() + alignment - rem, 0);
            }
        }
    }

    /// Overwrite two bytes at `offset`. Does nothing if the range is out of bounds.
    pub fn set_ushort_at(&mut self, offset: usize, value: u16) {
        if let Some(slot) = self.data.get_mut(offset..offset + 2) {
            slot.copy_from_slice(&value.to_be_bytes());
        }
    }

    /// Overwrite four bytes at `offset`. Does nothing if the range is out of bounds.
    pub fn set_ulong_at(&mut self, offset: usize, value: u32) {
        if let Some(slot) = self.data.get_mut(offset..offset + 4) {
            slot.copy_from_slice(&value.to_be_bytes());
        }
    }

    // ---------------------------------------------------------------------
    // reading

    pub fn read_byte(&mut self) -> u8 {
        let byte = self.data.get(self.read_pos).copied().unwrap_or(0);
        self.read_pos = self.read_pos.saturating_add(1);
        byte
    }

    pub fn read_char(&mut self) -> i8 {
        self.read_byte() as i8
    }

    pub fn read_ushort(&mut self) -> u16 {
        u16::from_be_bytes(self.read_array())
    }

    pub fn read_short(&mut self) -> i16 {
        i16::from_be_bytes(self.read_array())
    }

    pub fn read_fword(&mut self) -> i16 {
        self.read_short()
    }

    pub fn read_ufword(&mut self) -> u16 {
        self.read_ushort()
    }

    pub fn read_uint24(&mut self) -> Uint24 {
        let [a, b, c] = self.read_array();
        Uint24::new(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn read_ulong(&mut self) -> u32 {
        u32::from_be_bytes(self.read_array())
    }

    pub fn read_long(&mut self) -> i32 {
        i32::from_be_bytes(self.read_array())
    }

    /// Read a 16.16 value.
    ///
    /// Each half is masked to its low 8 bits, so only values whose integer
    /// and fractional parts both fit in a byte survive a round trip.
    pub fn read_fixed(&mut self) -> Fixed {
        let bits = self.read_long();
        Fixed {
            high: ((bits >> 16) & 0xff) as i16,
            low: (bits & 0xff) as i16,
        }
    }

    pub fn read_f2dot14(&mut self) -> F2Dot14 {
        F2Dot14::from_bits(self.read_short())
    }

    pub fn read_date_time(&mut self) -> LongDateTime {
        let high = self.read_ulong() as i64;
        let low = self.read_ulong() as i64;
        LongDateTime::new((high << 32) | low)
    }

    /// Read `len` bytes as text. Bytes past the end are dropped and the
    /// cursor still advances by `len`.
    pub fn read_string(&mut self, len: usize) -> String {
        let start = self.read_pos.min(self.data.len());
        let end = self.read_pos.saturating_add(len).min(self.data.len());
        let text = String::from_utf8_lossy(&self.data[start..end]).into_owned();
        self.read_pos = self.read_pos.saturating_add(len);
        text
    }

    fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        for byte in &mut out {
            *byte = self.read_byte();
        }
        out
    }
}

impl From<Vec<u8>> for BinaryStream {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl From<&[u8]> for BinaryStream {
    fn from(data: &[u8]) -> Self {
        Self::from_bytes(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_big_endian() {
        let mut s = BinaryStream::new();
        s.write_ushort(0x1234);
        s.write_short(-2);
        s.write_uint24(Uint24::new(0x00ab_cdef));
        s.write_ulong(0xdead_beef);
        s.write_long(-1);
        assert_eq!(
            s.as_bytes(),
            &[0x12, 0x34, 0xff, 0xfe, 0xab, 0xcd, 0xef, 0xde, 0xad, 0xbe, 0xef, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn read_cursor_is_independent_of_writes() {
        let mut s = BinaryStream::new();
        s.write_ushort(7);
        assert_eq!(s.read_ushort(), 7);
        s.write_ushort(9);
        assert_eq!(s.pos(), 2);
        assert_eq!(s.read_ushort(), 9);
        s.set_pos(0);
        assert_eq!(s.read_ulong(), 0x0007_0009);
    }

    #[test]
    fn reading_past_end_yields_zero() {
        let mut s = BinaryStream::from_bytes(vec![0x01]);
        assert_eq!(s.read_ushort(), 0x0100);
        assert_eq!(s.read_ulong(), 0);
        assert_eq!(s.read_byte(), 0);
        assert_eq!(s.remaining(), 0);
    }

    #[test]
    fn signed_reads_sign_extend() {
        let mut s = BinaryStream::from_bytes(vec![0xff, 0x9c, 0x80, 0x00, 0x00, 0x00]);
        assert_eq!(s.read_short(), -100);
        assert_eq!(s.read_long(), i32::MIN);
    }

    #[test]
    fn uint24_round_trip() {
        let mut s = BinaryStream::new();
        s.write_uint24(Uint24::new(0x0001_0203));
        assert_eq!(s.len(), 3);
        assert_eq!(u32::from(s.read_uint24()), 0x0001_0203);
    }

    #[test]
    fn fixed_read_masks_each_half_to_a_byte() {
        let mut s = BinaryStream::new();
        s.write_fixed(Fixed::new(1, 0));
        s.write_long(0x0123_4567);
        assert_eq!(&s.as_bytes()[..4], &[0, 1, 0, 0]);
        assert_eq!(s.read_fixed(), Fixed::new(1, 0));
        assert_eq!(s.read_fixed(), Fixed::new(0x23, 0x67));
    }

    #[test]
    fn f2dot14_and_datetime() {
        let mut s = BinaryStream::new();
        s.write_f2dot14(F2Dot14::from_f32(-0.5));
        s.write_date_time(LongDateTime::new(0x0000_0001_0000_0002));
        assert_eq!(s.read_f2dot14().to_f32(), -0.5);
        assert_eq!(s.read_date_time().as_secs(), 0x0000_0001_0000_0002);
    }

    #[test]
    fn read_string_is_lenient() {
        let mut s = BinaryStream::from_bytes(b"\x04glyf".to_vec());
        let len = s.read_byte() as usize;
        assert_eq!(s.read_string(len), "glyf");
        s.set_pos(1);
        assert_eq!(s.read_string(10), "glyf");
        assert_eq!(s.pos(), 11);
    }

    #[test]
    fn padding_and_patching() {
        let mut s = BinaryStream::new();
        s.write_bytes(&[1, 2, 3]);
        s.pad_to(4);
        assert_eq!(s.as_bytes(), &[1, 2, 3, 0]);
        s.set_ushort_at(0, 0xabcd);
        s.set_ulong_at(2, 0x1122_3344);
        assert_eq!(s.as_bytes(), &[0xab, 0xcd, 3, 0]);
        s.set_ulong_at(0, 0x1122_3344);
        assert_eq!(s.as_bytes(), &[0x11, 0x22, 0x33, 0x44]);
    }
}
