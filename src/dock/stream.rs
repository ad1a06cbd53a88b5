//! Big-endian primitives of the saved-layout format.

use super::persistence::LayoutPersistenceError;

/// Marks a null string or byte array in place of its length.
const NULL_LEN: u32 = 0xFFFF_FFFF;

#[derive(Debug, Default)]
pub(super) struct DataWriter {
    buf: Vec<u8>,
}

impl DataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_count(&mut self, count: usize) {
        self.write_i32(i32::try_from(count).unwrap_or(i32::MAX));
    }

    /// Byte length, then UTF-16 code units.
    pub fn write_string(&mut self, value: &str) {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_u32(u32::try_from(units.len() * 2).unwrap_or(NULL_LEN - 1));
        for unit in units {
            self.buf.extend_from_slice(&unit.to_be_bytes());
        }
    }

    pub fn write_bytes(&mut self, value: Option<&[u8]>) {
        match value {
            Some(bytes) => {
                self.write_u32(u32::try_from(bytes.len()).unwrap_or(NULL_LEN - 1));
                self.buf.extend_from_slice(bytes);
            }
            None => self.write_u32(NULL_LEN),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

pub(super) struct DataReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> DataReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], LayoutPersistenceError> {
        if len > self.remaining() {
            return Err(LayoutPersistenceError::Truncated {
                offset: self.offset,
                needed: len,
            });
        }
        let bytes = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], LayoutPersistenceError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> Result<u32, LayoutPersistenceError> {
        self.take_array().map(u32::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, LayoutPersistenceError> {
        self.take_array().map(i32::from_be_bytes)
    }

    /// A non-negative element count. Each element occupies at least `min_item_len` bytes, so
    /// a count the remaining input cannot hold is reported as truncation up front.
    pub fn read_count(&mut self, min_item_len: usize) -> Result<usize, LayoutPersistenceError> {
        let offset = self.offset;
        let count = self.read_i32()?;
        let Ok(count) = usize::try_from(count) else {
            return Err(LayoutPersistenceError::NegativeCount { offset, count });
        };
        let needed = count.saturating_mul(min_item_len);
        if needed > self.remaining() {
            return Err(LayoutPersistenceError::Truncated {
                offset: self.offset,
                needed,
            });
        }
        Ok(count)
    }

    /// A null string reads as empty.
    pub fn read_string(&mut self) -> Result<String, LayoutPersistenceError> {
        let offset = self.offset;
        let len = self.read_u32()?;
        if len == NULL_LEN {
            return Ok(String::new());
        }
        if len % 2 != 0 {
            return Err(LayoutPersistenceError::InvalidString { offset });
        }
        let bytes = self.take(len as usize)?;
        let units = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        let Ok(value) = char::decode_utf16(units).collect::<Result<String, _>>() else {
            return Err(LayoutPersistenceError::InvalidString { offset });
        };
        Ok(value)
    }

    pub fn read_bytes(&mut self) -> Result<Option<&'a [u8]>, LayoutPersistenceError> {
        let len = self.read_u32()?;
        if len == NULL_LEN {
            return Ok(None);
        }
        self.take(len as usize).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_utf16_big_endian() {
        let mut out = DataWriter::new();
        out.write_string("Aé");
        assert_eq!(out.finish(), [0, 0, 0, 4, 0x00, 0x41, 0x00, 0xE9]);
    }

    #[test]
    fn reads_what_was_written() {
        let mut out = DataWriter::new();
        out.write_u32(0x1337);
        out.write_i32(-1);
        out.write_string("tab 🦀");
        out.write_bytes(Some(&[1, 2, 3]));
        out.write_bytes(None);
        let bytes = out.finish();

        let mut input = DataReader::new(&bytes);
        assert_eq!(input.read_u32().unwrap(), 0x1337);
        assert_eq!(input.read_i32().unwrap(), -1);
        assert_eq!(input.read_string().unwrap(), "tab 🦀");
        assert_eq!(input.read_bytes().unwrap(), Some(&[1u8, 2, 3][..]));
        assert_eq!(input.read_bytes().unwrap(), None);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn null_string_reads_as_empty() {
        let bytes = NULL_LEN.to_be_bytes();
        assert_eq!(DataReader::new(&bytes).read_string().unwrap(), "");
    }

    #[test]
    fn malformed_input_is_rejected() {
        let mut input = DataReader::new(&[0, 0]);
        assert_eq!(
            input.read_u32(),
            Err(LayoutPersistenceError::Truncated {
                offset: 0,
                needed: 4
            })
        );

        let bytes = (-3i32).to_be_bytes();
        assert_eq!(
            DataReader::new(&bytes).read_count(4),
            Err(LayoutPersistenceError::NegativeCount {
                offset: 0,
                count: -3
            })
        );

        let bytes = 1000i32.to_be_bytes();
        assert!(matches!(
            DataReader::new(&bytes).read_count(4),
            Err(LayoutPersistenceError::Truncated { .. })
        ));

        // Odd byte length.
        let bytes = [0, 0, 0, 3, 0, 0x41, 0];
        assert_eq!(
            DataReader::new(&bytes).read_string(),
            Err(LayoutPersistenceError::InvalidString { offset: 0 })
        );

        // Lone surrogate.
        let bytes = [0, 0, 0, 2, 0xD8, 0x00];
        assert_eq!(
            DataReader::new(&bytes).read_string(),
            Err(LayoutPersistenceError::InvalidString { offset: 0 })
        );
    }
}
