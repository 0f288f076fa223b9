use super::error::DecodeError;
use super::layout;

pub struct HexReader<'a> {
    text: &'a str,
}

impl<'a> HexReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn require_len(&self, expected: usize) -> Result<(), DecodeError> {
        let actual = self.text.chars().count();
        if actual != expected {
            return Err(DecodeError::InvalidLength { expected, actual });
        }
        Ok(())
    }

    /// Rejects the first non-hex character before any byte is read.
    pub fn require_hex(&self) -> Result<(), DecodeError> {
        match self
            .text
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_hexdigit())
        {
            Some((position, found)) => Err(DecodeError::InvalidHex { position, found }),
            None => Ok(()),
        }
    }

    pub fn read_byte(&self, index: usize) -> Result<u8, DecodeError> {
        let start = index * 2;
        let pair = self
            .text
            .get(start..start + 2)
            .ok_or(DecodeError::InvalidLength {
                expected: start + 2,
                actual: self.text.len(),
            })?;
        let hi = nibble(pair.as_bytes()[0], start)?;
        let lo = nibble(pair.as_bytes()[1], start + 1)?;
        Ok((hi << 4) | lo)
    }

    pub fn read_tile_bytes(&self) -> Result<[u8; layout::TILE_BYTES], DecodeError> {
        self.require_len(layout::TILE_HEX_LEN)?;
        self.require_hex()?;
        let mut bytes = [0u8; layout::TILE_BYTES];
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_byte(index)?;
        }
        Ok(bytes)
    }
}

fn nibble(digit: u8, position: usize) -> Result<u8, DecodeError> {
    (digit as char)
        .to_digit(16)
        .map(|value| value as u8)
        .ok_or(DecodeError::InvalidHex {
            position,
            found: digit as char,
        })
}
