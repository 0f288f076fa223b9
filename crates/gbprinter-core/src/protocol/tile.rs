use super::error::DecodeError;
use super::layout::{TILE_HEIGHT, TILE_WIDTH};
use super::reader::HexReader;

/// An 8×8 block of 2-bit shade indices (0 = lightest, 3 = darkest).
///
/// Tiles only come out of [`decode_tile`], so every value is in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pixels: [[u8; TILE_WIDTH]; TILE_HEIGHT],
}

impl Tile {
    pub fn pixel(&self, row: usize, col: usize) -> u8 {
        self.pixels[row][col]
    }

    pub fn rows(&self) -> &[[u8; TILE_WIDTH]; TILE_HEIGHT] {
        &self.pixels
    }
}

/// Decode one data line (32 hex digits, spaces already removed) into a tile.
///
/// Each output row `i` is built from two bit-planes: `byte[2i]` carries the
/// low bit and `byte[2i + 1]` the high bit, most significant bit leftmost.
///
/// # Examples
/// ```
/// use gbprinter_core::decode_tile;
///
/// let tile = decode_tile("FF00FF00FF00FF00FF00FF00FF00FF00")?;
/// assert_eq!(tile.rows()[0], [1; 8]);
/// # Ok::<(), gbprinter_core::DecodeError>(())
/// ```
pub fn decode_tile(hex: &str) -> Result<Tile, DecodeError> {
    let bytes = HexReader::new(hex).read_tile_bytes()?;

    let mut pixels = [[0u8; TILE_WIDTH]; TILE_HEIGHT];
    for (i, row) in pixels.iter_mut().enumerate() {
        let lo = bytes[i * 2];
        let hi = bytes[i * 2 + 1];
        for (j, pixel) in row.iter_mut().enumerate() {
            let bit = 7 - j;
            let lo_bit = (lo >> bit) & 1;
            let hi_bit = (hi >> bit) & 1;
            *pixel = (hi_bit << 1) | lo_bit;
        }
    }

    Ok(Tile { pixels })
}
