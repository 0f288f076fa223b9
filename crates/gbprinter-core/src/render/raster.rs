use image::{GrayImage, Luma, imageops};

use super::palette::Palette;
use crate::protocol::Tile;
use crate::protocol::layout::{TILE_HEIGHT, TILE_WIDTH, TILES_PER_ROW};

/// How a trailing partial row of tiles is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// `len / 20` rows; a trailing partial row is dropped (legacy output).
    Truncate,
    /// `ceil(len / 20)` rows; missing tiles stay at the lightest shade.
    #[default]
    RoundUp,
}

impl RowPolicy {
    pub fn tile_rows(self, tiles: usize) -> usize {
        match self {
            RowPolicy::Truncate => tiles / TILES_PER_ROW,
            RowPolicy::RoundUp => tiles.div_ceil(TILES_PER_ROW),
        }
    }
}

/// Lay tiles out 20 per row, left to right then top to bottom.
///
/// The canvas is always `160 × scale` wide. An empty tile sequence (or fewer
/// than 20 tiles under [`RowPolicy::Truncate`]) yields a zero-height image.
///
/// # Examples
/// ```
/// use gbprinter_core::{Palette, RowPolicy, decode_tile, render_tiles};
///
/// let tile = decode_tile(&"00".repeat(16))?;
/// let palette = Palette::build(1)?;
/// let image = render_tiles(&vec![tile; 20], &palette, RowPolicy::Truncate);
/// assert_eq!(image.dimensions(), (160, 8));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn render_tiles(tiles: &[Tile], palette: &Palette, rows: RowPolicy) -> GrayImage {
    let scale = palette.scale();
    let tile_w = TILE_WIDTH as u32 * scale;
    let tile_h = TILE_HEIGHT as u32 * scale;
    let tile_rows = rows.tile_rows(tiles.len());

    let width = TILES_PER_ROW as u32 * tile_w;
    let height = tile_rows as u32 * tile_h;
    let mut canvas = GrayImage::from_pixel(width, height, Luma([Palette::intensity(0)]));

    let visible = (tile_rows * TILES_PER_ROW).min(tiles.len());
    for (index, tile) in tiles[..visible].iter().enumerate() {
        let origin_x = (index % TILES_PER_ROW) as u32 * tile_w;
        let origin_y = (index / TILES_PER_ROW) as u32 * tile_h;
        for (i, row) in tile.rows().iter().enumerate() {
            for (j, &shade) in row.iter().enumerate() {
                let x = origin_x + j as u32 * scale;
                let y = origin_y + i as u32 * scale;
                imageops::replace(
                    &mut canvas,
                    palette.block(shade),
                    i64::from(x),
                    i64::from(y),
                );
            }
        }
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::{RowPolicy, render_tiles};
    use crate::protocol::{Tile, decode_tile};
    use crate::render::palette::Palette;

    fn solid(shade: u8) -> Tile {
        let pair = match shade {
            0 => "0000",
            1 => "FF00",
            2 => "00FF",
            _ => "FFFF",
        };
        decode_tile(&pair.repeat(8)).unwrap()
    }

    #[test]
    fn empty_sequence_renders_zero_height() {
        let palette = Palette::build(1).unwrap();
        for policy in [RowPolicy::Truncate, RowPolicy::RoundUp] {
            let image = render_tiles(&[], &palette, policy);
            assert_eq!(image.dimensions(), (160, 0));
        }
    }

    #[test]
    fn full_row_dimensions_scale() {
        for scale in [1, 3] {
            let palette = Palette::build(scale).unwrap();
            let tiles = vec![solid(2); 20];
            let image = render_tiles(&tiles, &palette, RowPolicy::Truncate);
            assert_eq!(image.dimensions(), (160 * scale, 8 * scale));
        }
    }

    #[test]
    fn truncate_drops_partial_row() {
        let palette = Palette::build(2).unwrap();
        let tiles = vec![solid(3); 25];
        let image = render_tiles(&tiles, &palette, RowPolicy::Truncate);
        assert_eq!(image.dimensions(), (320, 16));
    }

    #[test]
    fn round_up_keeps_partial_row() {
        let palette = Palette::build(1).unwrap();
        let tiles = vec![solid(3); 25];
        let image = render_tiles(&tiles, &palette, RowPolicy::RoundUp);
        assert_eq!(image.dimensions(), (160, 16));
        // Tile 20 starts the second row, tile 25 would be empty paper.
        assert_eq!(image.get_pixel(0, 8).0, [0]);
        assert_eq!(image.get_pixel(39, 15).0, [0]);
        assert_eq!(image.get_pixel(40, 8).0, [255]);
    }

    #[test]
    fn tiles_land_at_grid_offsets() {
        let palette = Palette::build(1).unwrap();
        let mut tiles = vec![solid(0); 40];
        tiles[1] = solid(1);
        tiles[21] = solid(2);
        let image = render_tiles(&tiles, &palette, RowPolicy::Truncate);
        assert_eq!(image.get_pixel(7, 0).0, [255]);
        assert_eq!(image.get_pixel(8, 0).0, [170]);
        assert_eq!(image.get_pixel(15, 7).0, [170]);
        assert_eq!(image.get_pixel(8, 8).0, [85]);
        assert_eq!(image.get_pixel(16, 8).0, [255]);
    }

    #[test]
    fn scaled_pixels_fill_blocks() {
        let palette = Palette::build(2).unwrap();
        let hex = format!("8000{}", "0000".repeat(7));
        let mut tiles = vec![solid(0); 20];
        tiles[0] = decode_tile(&hex).unwrap();
        let image = render_tiles(&tiles, &palette, RowPolicy::Truncate);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(image.get_pixel(x, y).0, [170]);
        }
        assert_eq!(image.get_pixel(2, 0).0, [255]);
        assert_eq!(image.get_pixel(0, 2).0, [255]);
    }
}
