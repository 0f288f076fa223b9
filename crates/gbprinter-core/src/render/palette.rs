use image::{GrayImage, Luma};
use thiserror::Error;

use crate::protocol::layout::{SHADE_COUNT, SHADE_MAX};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid scale {scale}: must be a positive integer")]
    InvalidScale { scale: u32 },
}

/// Grayscale blocks for the four printer shades at a fixed scale.
#[derive(Debug, Clone)]
pub struct Palette {
    scale: u32,
    blocks: [GrayImage; SHADE_COUNT],
}

impl Palette {
    /// Build one `scale × scale` block per shade, filled with
    /// [`Palette::intensity`].
    ///
    /// # Examples
    /// ```
    /// use gbprinter_core::Palette;
    ///
    /// let palette = Palette::build(2)?;
    /// assert_eq!(palette.block(3).dimensions(), (2, 2));
    /// # Ok::<(), gbprinter_core::ConfigError>(())
    /// ```
    pub fn build(scale: u32) -> Result<Self, ConfigError> {
        if scale == 0 {
            return Err(ConfigError::InvalidScale { scale });
        }
        let blocks = std::array::from_fn(|shade| {
            GrayImage::from_pixel(scale, scale, Luma([Self::intensity(shade as u8)]))
        });
        Ok(Self { scale, blocks })
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Intensity for a 2-bit shade: 0 → 255 (white) through 3 → 0 (black).
    pub fn intensity(shade: u8) -> u8 {
        (SHADE_MAX - shade.min(SHADE_MAX)) * 85
    }

    pub fn block(&self, shade: u8) -> &GrayImage {
        &self.blocks[usize::from(shade.min(SHADE_MAX))]
    }
}
