pub const COMMENT_PREFIX: char = '#';
pub const COMMAND_PREFIX: char = '!';
pub const DATA_SEPARATOR: char = ' ';

pub const TILE_WIDTH: usize = 8;
pub const TILE_HEIGHT: usize = 8;
pub const TILE_BYTES: usize = 16;
pub const TILE_HEX_LEN: usize = TILE_BYTES * 2;

/// Printer paper width, in tiles.
pub const TILES_PER_ROW: usize = 20;

pub const SHADE_COUNT: usize = 4;
pub const SHADE_MAX: u8 = 3;

pub const COMMAND_KEY: &str = "command";
pub const COMMAND_INIT: &str = "INIT";
pub const COMMAND_PRINT: &str = "PRNT";
