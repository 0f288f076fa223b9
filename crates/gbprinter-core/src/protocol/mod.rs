//! Printer protocol decoding.
//!
//! The line protocol is layered like the rest of the crate:
//! - `layout`: prefixes, keys and tile geometry (source of truth)
//! - `reader`: safe access to hex text
//! - `parser`: line classification and command frames
//! - `tile`: planar 2bpp tile decoding
//! - `error`: explicit, actionable errors
//!
//! Everything here is pure; the session drives it one line at a time.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod tile;

pub use error::{DecodeError, ProtocolError};
pub use parser::{Command, Line, classify_line};
pub use tile::{Tile, decode_tile};
