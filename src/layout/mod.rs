//! Layout engine for placing generated instances on the canvas
//!
//! Instances are packed left to right in rows. A row continues only while
//! consecutive items keep their footprint and carry a frame hint that marks
//! them as part of the same filmstrip; anything else wraps to a new row
//! below the previous item.

pub mod config;
pub mod cursor;

pub use config::LayoutConfig;
pub use cursor::{next_position, FrameHint, LayoutCursor, Point};
