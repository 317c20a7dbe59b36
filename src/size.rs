//! Size descriptor parsing
//!
//! Rows carry their artboard size as free text such as `"300x250"` or
//! `"Billboard 970X250 v2"`. The first `<width>x<height>` pair with at least
//! two digits on each side wins; single digits are ignored so stray numbers in
//! labels are never mistaken for a size.

use crate::error::{PipelineError, PipelineResult};

/// Width and height of an artboard in document units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Parse a size descriptor
    pub fn parse(descriptor: &str) -> PipelineResult<Self> {
        parse_size(descriptor)
    }
}

const MIN_DIGITS: usize = 2;

/// Extract `{width, height}` from a size descriptor
pub fn parse_size(descriptor: &str) -> PipelineResult<Size> {
    let bytes = descriptor.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'x' && b != b'X' {
            continue;
        }

        let before = bytes[..i]
            .iter()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let after = bytes[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if before < MIN_DIGITS || after < MIN_DIGITS {
            continue;
        }

        let width = number(&descriptor[i - before..i]);
        let height = number(&descriptor[i + 1..i + 1 + after]);
        if let (Some(width), Some(height)) = (width, height) {
            return Ok(Size { width, height });
        }
    }

    Err(PipelineError::invalid_size(descriptor))
}

fn number(digits: &str) -> Option<f64> {
    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}
