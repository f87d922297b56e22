//! Validation of the header fields that describe the binary layout.

use std::fmt;

use crate::constants::keys;
use crate::data::header::{HeaderMapping, HeaderValue};
use crate::error::{EnviError, Result};

/// How bands are interleaved in the raw file.
///
/// Only band-sequential storage can be decoded; the other schemes are
/// recognised so they can be named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleave {
    /// Band sequential: all of band 0, then all of band 1, ...
    Bsq,
    /// Band interleaved by line
    Bil,
    /// Band interleaved by pixel
    Bip,
}

impl Interleave {
    /// Parse an ENVI interleave value (case-insensitive).
    pub fn from_header_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bsq" => Some(Interleave::Bsq),
            "bil" => Some(Interleave::Bil),
            "bip" => Some(Interleave::Bip),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Interleave::Bsq => "bsq",
            Interleave::Bil => "bil",
            Interleave::Bip => "bip",
        }
    }
}

/// Supported element types of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// ENVI data type 1
    U8,
    /// ENVI data type 12
    U16,
    /// ENVI data type 13
    U32,
}

impl ElementType {
    /// Map an ENVI `data type` code to a supported element type.
    ///
    /// Signed and floating point codes (2, 3, 4, 5, 14, 15, ...) are valid
    /// ENVI but not supported here.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ElementType::U8),
            12 => Some(ElementType::U16),
            13 => Some(ElementType::U32),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ElementType::U8 => 1,
            ElementType::U16 => 12,
            ElementType::U32 => 13,
        }
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            ElementType::U8 => 1,
            ElementType::U16 => 2,
            ElementType::U32 => 4,
        }
    }

    pub fn bits(&self) -> usize {
        self.size() * 8
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

/// Validated layout of a band-sequential cube.
///
/// Offset and dimensions are copied verbatim from the header; range checks
/// happen in the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub interleave: Interleave,
    pub element_type: ElementType,
    /// Bytes to skip at the start of the raw file
    pub header_offset: i64,
    pub bands: i64,
    pub lines: i64,
    pub samples: i64,
}

impl LayoutDescriptor {
    /// Validate a parsed header.
    ///
    /// Interleave is checked first, then the element type, then the offset and
    /// dimensions are read.
    pub fn from_header(header: &HeaderMapping) -> Result<Self> {
        let interleave = validate_interleave(header)?;
        let element_type = validate_depth(header)?;

        let layout = Self {
            interleave,
            element_type,
            header_offset: required_int(header, keys::HEADER_OFFSET)?,
            bands: required_int(header, keys::BANDS)?,
            lines: required_int(header, keys::LINES)?,
            samples: required_int(header, keys::SAMPLES)?,
        };

        warn_on_foreign_byte_order(header);

        log::debug!(
            "Layout: {} {} x {} x {} ({}), offset {}",
            layout.interleave.name(),
            layout.bands,
            layout.lines,
            layout.samples,
            layout.element_type,
            layout.header_offset
        );
        Ok(layout)
    }
}

fn validate_interleave(header: &HeaderMapping) -> Result<Interleave> {
    let value = header
        .get(keys::INTERLEAVE)
        .ok_or_else(|| EnviError::missing_key(keys::INTERLEAVE))?;

    match value.as_str().and_then(Interleave::from_header_value) {
        Some(Interleave::Bsq) => Ok(Interleave::Bsq),
        _ => Err(EnviError::UnsupportedInterleave {
            found: value.to_string(),
        }),
    }
}

fn validate_depth(header: &HeaderMapping) -> Result<ElementType> {
    let value = header
        .get(keys::DATA_TYPE)
        .ok_or_else(|| EnviError::missing_key(keys::DATA_TYPE))?;

    value
        .as_i64()
        .and_then(ElementType::from_code)
        .ok_or_else(|| EnviError::UnsupportedDepth {
            found: value.to_string(),
        })
}

fn required_int(header: &HeaderMapping, key: &str) -> Result<i64> {
    match header.get(key) {
        Some(HeaderValue::Integer(v)) => Ok(*v),
        Some(other) => Err(EnviError::invalid_value(key, other)),
        None => Err(EnviError::missing_key(key)),
    }
}

/// ENVI `byte order`: 0 = little endian, 1 = big endian.
fn warn_on_foreign_byte_order(header: &HeaderMapping) {
    let Some(order) = header.get_int(keys::BYTE_ORDER) else {
        return;
    };
    let native = if cfg!(target_endian = "big") { 1 } else { 0 };
    if order != native {
        log::warn!(
            "Header declares byte order {} but data is read in native order ({})",
            order,
            native
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(interleave: &str, data_type: &str) -> HeaderMapping {
        HeaderMapping::parse(&format!(
            "ENVI\nsamples = 5\nlines = 4\nbands = 3\nheader offset = 0\n\
             data type = {}\ninterleave = {}\n",
            data_type, interleave
        ))
    }

    #[test]
    fn test_valid_layout() {
        let layout = LayoutDescriptor::from_header(&header("bsq", "12")).expect("valid layout");
        assert_eq!(layout.interleave, Interleave::Bsq);
        assert_eq!(layout.element_type, ElementType::U16);
        assert_eq!(
            (layout.bands, layout.lines, layout.samples, layout.header_offset),
            (3, 4, 5, 0)
        );
    }

    #[test]
    fn test_interleave_is_case_insensitive() {
        assert!(LayoutDescriptor::from_header(&header("BSQ", "1")).is_ok());
        assert!(LayoutDescriptor::from_header(&header("Bsq", "1")).is_ok());
    }

    #[test]
    fn test_unsupported_interleave_rejected() {
        for interleave in ["bil", "BIP", "tiled", "3"] {
            let err = LayoutDescriptor::from_header(&header(interleave, "1")).unwrap_err();
            assert!(
                matches!(err, EnviError::UnsupportedInterleave { .. }),
                "{} should be rejected, got {:?}",
                interleave,
                err
            );
        }
    }

    #[test]
    fn test_interleave_checked_before_depth() {
        let err = LayoutDescriptor::from_header(&header("bip", "4")).unwrap_err();
        assert!(matches!(err, EnviError::UnsupportedInterleave { .. }));
    }

    #[test]
    fn test_unsupported_depth_rejected() {
        for code in ["2", "3", "4", "5", "6", "9", "14", "15", "0", "12.0", "uint16"] {
            let err = LayoutDescriptor::from_header(&header("bsq", code)).unwrap_err();
            assert!(
                matches!(err, EnviError::UnsupportedDepth { .. }),
                "data type {} should be rejected, got {:?}",
                code,
                err
            );
        }
    }

    #[test]
    fn test_supported_depths() {
        for (code, expected) in [
            ("1", ElementType::U8),
            ("12", ElementType::U16),
            ("13", ElementType::U32),
        ] {
            let layout = LayoutDescriptor::from_header(&header("bsq", code)).expect("supported");
            assert_eq!(layout.element_type, expected);
            assert_eq!(layout.element_type.code().to_string(), code);
        }
    }

    #[test]
    fn test_missing_keys_reported() {
        let mut h = HeaderMapping::parse("data type = 1\nbands = 1\nlines = 1\nsamples = 1\n");
        let err = LayoutDescriptor::from_header(&h).unwrap_err();
        assert!(matches!(err, EnviError::MissingHeaderKey { ref key } if key == "interleave"));

        h.insert("interleave", HeaderValue::Text("bsq".to_string()));
        let err = LayoutDescriptor::from_header(&h).unwrap_err();
        assert!(matches!(err, EnviError::MissingHeaderKey { ref key } if key == "header offset"));
    }

    #[test]
    fn test_non_integer_dimension_reported() {
        let mut h = header("bsq", "1");
        h.insert("lines", HeaderValue::Float(4.5));
        let err = LayoutDescriptor::from_header(&h).unwrap_err();
        assert!(matches!(err, EnviError::InvalidHeaderValue { ref key, .. } if key == "lines"));
    }

    #[test]
    fn test_negative_dimensions_kept_verbatim() {
        let mut h = header("bsq", "1");
        h.insert("bands", HeaderValue::Integer(-1));
        let layout = LayoutDescriptor::from_header(&h).expect("range checks are deferred");
        assert_eq!(layout.bands, -1);
    }
}
