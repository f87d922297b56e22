//! Reinterpretation of a raw byte payload as a band/line/sample cube.

use std::path::Path;

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::constants::keys;
use crate::data::layout::{ElementType, LayoutDescriptor};
use crate::error::{EnviError, Result};

/// Unsigned element types a cube can hold.
pub trait Element: bytemuck::Pod + Into<f64> + Send + Sync {
    const TYPE: ElementType;
}

impl Element for u8 {
    const TYPE: ElementType = ElementType::U8;
}

impl Element for u16 {
    const TYPE: ElementType = ElementType::U16;
}

impl Element for u32 {
    const TYPE: ElementType = ElementType::U32;
}

/// A decoded hyperspectral cube with axes (band, line, sample).
#[derive(Debug, Clone, PartialEq)]
pub enum Cube {
    U8(Array3<u8>),
    U16(Array3<u16>),
    U32(Array3<u32>),
}

impl Cube {
    /// Decode the cube stored at `path`.
    ///
    /// The whole file is read into memory before decoding.
    pub fn read(path: &Path, layout: &LayoutDescriptor) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        log::debug!("Read {} bytes from {:?}", bytes.len(), path);
        Self::from_bytes(&bytes, layout)
    }

    /// Decode a cube from the full contents of a raw file.
    pub fn from_bytes(bytes: &[u8], layout: &LayoutDescriptor) -> Result<Self> {
        let offset = non_negative(keys::HEADER_OFFSET, layout.header_offset)?;
        let shape = (
            non_negative(keys::BANDS, layout.bands)?,
            non_negative(keys::LINES, layout.lines)?,
            non_negative(keys::SAMPLES, layout.samples)?,
        );
        let payload = bytes.get(offset..).unwrap_or(&[]);

        let cube = match layout.element_type {
            ElementType::U8 => Cube::U8(decode::<u8>(payload, shape)?),
            ElementType::U16 => Cube::U16(decode::<u16>(payload, shape)?),
            ElementType::U32 => Cube::U32(decode::<u32>(payload, shape)?),
        };

        log::info!(
            "Decoded {} cube: {} bands x {} lines x {} samples",
            cube.element_type(),
            shape.0,
            shape.1,
            shape.2
        );
        Ok(cube)
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Cube::U8(_) => ElementType::U8,
            Cube::U16(_) => ElementType::U16,
            Cube::U32(_) => ElementType::U32,
        }
    }

    /// (bands, lines, samples)
    pub fn shape(&self) -> (usize, usize, usize) {
        match self {
            Cube::U8(a) => a.dim(),
            Cube::U16(a) => a.dim(),
            Cube::U32(a) => a.dim(),
        }
    }

    pub fn bands(&self) -> usize {
        self.shape().0
    }

    /// Image height in pixels.
    pub fn lines(&self) -> usize {
        self.shape().1
    }

    /// Image width in pixels.
    pub fn samples(&self) -> usize {
        self.shape().2
    }

    /// Value at (band, line, sample) widened to f64.
    pub fn value(&self, band: usize, line: usize, sample: usize) -> Option<f64> {
        let index = [band, line, sample];
        match self {
            Cube::U8(a) => a.get(index).map(|&v| f64::from(v)),
            Cube::U16(a) => a.get(index).map(|&v| f64::from(v)),
            Cube::U32(a) => a.get(index).map(|&v| f64::from(v)),
        }
    }

    /// One band widened to f64, shape (lines, samples).
    pub fn band_f64(&self, band: usize) -> Option<Array2<f64>> {
        if band >= self.bands() {
            return None;
        }
        let view = match self {
            Cube::U8(a) => widen(a.index_axis(Axis(0), band)),
            Cube::U16(a) => widen(a.index_axis(Axis(0), band)),
            Cube::U32(a) => widen(a.index_axis(Axis(0), band)),
        };
        Some(view)
    }

    /// Mean of the window `lines x samples` in every band.
    ///
    /// Ranges are clamped to the image; an empty window yields 0.0.
    pub fn window_means(
        &self,
        lines: std::ops::Range<usize>,
        samples: std::ops::Range<usize>,
    ) -> Vec<f64> {
        match self {
            Cube::U8(a) => window_means(a, lines, samples),
            Cube::U16(a) => window_means(a, lines, samples),
            Cube::U32(a) => window_means(a, lines, samples),
        }
    }
}

fn non_negative(key: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| EnviError::invalid_value(key, value))
}

fn decode<T: Element>(payload: &[u8], shape: (usize, usize, usize)) -> Result<Array3<T>> {
    let size = T::TYPE.size();
    let expected = (shape.0 as u128)
        .saturating_mul(shape.1 as u128)
        .saturating_mul(shape.2 as u128);
    let mismatch = || EnviError::DimensionMismatch {
        expected_elements: expected,
        element_size: size,
        available_bytes: payload.len(),
    };

    if payload.len() % size != 0 || (payload.len() / size) as u128 != expected {
        return Err(mismatch());
    }

    // Copies into a fresh Vec<T>, so the payload's alignment does not matter
    let flat: Vec<T> = bytemuck::pod_collect_to_vec(payload);
    Array3::from_shape_vec(shape, flat).map_err(|e| {
        log::debug!("Reshape failed: {}", e);
        mismatch()
    })
}

fn widen<T: Element>(band: ArrayView2<'_, T>) -> Array2<f64> {
    band.mapv(Into::into)
}

fn window_means<T: Element>(
    cube: &Array3<T>,
    lines: std::ops::Range<usize>,
    samples: std::ops::Range<usize>,
) -> Vec<f64> {
    let (_, height, width) = cube.dim();
    let line_end = lines.end.min(height);
    let sample_end = samples.end.min(width);
    let line_start = lines.start.min(line_end);
    let sample_start = samples.start.min(sample_end);
    let count = (line_end - line_start) * (sample_end - sample_start);

    cube.outer_iter()
        .map(|band| {
            if count == 0 {
                return 0.0;
            }
            let sum: f64 = band
                .slice_axis(Axis(0), (line_start..line_end).into())
                .slice_axis(Axis(1), (sample_start..sample_end).into())
                .iter()
                .map(|&v| v.into())
                .sum();
            sum / count as f64
        })
        .collect()
}
