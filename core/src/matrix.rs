//! Dense travel/beats matrices loaded once at init and read-only thereafter.
//!
//! Wire format: little-endian `i32 width; i32 height;` followed by a
//! row-major payload. Duration and distance matrices store `f64` cells;
//! the beats matrix stores `i32` station indices (negative means "skip").

use std::io::{Read, Write};

use crate::error::{SimError, SimResult};

const MAX_DIMENSION: i32 = 10_000;

/// A dense `rows x cols` matrix of `f64`, indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrixF64 {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrixF64 {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> SimResult<Self> {
        if data.len() != rows * cols {
            return Err(SimError::MatrixShape(format!(
                "expected {} cells for {rows}x{cols}, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    pub fn read_from(mut r: impl Read) -> SimResult<Self> {
        let width = read_i32(&mut r)?;
        let height = read_i32(&mut r)?;
        validate_dimensions(width, height)?;
        let (rows, cols) = (height as usize, width as usize);
        let mut data = vec![0.0f64; rows * cols];
        let mut buf = [0u8; 8];
        for cell in data.iter_mut() {
            r.read_exact(&mut buf)?;
            *cell = f64::from_le_bytes(buf);
        }
        Self::new(rows, cols, data)
    }

    pub fn write_to(&self, mut w: impl Write) -> SimResult<()> {
        w.write_all(&(self.cols as i32).to_le_bytes())?;
        w.write_all(&(self.rows as i32).to_le_bytes())?;
        for cell in &self.data {
            w.write_all(&cell.to_le_bytes())?;
        }
        Ok(())
    }
}

/// A dense `rows x cols` matrix of `i32`, used for the beats priority
/// table. Negative or out-of-range entries mean "no preference here" and
/// are skipped by the dispatch policy, not rejected at load.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrixI32 {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

impl DenseMatrixI32 {
    pub fn new(rows: usize, cols: usize, data: Vec<i32>) -> SimResult<Self> {
        if data.len() != rows * cols {
            return Err(SimError::MatrixShape(format!(
                "expected {} cells for {rows}x{cols}, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Entries for one zone, in rank order (row 0 = first preference).
    pub fn column(&self, col: usize) -> Vec<i32> {
        if col >= self.cols {
            return Vec::new();
        }
        (0..self.rows).map(|row| self.data[row * self.cols + col]).collect()
    }

    pub fn read_from(mut r: impl Read) -> SimResult<Self> {
        let width = read_i32(&mut r)?;
        let height = read_i32(&mut r)?;
        validate_dimensions(width, height)?;
        let (rows, cols) = (height as usize, width as usize);
        let mut data = vec![0i32; rows * cols];
        let mut buf = [0u8; 4];
        for cell in data.iter_mut() {
            r.read_exact(&mut buf)?;
            *cell = i32::from_le_bytes(buf);
        }
        Self::new(rows, cols, data)
    }

    pub fn write_to(&self, mut w: impl Write) -> SimResult<()> {
        w.write_all(&(self.cols as i32).to_le_bytes())?;
        w.write_all(&(self.rows as i32).to_le_bytes())?;
        for cell in &self.data {
            w.write_all(&cell.to_le_bytes())?;
        }
        Ok(())
    }
}

fn validate_dimensions(width: i32, height: i32) -> SimResult<()> {
    if width < 1 || width > MAX_DIMENSION || height < 1 || height > MAX_DIMENSION {
        return Err(SimError::MatrixShape(format!(
            "dimensions out of range: {width}x{height} (must be 1..={MAX_DIMENSION})"
        )));
    }
    Ok(())
}

fn read_i32(r: &mut impl Read) -> SimResult<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}
