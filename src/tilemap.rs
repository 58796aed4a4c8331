//! Fixed-size rectangular grid backed by one contiguous buffer.

use crate::error::{MapError, Result};

/// A 2D grid stored row-major. Dimensions are fixed at construction; the
/// edges do not wrap.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// Check requested grid dimensions and convert them to sizes.
pub fn checked_dimensions(width: i64, height: i64) -> Result<(usize, usize)> {
    if width <= 0 || height <= 0 {
        return Err(MapError::InvalidDimension { width, height });
    }
    let w = usize::try_from(width).map_err(|_| MapError::InvalidDimension { width, height })?;
    let h = usize::try_from(height).map_err(|_| MapError::InvalidDimension { width, height })?;
    Ok((w, h))
}

impl<T: Clone> Tilemap<T> {
    /// Allocate a grid filled with `value`.
    ///
    /// Zero-sized grids are rejected, and running out of memory is reported
    /// instead of aborting the process.
    pub fn try_new_with(width: usize, height: usize, value: T, what: &'static str) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDimension {
                width: width as i64,
                height: height as i64,
            });
        }
        let alloc_err = || MapError::AllocationFailure { what, width, height };
        let len = width.checked_mul(height).ok_or_else(alloc_err)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| alloc_err())?;
        data.resize(len, value);

        Ok(Self { width, height, data })
    }

    /// Infallible constructor for small grids (tests and tools).
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Overwrite this grid with the contents of another of the same size.
    pub fn copy_from(&mut self, other: &Tilemap<T>) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        self.data.clone_from_slice(&other.data);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all cells with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates, row-major.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data
            .iter_mut()
            .enumerate()
            .map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Row slices, top to bottom.
    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.width)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}
