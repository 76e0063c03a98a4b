//! Splits a plane into 8x8 sample blocks.

use crate::constants::{BLOCK_DIM, BLOCK_SIZE};
use crate::jpeg1::color::Plane;

/// 8x8 samples in natural (row-major) order.
pub type Block = [f32; BLOCK_DIM];

impl Plane {
    /// Number of 8x8 blocks covering the plane horizontally and vertically.
    pub fn block_dimensions(&self) -> (usize, usize) {
        (
            self.width().div_ceil(BLOCK_SIZE),
            self.height().div_ceil(BLOCK_SIZE),
        )
    }

    /// Extracts the block at grid position (bx, by), replicating edge samples.
    pub fn block_at(&self, bx: usize, by: usize) -> Block {
        let mut block = [0.0f32; BLOCK_DIM];
        let x0 = bx * BLOCK_SIZE;
        let y0 = by * BLOCK_SIZE;
        for (row, out) in block.chunks_exact_mut(BLOCK_SIZE).enumerate() {
            for (col, sample) in out.iter_mut().enumerate() {
                *sample = self.sample_clamped(x0 + col, y0 + row);
            }
        }
        block
    }

    /// Blocks of the plane's own 8x8 grid, in raster order.
    pub fn blocks(&self) -> Blocks<'_> {
        let (w, h) = self.block_dimensions();
        Blocks::new(self, w, h)
    }

    /// Blocks of a grid that may extend past the plane (MCU padding).
    pub fn blocks_in_grid(&self, grid_width: usize, grid_height: usize) -> Blocks<'_> {
        Blocks::new(self, grid_width, grid_height)
    }
}

/// Lazy raster-order block sequence. Cloning or calling [`Blocks::rewind`]
/// restarts it from the first block.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    plane: &'a Plane,
    grid_width: usize,
    grid_height: usize,
    next: usize,
}

impl<'a> Blocks<'a> {
    fn new(plane: &'a Plane, grid_width: usize, grid_height: usize) -> Self {
        Self {
            plane,
            grid_width,
            grid_height,
            next: 0,
        }
    }

    pub fn grid(&self) -> (usize, usize) {
        (self.grid_width, self.grid_height)
    }

    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

impl Iterator for Blocks<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.next >= self.grid_width * self.grid_height {
            return None;
        }
        let bx = self.next % self.grid_width;
        let by = self.next / self.grid_width;
        self.next += 1;
        Some(self.plane.block_at(bx, by))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.grid_width * self.grid_height;
        let remaining = total - self.next.min(total);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Blocks<'_> {}
