//! The depth buffer.
use glam::IVec2;

/// A width x height grid of single-precision depths.
///
/// Default and clear semantics use `1.0` as the "far" value; smaller values
/// are nearer. Depth range is `[0, 1]`; values outside are not normalized.
pub struct DepthTarget {
    width: usize,
    height: usize,
    depths: Vec<f32>,
}
impl DepthTarget {
    /// Creates a depth target cleared to the far value (`1.0`).
    pub fn new(width: usize, height: usize) -> Self {
        DepthTarget {
            width,
            height,
            depths: vec![1.0; width * height],
        }
    }
    /// Fills every depth with `depth`, four at a time. The chunking gives
    /// the optimizer a shape it can turn into a wide store without reaching
    /// for target-specific intrinsics.
    pub fn clear(&mut self, depth: f32) {
        let mut chunks = self.depths.chunks_exact_mut(4);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&[depth; 4]);
        }
        for d in chunks.into_remainder() {
            *d = depth;
        }
    }
    /// Reads the depth at a flat pixel index.
    pub fn at(&self, index: usize) -> f32 {
        self.depths[index]
    }
    /// Reads the depth at pixel coordinates. Out-of-bounds coordinates
    /// return the far value.
    pub fn at_coord(&self, coord: IVec2) -> f32 {
        if self.in_bounds(coord) {
            self.depths[self.index_of(coord)]
        } else {
            1.0
        }
    }
    /// Writes the depth at a flat pixel index.
    pub fn set(&mut self, index: usize, depth: f32) {
        self.depths[index] = depth;
    }
    /// Writes the depth at pixel coordinates. Out-of-bounds coordinates are
    /// ignored.
    pub fn set_coord(&mut self, coord: IVec2, depth: f32) {
        if self.in_bounds(coord) {
            let idx = self.index_of(coord);
            self.depths[idx] = depth;
        }
    }
    /// Raw read access, for contiguous SIMD loads.
    pub fn data(&self) -> &[f32] {
        &self.depths
    }
    /// Raw write access, for contiguous SIMD stores.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.depths
    }
    /// Target width, in pixels.
    pub fn width(&self) -> usize {
        self.width
    }
    /// Target height, in pixels.
    pub fn height(&self) -> usize {
        self.height
    }
    /// Resizes the buffer in place, clearing it to the far value.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.depths.clear();
        self.depths.resize(width * height, 1.0);
    }
    fn in_bounds(&self, coord: IVec2) -> bool {
        coord.x >= 0 && (coord.x as usize) < self.width && coord.y >= 0 && (coord.y as usize) < self.height
    }
    fn index_of(&self, coord: IVec2) -> usize {
        coord.y as usize * self.width + coord.x as usize
    }
}
