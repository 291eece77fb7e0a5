//! Screen-space primitives and the triangle rasterizer.
pub mod primitives;
pub mod tile;
pub mod triangle;

pub use primitives::{clip_to_screen, draw_line, draw_point, edge_function};
pub use tile::{bin_triangles, build_tiles, triangle_bounds, Tile};
pub use triangle::{rasterize_triangle_scalar, rasterize_triangle_simd};
