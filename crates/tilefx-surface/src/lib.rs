//! tilefx render surfaces
//!
//! Pixel storage shared by the effect host and its render workers.
//!
//! # Features
//!
//! - **ColorBgra**: packed 8-bit color, one `u32` per pixel
//! - **Surface**: atomic pixel storage, safe for concurrent writes to
//!   disjoint regions through `&Surface`
//! - **Rect**: tile rectangles and row-major tile partitioning
//! - **PNG**: deterministic RGBA writer and a permissive reader
//!
//! # Example
//!
//! ```
//! use tilefx_surface::{ColorBgra, Rect, Surface};
//!
//! let src = Surface::new(64, 64, ColorBgra::white()).unwrap();
//! let dst = Surface::transparent(64, 64).unwrap();
//!
//! for tile in src.bounds().tiles(16) {
//!     dst.copy_region(&src, tile);
//! }
//! assert_eq!(dst, src);
//! ```

pub mod color;
pub mod png;
pub mod rect;
pub mod surface;

pub use color::ColorBgra;
pub use png::{PngConfig, PngError};
pub use rect::Rect;
pub use surface::{Surface, SurfaceError};
