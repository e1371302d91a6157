pub mod collection;
pub mod dictionary;
pub mod filter;
pub mod geometry;
pub mod image;
pub mod number;
pub mod reducer;

pub use collection::ImageCollection;
pub use dictionary::Dictionary;
pub use filter::{Filter, MetadataOp};
pub use geometry::Geometry;
pub use image::Image;
pub use number::Number;
pub use reducer::{Kernel, KernelType, Reducer};
