pub mod matrix;
pub mod segment;
pub mod symbol;

pub use matrix::BitMatrix;
pub use segment::{Mode, Segment};
pub use symbol::{ECLevel, MaskPattern, Symbol, Version, VersionClass};
