pub mod box_filter;
pub mod gaussian;

pub use box_filter::BoxFilter;
pub use gaussian::GaussianFilter;
