pub mod nlos_capture;

pub use nlos_capture::{LaserAim, NlosCaptureMeter};
