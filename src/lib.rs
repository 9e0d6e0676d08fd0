#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

extern crate rayon;

#[macro_use]
pub mod core;
pub mod filters;
pub mod integrators;
pub mod sensors;
