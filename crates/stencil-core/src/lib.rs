#[macro_use]
extern crate lazy_static;

#[macro_use]
pub extern crate stencil_fn_kit as kit;

pub mod std;

pub use crate::std::functions::{get_function, FUNCTIONS};
