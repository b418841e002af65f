#![allow(dead_code)]

use wasm_bindgen::prelude::*;

mod bindings;
pub mod dispatcher;
pub mod estimator;
mod utils;

pub use utils::logger::Logger;
