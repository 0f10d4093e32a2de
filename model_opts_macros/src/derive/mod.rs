//! Expansion logic shared by the `Model` and `Choice` derives.

pub(crate) mod choice;
mod crate_path;
pub(crate) mod model;
pub(crate) mod parse;
