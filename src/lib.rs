pub mod error;
pub mod filesystem;
pub mod filetypes;
pub mod identifier;
pub mod inspect;
pub mod structs;

#[cfg(test)]
mod test_image;

pub use error::Error;
