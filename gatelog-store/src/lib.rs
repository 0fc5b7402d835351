pub mod cursor;
pub mod driver;
pub mod memory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
