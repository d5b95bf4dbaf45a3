pub mod encoding;
pub mod errors;
