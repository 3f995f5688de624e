pub mod console;
pub mod migrate;
