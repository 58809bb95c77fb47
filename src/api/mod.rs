pub mod extract;
pub mod format;
