pub mod data;
pub mod extract;
pub mod keys;
pub mod meta;
