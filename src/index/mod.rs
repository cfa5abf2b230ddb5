pub mod builder;
pub mod meta;
pub mod reader;
