pub mod postings;
pub mod varint;
