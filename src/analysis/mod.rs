pub mod tokenizer;
pub mod transform;
