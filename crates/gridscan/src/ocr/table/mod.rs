pub mod reconstruct;
pub mod tsv_parser;

pub use reconstruct::{DEFAULT_Y_TOLERANCE, TableReconstructor, reconstruct_table};
pub use tsv_parser::extract_tokens_from_tsv;
