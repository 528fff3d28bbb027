pub mod answer_key_loader;

pub use answer_key_loader::{load_answer_key, parse_answer_key};
