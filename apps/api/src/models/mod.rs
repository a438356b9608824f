pub mod evaluation;
pub mod knowledge;
