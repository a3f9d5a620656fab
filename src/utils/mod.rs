pub mod data;
pub mod formatter;
pub mod parser;
pub mod probability;
pub mod scoring;
pub mod selection;
