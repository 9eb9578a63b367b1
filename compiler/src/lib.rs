pub mod codegen;
pub mod connection;
pub mod error;
pub mod import;
pub mod ir;
pub mod lower;
pub mod parse;
pub mod rules;
pub mod simulate;
pub mod validate;
pub mod wasm;
