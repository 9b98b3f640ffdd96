//! Helpers shared by the dispatcher and the binary.

pub mod tokenize;
