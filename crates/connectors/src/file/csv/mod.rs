//! Decoding of header-plus-rows delimited text.
//!
//! Bytes are framed into lines by [`lines::LineSplitter`] and each line is
//! split into [`Cell`](model::core::cell::Cell)s by [`parser::LineParser`].

pub mod error;
pub mod lines;
pub mod parser;
