//! Decoding of request sources into argument trees.
//!
//! Query strings and urlencoded bodies become flat pairs, which are then
//! nested by field name (`user[address][city]`). Multipart bodies also
//! yield the raw upload description consumed by [`crate::arguments::unify`].

mod multipart;
mod parser;

pub use multipart::{parse_multipart, remove_files};
pub use parser::{form_decode, nest_params, next_index, parse_query_string, split_field_name, FieldSegment};
