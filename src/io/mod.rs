//! Model persistence.
//!
//! Trees and forests serialize to a line-oriented text format; see [`text`].

pub mod text;

pub use text::{
    load_forest, load_forest_path, load_tree, store_forest, store_forest_path, store_tree,
    ParseError,
};
