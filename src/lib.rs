//! Reads EDN (extensible data notation) into a tree of typed values, each tagged with
//! the line and column it started at.
//!
//! ```
//! use edn_reader::{Kind, QualifiedName};
//!
//! let forms = edn_reader::parse_str("{:port 8080} #inst \"2020-01-01\"").unwrap();
//! assert_eq!(forms.len(), 2);
//! assert_eq!(forms[0].map_entries().unwrap().len(), 1);
//! match forms[1].kind() {
//!     Kind::Tagged(tag, _) => assert_eq!(tag, &QualifiedName::bare("inst")),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
//!
//! Comments and `#_` forms are kept in the tree; use [`ValueNode::is_trivia`] or
//! [`ValueNode::significant_children`] to skip them.

pub mod classify;
pub mod diagnostic;
pub mod error;
mod parser;
pub mod position;
pub mod reader;
pub mod value;

pub use error::{Error, Expected, Result};
pub use parser::DEFAULT_MAX_DEPTH;
pub use position::Position;
pub use reader::{parse_dir, parse_file, parse_reader, parse_str, Reader};
pub use value::{Kind, QualifiedName, ValueNode};
