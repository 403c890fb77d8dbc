//! Append-only corpus of named feature vectors.
//!
//! A [`Corpus`] is an ordered collection of [`NamedVector`] records. Names are
//! unique and every vector in one corpus has the same length. New entries are
//! only ever appended through [`Corpus::merge`], which validates the whole
//! batch before touching the corpus.
//!
//! # Usage
//!
//! ```no_run
//! use facevault_corpus::NamedVector;
//!
//! let mut corpus = facevault_corpus::load("known_faces.bin")?;
//! corpus.merge(vec![NamedVector::new("alice.jpg", vec![0.1; 128])])?;
//! facevault_corpus::persist(&corpus, "known_faces.bin")?;
//! # Ok::<(), facevault_corpus::CorpusError>(())
//! ```
//!
//! # File format
//!
//! The corpus is stored as a single MessagePack document with positionally
//! aligned `names` and `vectors` arrays. [`persist`] always rewrites the whole
//! file through a temporary sibling and an atomic rename.

mod corpus;
mod error;
mod store;

pub use corpus::{Corpus, NamedVector};
pub use error::CorpusError;
pub use store::{FORMAT_VERSION, load, persist, read_from, write_to};
