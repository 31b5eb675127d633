pub mod error;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod source;
pub mod tokenizer;

pub use error::EngineError;
pub use index::{FileId, InvertedIndex, Token};
pub use pipeline::{index_directory, FileFailure, IndexMode, IndexStats};
pub use query::{search, MatchMode, Query, SearchHit, DEFAULT_TOP_K};
pub use source::{DirectorySource, FsSource, MemorySource};
