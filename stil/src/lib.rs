pub mod block;
pub mod document;
pub mod parser;
pub mod source;

pub use block::Block;
pub use block::field::{Field, FieldKind};
pub use block::timestamp::Timestamp;
pub use document::StilDocument;
pub use parser::{ParseError, ParseOptions, Parser, PreambleFields, StilError, TimestampError};
pub use source::entry::EntryBuffer;
pub use source::{Line, LineSource};
