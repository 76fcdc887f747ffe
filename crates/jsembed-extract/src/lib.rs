mod document;
mod error;
mod extractor;
mod fragment;
mod html;
mod language;
mod line_table;
mod source_location;
mod yaml;

pub use document::HostDocument;
pub use error::{ExtractError, Result};
pub use extractor::{extract_from_source, ExtractConfig};
pub use fragment::{Fragment, FragmentFormat};
pub use language::Language;
pub use line_table::LineTable;
pub use source_location::{Position, TextRange};
