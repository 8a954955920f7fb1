pub mod position;
pub mod dataset;
pub mod document;
pub mod index;
pub mod occurrences;
pub mod context;
pub mod completion;
pub mod hover;
pub mod quickfix;
pub mod schedule;
pub mod session;


pub use position::*;
pub use dataset::*;
pub use document::*;
pub use index::*;
pub use occurrences::*;
pub use context::*;
pub use completion::*;
pub use hover::*;
pub use quickfix::*;
pub use schedule::*;
pub use session::*;
