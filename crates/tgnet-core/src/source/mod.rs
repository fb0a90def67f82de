pub mod port;
pub mod types;

pub use port::{MessageIter, MessageSource, SourceError, SourceResult};
pub use types::{Entity, EntityKind, ForwardOrigin, ScanWindow, SourceMessage};
