pub mod conversion;
pub mod definition;
pub mod index;
pub mod role;

pub use conversion::*;
pub use definition::*;
pub use index::GraphIndex;
pub use role::NodeRole;
