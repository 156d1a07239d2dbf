//! Domain models for the Zovida core.

mod drug;
mod interaction;
mod lifestyle;
mod reference;

pub use drug::*;
pub use interaction::*;
pub use lifestyle::*;
pub use reference::*;
