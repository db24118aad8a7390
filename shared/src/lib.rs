mod diff;
mod marker;
mod reconcile;

#[cfg(feature = "github")]
pub mod github;

pub use diff::*;
pub use marker::*;
pub use reconcile::*;

pub type CommentId = u64;
