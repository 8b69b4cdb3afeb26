mod certificate;
mod common;
mod hierarchy;
mod issuer;
mod mount;
mod warning;

pub use certificate::*;
pub use common::*;
pub use hierarchy::*;
pub use issuer::*;
pub use mount::*;
pub use warning::*;
