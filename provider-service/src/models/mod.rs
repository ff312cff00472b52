pub mod channel;
pub mod context;
pub mod policy;
pub mod provider;

pub use channel::*;
pub use context::*;
pub use policy::*;
pub use provider::*;
