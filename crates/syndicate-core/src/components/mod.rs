//! ECS Components
//!
//! Entity components and registry resources for officers, soldiers,
//! buildings, rivals, relationships, the ledger and world state.

pub mod building;
pub mod ledger;
pub mod officer;
pub mod rival;
pub mod social;
pub mod soldier;
pub mod world;

pub use building::*;
pub use ledger::*;
pub use officer::*;
pub use rival::*;
pub use social::*;
pub use soldier::*;
pub use world::*;
