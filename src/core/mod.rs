//! Bus core: ids, registries and the event bus.
//!
//! Internal modules:
//! - [`id`]: per-registry id generation;
//! - [`registry`]: ordered listeners of one label and the three dispatch modes;
//! - [`bus`]: label → registry map and the public `on`/`off`/`emit*` surface;
//! - [`config`] / [`builder`]: bus settings.

mod builder;
mod bus;
mod config;
mod id;
mod registry;

pub use builder::EventBusBuilder;
pub use bus::EventBus;
pub use config::Config;
pub use id::{IdGenerator, ListenerId};
pub use registry::Registry;
