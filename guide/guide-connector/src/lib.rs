//! Floating-entity connectors for surgical guides.
//!
//! Screw eyes and barrels must be mechanically attached to the guide's
//! base shell; a component that hovers next to it is a manufacturing
//! defect. [`FloatingEntityConnector`] finds such components and builds a
//! short tube along the base shell for each, using the kernel's
//! shortest-path and sweep services.
//!
//! Entities farther than the search radius are assumed to be detached on
//! purpose and get no connector.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod connect;
mod error;

pub use connect::{Connector, EntityConnection, FloatingEntityConnector};
pub use error::{ConnectorError, ConnectorResult};
