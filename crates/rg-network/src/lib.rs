//! `rg-network` — track network, occupancy view, and routing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`network`]   | `TrackNetwork` (CSR adjacency), `TrackNetworkBuilder`    |
//! | [`router`]    | `Router` trait, `Route`, `AStarRouter`, `EdgeOccupancy`  |
//! | [`view`]      | `NetworkView` — owned export of the static network       |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod network;
pub mod router;
pub mod view;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use network::{NodeKind, TrackNetwork, TrackNetworkBuilder};
pub use router::{AStarRouter, EdgeOccupancy, Route, Router};
pub use view::{EdgeView, NetworkView, NodeView};
