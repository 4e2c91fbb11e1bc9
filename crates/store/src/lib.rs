//! Mirrors the backend's sheets into a single owned state, driven by commands.

pub mod controller;
pub mod events;
pub mod reducer;
pub mod state;

pub use controller::{DispatchError, Store, StoreHandle};
pub use events::{StoreEvent, StoreSignal};
pub use state::{RouteParams, SheetStatus, StoreState};
