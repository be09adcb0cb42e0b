//! Client side of the event protocol.
//!
//! [`SessionView`] folds the relay's event stream into the state a client
//! renders: the roster and the last round result.

pub mod reducer;

pub use reducer::SessionView;
