//! Reactive layer — observable values, dependency tuples and memoized
//! selection.
//!
//! # Modules
//!
//! - [`observable`] — [`Observable<V>`] value holder with subscriptions.
//! - [`deps`] — [`Deps`] tuples and the [`Trigger`] change detector.
//! - [`memo`] — [`Memoized<V>`], a cached selection that re-subscribes when
//!   its dependencies change.

pub mod deps;
pub mod memo;
pub mod observable;

pub use deps::{Deps, Trigger};
pub use memo::Memoized;
pub use observable::{ListenerFn, ListenerId, Observable, Unsubscribe};
