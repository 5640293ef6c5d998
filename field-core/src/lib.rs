//! Core runtime for the radial event field
//!
//! This crate centralises the deterministic heart of the field renderer:
//!
//! 1. **Geometry & RNG** – angle arithmetic on the circle and the seeded
//!    32-bit pseudo-random stream every procedural decision is drawn
//!    from, so a scene replays identically for a given seed.
//! 2. **Angular layout** – maps a set of timestamped, severity-tagged
//!    events onto the circle, clustering markers into fixed-width
//!    angular buckets once they outnumber the visible slots.
//! 3. **Divergence trackers** – two independent temporal state machines:
//!    change-triggered pulses and autonomously spawned clusters, each a
//!    bounded spawn/decay population.
//! 4. **Contour synthesis** – folds layout, pulses and clusters into the
//!    sampled radius-per-angle contour (plus mountain bands) that the
//!    canvas renderer traces every animation frame.
//!
//! Everything is synchronous and single-threaded; the trackers are the
//! only stateful pieces and are mutated solely by their own update calls.
//! The browser-facing surface lives in the sibling `wasm-field` crate.

pub mod cluster;
pub mod contour;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod pulse;
pub mod rng;
pub mod scene;
