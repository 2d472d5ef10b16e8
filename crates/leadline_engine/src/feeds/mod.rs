//! Situational-awareness feeds built from the same roster as the aim cycle.
//!
//! Each feed runs on its own scheduler timer and produces plain values for
//! the presentation layer; nothing here touches the lock.

pub mod overlay;
pub mod radar;

pub use overlay::{build_overlay, OverlayEntry};
pub use radar::{build_radar, RadarBlip};
