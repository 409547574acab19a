#![forbid(unsafe_code)]

//! Test harness for Candela shells.
//!
//! - **[`VirtualSurface`]**: an in-memory [`Surface`] with a scripted key
//!   queue, so a shell can be driven end to end inside `cargo test`.
//! - **[`keys`] / [`line`]**: build key sequences from plain strings.
//!
//! # Quick Start
//!
//! ```
//! use candela_harness::{VirtualSurface, line};
//! use candela_core::surface::Surface;
//!
//! let mut surface = VirtualSurface::new(24, 80).with_keys(line("help"));
//! assert_eq!(surface.pending_keys(), 5);
//! surface.write_at(23, 0, "> ").unwrap();
//! assert_eq!(surface.row_text(23), ">");
//! ```
//!
//! [`Surface`]: candela_core::surface::Surface

pub mod virtual_surface;

pub use virtual_surface::{VirtualSurface, keys, line};
