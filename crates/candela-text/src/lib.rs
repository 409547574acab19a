#![forbid(unsafe_code)]

//! Text handling for Candela.
//!
//! Shell output is plain text laid out one row at a time, so this crate only
//! needs width measurement, truncation, and soft wrapping:
//! - [`soft_wrap`] - split output into screen rows
//! - [`truncate_to_width`] - cut text to a cell budget
//! - [`display_width`] - cell width of a string
//!
//! # Example
//! ```
//! use candela_text::{display_width, soft_wrap};
//!
//! let rows = soft_wrap("Welcome to the shell", 10);
//! assert!(rows.iter().all(|r| display_width(r) <= 10));
//! ```

pub mod wrap;

pub use wrap::{display_width, soft_wrap, truncate_to_width, wrap_words};
