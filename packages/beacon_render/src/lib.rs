//! # Beacon Render
//!
//! Display-side building blocks for the beacon transcript: a minimal markdown
//! renderer and an actor classifier. Both are pure functions over text — no
//! I/O, no async, no state — so the monitor can call them per event without
//! any setup.
//!
//! ## Quick Start
//!
//! ```rust
//! use beacon_render::{classify, render, side, Side};
//!
//! let identity = classify("IntentOrchestrator");
//! assert_eq!(identity.label, "IntentOrchestrator");
//!
//! assert_eq!(side("MyAgentX"), Side::Right);
//!
//! let html = render("**done** processing");
//! assert!(html.contains("<strong>done</strong>"));
//! ```
//!
//! The renderer reproduces the transcript dialect exactly — including its
//! quirks — rather than aiming for CommonMark. Agents emit loosely formatted
//! text and a predictable rendering of that text matters more than spec
//! conformance.

pub mod actor;
pub mod markdown;

pub use actor::{DisplayIdentity, Side, classify, side};
pub use markdown::{render, render_content};
