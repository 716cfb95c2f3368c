//! # typeout-core
//!
//! Core typing-reveal animation library for markup text and ASCII art.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Parsing an element's original markup and rebuilding it as an empty
//!   skeleton that keeps every tag and attribute
//! - Revealing text character by character on a virtual clock, with a fast
//!   rate for ASCII-art regions and a readable rate for ordinary text
//! - Driving a sequence of targets strictly one at a time, with
//!   cancellation, and arming collapsible sections only once it finishes
//! - Choosing between compact and full page layouts by viewport width
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for configuration
//! - `toml` - Load [`TypingConfig`] from TOML
//! - `web` - Drive a live browser document through `web-sys`
//!
//! ## Example
//!
//! ```rust
//! use typeout_core::{parse_markup, Skeleton, TypingConfig, Typewriter};
//!
//! let config = TypingConfig::default();
//! let markup = parse_markup("<p>Hello <pre class=\"ascii-art\">(^_^)</pre></p>").unwrap();
//! let skeleton = Skeleton::build(&markup, &config.classes.art);
//!
//! let mut typewriter = Typewriter::new(skeleton.fragments.clone(), &config);
//! while !typewriter.tick().finished {}
//!
//! assert_eq!(typewriter.revealed_text(), markup.text_content());
//! ```

mod animation;
mod config;
mod error;
mod markup;
pub mod render;
mod responsive;
mod sequence;
mod skeleton;
mod target;
mod toggle;

#[cfg(feature = "web")]
pub mod web;

pub use animation::{Append, CaretPlacement, TickOutcome, Typewriter};
pub use config::{CaretPolicy, ClassNames, LayoutConfig, TypingConfig, MIN_TICK_MS};
pub use error::{TypingError, TypingResult};
pub use markup::{parse_markup, Element, Markup, MarkupError, Namespace, Node};
pub use render::RenderConfig;
pub use responsive::{Layout, ResponsiveSwap, SwapAction, SwapSteps};
pub use sequence::{CancellationToken, Sequence, SequenceReport, TargetOutcome, TypingHost};
pub use skeleton::{Skeleton, SkeletonNode, TextFragment};
pub use target::{CaptureRecord, TargetState, TypingTarget};
pub use toggle::{ToggleGate, ToggleSection};

#[cfg(feature = "web")]
pub use web::{start, DomHost};
