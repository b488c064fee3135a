//! folio typewriter
//!
//! Animates a rotating list of phrases: the displayed text is deleted back to
//! the prefix it shares with the next phrase, then the next phrase is typed
//! character by character.
//!
//! - [`transition`] - the per-pair state machine
//! - [`driver`] - snippet cycling, pacing and the async frame loop

pub mod driver;
pub mod transition;

pub use driver::{Frame, Jitter, OsJitter, Typewriter, TypewriterError, animate, pacing};
pub use transition::{Stage, TransitionState, common_prefix_len};
