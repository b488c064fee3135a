//! Looping typewriter over a cyclic list of snippets.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::transition::{Stage, TransitionState};

/// Delay before the very first transition, in milliseconds.
pub const INITIAL_DELAY_MS: u64 = 2000;

/// Pause between deleting and typing, in milliseconds.
pub const READY_DELAY_MS: u64 = 200;

/// Delay range while typing.
pub const INSERT_DELAY_MS: (u64, u64) = (50, 100);

/// Delay range while deleting.
pub const DELETE_DELAY_MS: (u64, u64) = (30, 50);

/// Delay range between completed phrases.
pub const REST_DELAY_MS: (u64, u64) = (1500, 3000);

/// Typewriter errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypewriterError {
    /// No snippets to cycle through.
    #[error("typewriter needs at least one snippet")]
    NoSnippets,
}

/// Source of delay jitter.
pub trait Jitter {
    /// A value in `min..=max`.
    fn between(&mut self, min: u64, max: u64) -> u64;
}

/// Jitter backed by the operating system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsJitter;

impl Jitter for OsJitter {
    fn between(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        let mut buf = [0u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => min + u64::from_le_bytes(buf) % (max - min + 1),
            Err(e) => {
                debug!(error = %e, "rng unavailable, using midpoint delay");
                min + (max - min) / 2
            }
        }
    }
}

/// One rendered step of the animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Text to display.
    pub current: String,
    /// Phrase being typed toward.
    pub target: String,
    /// Whether the caret should blink.
    pub idle: bool,
    /// How long to wait before the next tick.
    pub delay: Duration,
}

/// Delay and idleness after a tick that left the transition in `stage`.
///
/// `None` means no transition is active.
pub fn pacing(stage: Option<Stage>, jitter: &mut impl Jitter) -> (Duration, bool) {
    let (ms, idle) = match stage {
        None => (jitter.between(REST_DELAY_MS.0, REST_DELAY_MS.1), true),
        Some(Stage::Inserting) => (jitter.between(INSERT_DELAY_MS.0, INSERT_DELAY_MS.1), false),
        Some(Stage::ReadyToInsert) => (READY_DELAY_MS, true),
        Some(Stage::Deleting | Stage::Idle) => {
            (jitter.between(DELETE_DELAY_MS.0, DELETE_DELAY_MS.1), false)
        }
    };
    (Duration::from_millis(ms), idle)
}

/// Drives transitions between consecutive snippets.
///
/// Not shared between tasks: one loop owns it and calls [`Typewriter::tick`].
#[derive(Debug)]
pub struct Typewriter<J = OsJitter> {
    snippets: Vec<String>,
    index: usize,
    transition: Option<TransitionState>,
    frame: Frame,
    jitter: J,
}

impl Typewriter<OsJitter> {
    /// Create a typewriter with OS-backed jitter.
    pub fn new(snippets: Vec<String>) -> Result<Self, TypewriterError> {
        Self::with_jitter(snippets, OsJitter)
    }
}

impl<J: Jitter> Typewriter<J> {
    /// Create a typewriter with a custom jitter source.
    pub fn with_jitter(snippets: Vec<String>, jitter: J) -> Result<Self, TypewriterError> {
        let first = snippets.first().ok_or(TypewriterError::NoSnippets)?.clone();
        Ok(Self {
            frame: Frame {
                current: first.clone(),
                target: first,
                idle: true,
                delay: Duration::from_millis(INITIAL_DELAY_MS),
            },
            snippets,
            index: 0,
            transition: None,
            jitter,
        })
    }

    /// The most recent frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Stage of the active transition, if any.
    pub fn stage(&self) -> Option<Stage> {
        self.transition.as_ref().map(TransitionState::stage)
    }

    /// Index of the snippet currently targeted.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance by one step and return the new frame.
    pub fn tick(&mut self) -> &Frame {
        let (current, target) = match self.transition.as_mut() {
            None => {
                let next = (self.index + 1) % self.snippets.len();
                let state = TransitionState::new(&self.frame.current, &self.snippets[next]);
                trace!(from = self.index, to = next, "starting transition");
                self.index = next;
                let texts = (state.current().to_string(), state.target().to_string());
                self.transition = Some(state);
                texts
            }
            Some(state) => {
                let running = state.advance();
                let texts = (state.current().to_string(), state.target().to_string());
                if !running {
                    self.transition = None;
                }
                texts
            }
        };

        let (delay, idle) = pacing(self.stage(), &mut self.jitter);
        self.frame = Frame {
            current,
            target,
            idle,
            delay,
        };
        &self.frame
    }
}

/// Run the animation, sending every frame to `frames`.
///
/// The current frame goes out immediately; afterwards each frame is sent once
/// the previous frame's delay has elapsed. Returns when the receiver is dropped.
pub async fn animate<J: Jitter>(mut typewriter: Typewriter<J>, frames: mpsc::Sender<Frame>) {
    if frames.send(typewriter.frame().clone()).await.is_err() {
        return;
    }

    loop {
        tokio::time::sleep(typewriter.frame().delay).await;
        let frame = typewriter.tick().clone();
        if frames.send(frame).await.is_err() {
            debug!("typewriter receiver gone, stopping");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always picks the lower bound.
    struct Low;

    impl Jitter for Low {
        fn between(&mut self, min: u64, _max: u64) -> u64 {
            min
        }
    }

    fn typewriter(snippets: &[&str]) -> Typewriter<Low> {
        Typewriter::with_jitter(snippets.iter().map(|s| s.to_string()).collect(), Low)
            .expect("snippets")
    }

    #[test]
    fn test_empty_snippets_rejected() {
        assert_eq!(
            Typewriter::new(Vec::new()).unwrap_err(),
            TypewriterError::NoSnippets
        );
    }

    #[test]
    fn test_initial_frame() {
        let tw = typewriter(&["Engineer", "Writer"]);
        let frame = tw.frame();
        assert_eq!(frame.current, "Engineer");
        assert_eq!(frame.target, "Engineer");
        assert!(frame.idle);
        assert_eq!(frame.delay, Duration::from_millis(INITIAL_DELAY_MS));
    }

    #[test]
    fn test_full_cycle_pacing() {
        let mut tw = typewriter(&["ab", "ac"]);

        // Transition created, deleting.
        let frame = tw.tick().clone();
        assert_eq!(frame.current, "ab");
        assert_eq!(frame.target, "ac");
        assert!(!frame.idle);
        assert_eq!(frame.delay, Duration::from_millis(30));

        // Delete "b".
        assert_eq!(tw.tick().current, "a");
        // Ready to insert: fixed pause, caret blinks.
        let frame = tw.tick().clone();
        assert_eq!(tw.stage(), Some(Stage::ReadyToInsert));
        assert!(frame.idle);
        assert_eq!(frame.delay, Duration::from_millis(READY_DELAY_MS));
        // Inserting.
        let frame = tw.tick().clone();
        assert_eq!(tw.stage(), Some(Stage::Inserting));
        assert_eq!(frame.delay, Duration::from_millis(50));
        assert_eq!(tw.tick().current, "ac");
        // Reaches idle stage, then gets released.
        tw.tick();
        assert_eq!(tw.stage(), Some(Stage::Idle));
        let frame = tw.tick().clone();
        assert_eq!(tw.stage(), None);
        assert!(frame.idle);
        assert_eq!(frame.current, "ac");
        assert_eq!(frame.delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_cycles_back_to_first() {
        let mut tw = typewriter(&["one", "two"]);
        let mut completed = Vec::new();

        for _ in 0..200 {
            tw.tick();
            if tw.stage().is_none() {
                completed.push(tw.frame().current.clone());
            }
            if completed.len() == 3 {
                break;
            }
        }

        assert_eq!(completed, ["two", "one", "two"]);
    }

    #[test]
    fn test_single_snippet_loops_on_itself() {
        let mut tw = typewriter(&["solo"]);
        for _ in 0..20 {
            assert_eq!(tw.tick().current, "solo");
        }
    }

    #[test]
    fn test_os_jitter_in_range() {
        let mut jitter = OsJitter;
        for _ in 0..100 {
            let v = jitter.between(30, 50);
            assert!((30..=50).contains(&v));
        }
        assert_eq!(jitter.between(200, 200), 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_streams_frames() {
        let tw = typewriter(&["Engineer", "Writer"]);
        let (tx, mut rx) = mpsc::channel(4);
        let handle = tokio::spawn(animate(tw, tx));

        let first = rx.recv().await.expect("initial frame");
        assert_eq!(first.current, "Engineer");

        let mut last = first;
        while let Some(frame) = rx.recv().await {
            last = frame;
            if last.current == "Writer" && last.idle {
                break;
            }
        }
        assert_eq!(last.current, "Writer");

        drop(rx);
        handle.await.expect("animation task");
    }
}
