//! Character-level transition between two strings.
//!
//! A transition first deletes the displayed text down to the prefix it shares
//! with the target, pauses once, then types the rest of the target one character
//! per step. Lengths are counted in `char`s so CJK phrases animate per glyph.

/// Phase of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Removing characters past the common prefix.
    Deleting,
    /// One pause step between deleting and typing.
    ReadyToInsert,
    /// Appending characters of the target.
    Inserting,
    /// Target reached.
    Idle,
}

/// State of one transition from an origin string to a target string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionState {
    current: String,
    current_len: usize,
    target: Vec<char>,
    target_text: String,
    common_prefix_len: usize,
    stage: Stage,
}

impl TransitionState {
    /// Start a transition from `from` to `to`, in the [`Stage::Deleting`] stage.
    pub fn new(from: &str, to: &str) -> Self {
        let target: Vec<char> = to.chars().collect();
        Self {
            current: from.to_string(),
            current_len: from.chars().count(),
            common_prefix_len: common_prefix_len(from, to),
            target,
            target_text: to.to_string(),
            stage: Stage::Deleting,
        }
    }

    /// Text currently displayed.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Text being typed toward.
    pub fn target(&self) -> &str {
        &self.target_text
    }

    /// Current phase.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Number of leading characters kept from the origin.
    pub fn common_prefix_len(&self) -> usize {
        self.common_prefix_len
    }

    /// Perform one step. Returns `false` once the transition was already idle.
    pub fn advance(&mut self) -> bool {
        match self.stage {
            Stage::Deleting => self.advance_deleting(),
            Stage::ReadyToInsert => self.stage = Stage::Inserting,
            Stage::Inserting => self.advance_inserting(),
            Stage::Idle => return false,
        }
        true
    }

    fn advance_deleting(&mut self) {
        if self.current_len > self.common_prefix_len {
            self.current.pop();
            self.current_len -= 1;
        } else {
            self.stage = Stage::ReadyToInsert;
        }
    }

    fn advance_inserting(&mut self) {
        if self.current_len < self.target.len() {
            self.current.push(self.target[self.current_len]);
            self.current_len += 1;
        } else {
            self.stage = Stage::Idle;
        }
    }
}

/// Length of the prefix a transition from `from` to `to` keeps.
///
/// The raw shared prefix is shortened by one character when the target
/// continues with a space right after it, so a word that ends exactly at the
/// divergence point is retyped together with the following text.
pub fn common_prefix_len(from: &str, to: &str) -> usize {
    let to_chars: Vec<char> = to.chars().collect();
    let shared = from
        .chars()
        .zip(to_chars.iter())
        .take_while(|(a, b)| a == *b)
        .count();

    if shared > 0 && to_chars.get(shared) == Some(&' ') {
        shared - 1
    } else {
        shared
    }
}
