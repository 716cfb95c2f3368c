//! Per-target capture records and lifecycle.

use crate::config::TypingConfig;
use crate::error::{TypingError, TypingResult};
use crate::markup::parse_markup;
use crate::skeleton::Skeleton;
use crate::Typewriter;

/// Lifecycle of a typing target. Transitions only move forward, one step
/// at a time, and `Done` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetState {
    /// Original content recorded
    Captured,
    /// Waiting for its turn, styled as pending
    Pending,
    /// Characters are being revealed
    Revealing,
    /// Fully revealed and settled
    Done,
}

impl TargetState {
    /// The state that follows this one, if any.
    pub fn next(self) -> Option<TargetState> {
        match self {
            TargetState::Captured => Some(TargetState::Pending),
            TargetState::Pending => Some(TargetState::Revealing),
            TargetState::Revealing => Some(TargetState::Done),
            TargetState::Done => None,
        }
    }
}

/// What was recorded about a target before animation started.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureRecord {
    /// Serialized inner markup at capture time
    pub original_markup: String,
    /// Computed display value at capture time
    pub original_display: String,
}

impl CaptureRecord {
    pub fn new(original_markup: impl Into<String>, original_display: impl Into<String>) -> Self {
        Self {
            original_markup: original_markup.into(),
            original_display: original_display.into(),
        }
    }
}

/// A captured element together with its lifecycle state.
#[derive(Clone, Debug)]
pub struct TypingTarget {
    record: CaptureRecord,
    state: TargetState,
}

impl TypingTarget {
    /// Start a target's lifecycle from a capture record.
    pub fn capture(record: CaptureRecord) -> Self {
        Self {
            record,
            state: TargetState::Captured,
        }
    }

    #[inline]
    pub fn record(&self) -> &CaptureRecord {
        &self.record
    }

    #[inline]
    pub fn state(&self) -> TargetState {
        self.state
    }

    /// Move from `Captured` to `Pending`.
    pub fn mark_pending(&mut self) -> TypingResult<()> {
        self.advance(TargetState::Pending)
    }

    /// Parse the captured markup and move from `Pending` to `Revealing`.
    ///
    /// Returns the skeleton to mount and a typewriter primed with its
    /// fragments. The state is unchanged when parsing fails.
    pub fn begin_reveal(&mut self, config: &TypingConfig) -> TypingResult<(Skeleton, Typewriter)> {
        if self.state != TargetState::Pending {
            return Err(TypingError::InvalidTransition {
                from: self.state,
                to: TargetState::Revealing,
            });
        }
        let markup = parse_markup(&self.record.original_markup)?;
        let skeleton = Skeleton::build(&markup, &config.classes.art);
        let typewriter = Typewriter::new(skeleton.fragments.clone(), config);
        self.advance(TargetState::Revealing)?;
        Ok((skeleton, typewriter))
    }

    /// Move from `Revealing` to `Done`.
    pub fn finish(&mut self) -> TypingResult<()> {
        self.advance(TargetState::Done)
    }

    fn advance(&mut self, to: TargetState) -> TypingResult<()> {
        if self.state.next() != Some(to) {
            return Err(TypingError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        log::debug!("typing target {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(markup: &str) -> TypingTarget {
        TypingTarget::capture(CaptureRecord::new(markup, "block"))
    }

    #[test]
    fn test_forward_lifecycle() {
        let config = TypingConfig::default();
        let mut t = target("<span>Hi</span>");
        assert_eq!(t.state(), TargetState::Captured);

        t.mark_pending().unwrap();
        assert_eq!(t.state(), TargetState::Pending);

        let (skeleton, typewriter) = t.begin_reveal(&config).unwrap();
        assert_eq!(t.state(), TargetState::Revealing);
        assert_eq!(skeleton.slot_count(), 1);
        assert_eq!(typewriter.fragment_count(), 1);

        t.finish().unwrap();
        assert_eq!(t.state(), TargetState::Done);
    }

    #[test]
    fn test_no_skipping() {
        let config = TypingConfig::default();
        let mut t = target("x");
        assert!(matches!(
            t.begin_reveal(&config),
            Err(TypingError::InvalidTransition {
                from: TargetState::Captured,
                to: TargetState::Revealing
            })
        ));
        assert!(t.finish().is_err());
        assert_eq!(t.state(), TargetState::Captured);
    }

    #[test]
    fn test_done_is_terminal() {
        let config = TypingConfig::default();
        let mut t = target("x");
        t.mark_pending().unwrap();
        t.begin_reveal(&config).unwrap();
        t.finish().unwrap();

        assert!(t.mark_pending().is_err());
        assert!(t.finish().is_err());
        assert_eq!(TargetState::Done.next(), None);
    }
}
