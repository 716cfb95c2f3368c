//! Serial driver that reveals every typing target in registration order.
//!
//! The driver is written against the [`TypingHost`] trait so it can run
//! over a live browser document (see the `web` feature) or over any other
//! backend, including a recording fake with a virtual clock.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use crate::animation::CaretPlacement;
use crate::config::TypingConfig;
use crate::error::{TypingError, TypingResult};
use crate::skeleton::Skeleton;
use crate::target::{CaptureRecord, TypingTarget};
use crate::toggle::ToggleGate;

/// Cooperative cancellation flag checked before each target and after
/// every animation frame. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Return `Err(TypingError::Cancelled)` once cancelled.
    pub fn check(&self) -> TypingResult<()> {
        if self.is_cancelled() {
            Err(TypingError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Document backend the sequence drives.
///
/// Implement this trait for your rendering surface (a browser DOM, a
/// terminal, a test recorder). Text positions are addressed by fragment
/// index, which is the slot numbering of the mounted [`Skeleton`].
///
/// No `Send` bounds: everything runs on one cooperative thread.
pub trait TypingHost {
    /// Handle to one element in the document
    type Target;

    /// Record the element's current markup and computed display value.
    fn capture(&self, target: &Self::Target) -> TypingResult<CaptureRecord>;

    /// Apply the waiting-to-type visual state.
    fn show_pending(&self, target: &Self::Target, record: &CaptureRecord);

    /// Replace the element's content with the skeleton's empty structure,
    /// switch it from pending to revealing and reassert the captured display.
    fn mount_skeleton(
        &self,
        target: &Self::Target,
        record: &CaptureRecord,
        skeleton: &Skeleton,
    ) -> TypingResult<()>;

    /// Append text to the output of one fragment.
    fn append_text(&self, target: &Self::Target, fragment: usize, text: &str) -> TypingResult<()>;

    /// Move, hide or start retiring the caret.
    fn place_caret(&self, target: &Self::Target, caret: CaretPlacement) -> TypingResult<()>;

    /// Remove the caret, clear the revealing state and the display override.
    fn settle(&self, target: &Self::Target) -> TypingResult<()>;

    /// Put the original markup back and clear every typing state.
    fn restore(&self, target: &Self::Target, record: &CaptureRecord);

    /// Resolve at the next display frame.
    fn next_frame(&self) -> impl Future<Output = ()>;

    /// Resolve after `ms` milliseconds.
    fn sleep(&self, ms: u32) -> impl Future<Output = ()>;
}

/// What happened to one target during a run.
#[derive(Debug)]
pub enum TargetOutcome {
    Revealed,
    Failed(TypingError),
    /// Cancelled while in flight; original markup restored
    Cancelled,
    /// The run was cancelled before this target's turn
    NotStarted,
}

/// Result of a sequence run, one outcome per target in order.
#[derive(Debug, Default)]
pub struct SequenceReport {
    pub outcomes: Vec<TargetOutcome>,
    /// Whether this run opened the toggle gate
    pub toggles_activated: bool,
}

impl SequenceReport {
    pub fn revealed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TargetOutcome::Revealed))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &TypingError)> {
        self.outcomes.iter().enumerate().filter_map(|(i, o)| match o {
            TargetOutcome::Failed(err) => Some((i, err)),
            _ => None,
        })
    }

    pub fn was_cancelled(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, TargetOutcome::Cancelled | TargetOutcome::NotStarted))
    }
}

/// Reveals targets strictly one at a time.
///
/// ## Example
///
/// ```rust,ignore
/// use typeout_core::{CancellationToken, Sequence, ToggleGate, TypingConfig};
///
/// let sequence = Sequence::new(TypingConfig::default());
/// let gate = ToggleGate::new();
/// let report = sequence.run(&host, &elements, &gate, &CancellationToken::new()).await;
/// assert!(gate.is_active());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    config: TypingConfig,
}

impl Sequence {
    pub fn new(config: TypingConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &TypingConfig {
        &self.config
    }

    /// Capture every target, then reveal them in order.
    ///
    /// A target that fails is restored and recorded; the rest still run.
    /// When the run completes without cancellation the toggle gate is
    /// opened, never earlier.
    pub async fn run<H: TypingHost>(
        &self,
        host: &H,
        targets: &[H::Target],
        gate: &ToggleGate,
        cancel: &CancellationToken,
    ) -> SequenceReport {
        let prepared: Vec<TypingResult<TypingTarget>> =
            targets.iter().map(|handle| prepare(host, handle)).collect();

        let total = targets.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, (handle, prepared)) in targets.iter().zip(prepared).enumerate() {
            let mut target = match prepared {
                Ok(target) => target,
                Err(err) => {
                    log::warn!("skipping typing target {}: {}", index, err);
                    outcomes.push(TargetOutcome::Failed(err));
                    continue;
                }
            };

            if cancel.is_cancelled() {
                host.restore(handle, target.record());
                outcomes.push(TargetOutcome::NotStarted);
                continue;
            }

            log::debug!("revealing typing target {} of {}", index + 1, total);
            match self.reveal(host, handle, &mut target, cancel).await {
                Ok(()) => outcomes.push(TargetOutcome::Revealed),
                Err(TypingError::Cancelled) => {
                    log::debug!("typing cancelled during target {}", index);
                    host.restore(handle, target.record());
                    outcomes.push(TargetOutcome::Cancelled);
                    continue;
                }
                Err(err) => {
                    log::warn!("typing target {} failed: {}", index, err);
                    host.restore(handle, target.record());
                    outcomes.push(TargetOutcome::Failed(err));
                }
            }

            host.sleep(self.config.element_pause_ms).await;
        }

        let toggles_activated = !cancel.is_cancelled() && gate.activate();
        if toggles_activated {
            log::debug!("typing sequence complete, toggles active");
        }

        SequenceReport {
            outcomes,
            toggles_activated,
        }
    }

    /// Reveal a single pending target to completion.
    pub async fn reveal<H: TypingHost>(
        &self,
        host: &H,
        handle: &H::Target,
        target: &mut TypingTarget,
        cancel: &CancellationToken,
    ) -> TypingResult<()> {
        host.sleep(self.config.start_delay_ms).await;
        cancel.check()?;

        let (skeleton, mut typewriter) = target.begin_reveal(&self.config)?;
        host.mount_skeleton(handle, target.record(), &skeleton)?;

        loop {
            host.next_frame().await;
            cancel.check()?;

            let outcome = typewriter.tick();
            for append in &outcome.appends {
                host.append_text(handle, append.fragment, &append.text)?;
            }
            host.place_caret(handle, outcome.caret)?;
            if outcome.finished {
                break;
            }
        }

        host.sleep(self.config.retire_delay_ms).await;
        host.settle(handle)?;
        target.finish()
    }
}

fn prepare<H: TypingHost>(host: &H, handle: &H::Target) -> TypingResult<TypingTarget> {
    let record = host.capture(handle)?;
    let mut target = TypingTarget::capture(record);
    target.mark_pending()?;
    host.show_pending(handle, target.record());
    Ok(target)
}
