//! Collapsible sections that only respond once typing has finished.

use std::cell::Cell;
use std::rc::Rc;

/// Shared switch that arms toggle sections after the typing sequence.
///
/// Clones share state. The gate starts closed and opens exactly once.
#[derive(Clone, Debug, Default)]
pub struct ToggleGate {
    active: Rc<Cell<bool>>,
}

impl ToggleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate. Returns `true` only for the call that opened it.
    pub fn activate(&self) -> bool {
        !self.active.replace(true)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Visual state of one collapsible section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleSection {
    /// Id of the content block this header controls
    pub target_id: String,
    /// Header highlighted
    pub active: bool,
    /// Header shows its open indicator
    pub open: bool,
    /// Content block visible
    pub shown: bool,
}

impl ToggleSection {
    /// Create a collapsed section controlling `target_id`.
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            active: false,
            open: false,
            shown: false,
        }
    }

    /// Handle a click on the header.
    ///
    /// Each of the three states flips independently. Returns `false`
    /// without changing anything while the gate is closed.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use typeout_core::{ToggleGate, ToggleSection};
    ///
    /// let gate = ToggleGate::new();
    /// let mut section = ToggleSection::new("projects");
    ///
    /// assert!(!section.click(&gate));
    /// assert!(!section.shown);
    ///
    /// gate.activate();
    /// assert!(section.click(&gate));
    /// assert!(section.shown && section.open && section.active);
    /// ```
    pub fn click(&mut self, gate: &ToggleGate) -> bool {
        if !gate.is_active() {
            return false;
        }
        self.active = !self.active;
        self.open = !self.open;
        self.shown = !self.shown;
        true
    }
}
