//! Viewport-driven choice between the compact and full greeting.

/// Which greeting variant should be attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Narrow viewports (phones)
    Compact,
    /// Wide viewports (desktops)
    Full,
}

impl Layout {
    /// Pick the layout for a viewport width.
    ///
    /// ```rust
    /// use typeout_core::Layout;
    ///
    /// assert_eq!(Layout::for_width(899.0, 900.0), Layout::Compact);
    /// assert_eq!(Layout::for_width(900.0, 900.0), Layout::Full);
    /// ```
    pub fn for_width(width: f64, threshold: f64) -> Self {
        if width < threshold {
            Layout::Compact
        } else {
            Layout::Full
        }
    }

    /// The other variant.
    pub fn other(self) -> Self {
        match self {
            Layout::Compact => Layout::Full,
            Layout::Full => Layout::Compact,
        }
    }
}

/// A swap to perform: detach one variant (leaving a placeholder) and
/// attach the other in its placeholder's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapAction {
    pub detach: Layout,
    pub attach: Layout,
}

/// Tracks which greeting variant is attached so that exactly one is
/// present after every update.
#[derive(Clone, Debug)]
pub struct ResponsiveSwap {
    threshold: f64,
    /// Variants currently attached; both start attached as authored
    compact_attached: bool,
    full_attached: bool,
}

impl ResponsiveSwap {
    /// Start with both variants attached, as authored in the page.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            compact_attached: true,
            full_attached: true,
        }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_attached(&self, layout: Layout) -> bool {
        match layout {
            Layout::Compact => self.compact_attached,
            Layout::Full => self.full_attached,
        }
    }

    /// The attached variant, if exactly one is attached.
    pub fn current(&self) -> Option<Layout> {
        match (self.compact_attached, self.full_attached) {
            (true, false) => Some(Layout::Compact),
            (false, true) => Some(Layout::Full),
            _ => None,
        }
    }

    /// Compute the detach/attach steps for a new viewport width and record
    /// them as applied.
    ///
    /// Detaching comes first so that a variant is only re-attached through
    /// a placeholder left by an earlier detach.
    ///
    /// ```rust
    /// use typeout_core::{Layout, ResponsiveSwap};
    ///
    /// let mut swap = ResponsiveSwap::new(900.0);
    /// let steps = swap.update(1200.0);
    /// assert_eq!(steps.detach, Some(Layout::Compact));
    /// assert_eq!(steps.attach, None);
    /// assert_eq!(swap.current(), Some(Layout::Full));
    ///
    /// let steps = swap.update(600.0);
    /// assert_eq!(steps.detach, Some(Layout::Full));
    /// assert_eq!(steps.attach, Some(Layout::Compact));
    /// ```
    pub fn update(&mut self, width: f64) -> SwapSteps {
        let wanted = Layout::for_width(width, self.threshold);
        let unwanted = wanted.other();

        let detach = self.is_attached(unwanted).then_some(unwanted);
        let attach = (!self.is_attached(wanted)).then_some(wanted);

        self.set_attached(unwanted, false);
        self.set_attached(wanted, true);
        SwapSteps { detach, attach }
    }

    fn set_attached(&mut self, layout: Layout, attached: bool) {
        match layout {
            Layout::Compact => self.compact_attached = attached,
            Layout::Full => self.full_attached = attached,
        }
    }
}

/// Steps produced by [`ResponsiveSwap::update`]; either may be empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapSteps {
    pub detach: Option<Layout>,
    pub attach: Option<Layout>,
}

impl SwapSteps {
    /// Whether the document needs no change.
    pub fn is_empty(&self) -> bool {
        self.detach.is_none() && self.attach.is_none()
    }

    /// Both steps as a single swap, when both are present.
    pub fn as_swap(&self) -> Option<SwapAction> {
        match (self.detach, self.attach) {
            (Some(detach), Some(attach)) => Some(SwapAction { detach, attach }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        assert_eq!(Layout::for_width(0.0, 900.0), Layout::Compact);
        assert_eq!(Layout::for_width(899.9, 900.0), Layout::Compact);
        assert_eq!(Layout::for_width(900.0, 900.0), Layout::Full);
        assert_eq!(Layout::for_width(2560.0, 900.0), Layout::Full);
    }

    #[test]
    fn test_startup_narrow() {
        let mut swap = ResponsiveSwap::new(900.0);
        assert_eq!(swap.current(), None);

        let steps = swap.update(375.0);
        assert_eq!(steps.detach, Some(Layout::Full));
        assert_eq!(steps.attach, None);
        assert_eq!(swap.current(), Some(Layout::Compact));
    }

    #[test]
    fn test_resize_without_crossing_is_noop() {
        let mut swap = ResponsiveSwap::new(900.0);
        swap.update(1000.0);
        let steps = swap.update(1400.0);
        assert!(steps.is_empty());
        assert_eq!(swap.current(), Some(Layout::Full));
    }

    #[test]
    fn test_exactly_one_attached_after_any_update() {
        let mut swap = ResponsiveSwap::new(900.0);
        for width in [1200.0, 300.0, 899.0, 900.0, 901.0, 100.0, 5000.0] {
            swap.update(width);
            assert_eq!(swap.current(), Some(Layout::for_width(width, 900.0)));
        }
    }

    #[test]
    fn test_crossing_produces_swap() {
        let mut swap = ResponsiveSwap::new(900.0);
        swap.update(375.0);
        let steps = swap.update(1280.0);
        assert_eq!(
            steps.as_swap(),
            Some(SwapAction {
                detach: Layout::Compact,
                attach: Layout::Full
            })
        );
    }
}
