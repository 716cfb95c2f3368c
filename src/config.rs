//! Typing configuration, constructed once and passed to every component.

/// Smallest virtual time a frame may add.
pub const MIN_TICK_MS: f64 = 1.0;

/// How the caret behaves while a fragment is being revealed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CaretPolicy {
    /// Hide the caret while an art fragment is in progress
    #[default]
    SuppressInArt,
    /// Show the caret after every fragment, art included
    Always,
    /// Never show a caret
    Never,
}

impl CaretPolicy {
    /// Whether a caret should be shown after a fragment of this kind.
    #[inline]
    pub fn shows_caret(self, is_art: bool) -> bool {
        match self {
            CaretPolicy::SuppressInArt => !is_art,
            CaretPolicy::Always => true,
            CaretPolicy::Never => false,
        }
    }
}

/// Class names and selectors used to find and style document elements.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassNames {
    /// Selector for elements to animate, in registration order
    pub target_selector: String,
    /// Marks a preformatted-art region
    pub art: String,
    pub caret: String,
    /// Added to the caret while it fades out
    pub caret_retiring: String,
    /// Applied to targets waiting for their turn
    pub pending: String,
    /// Applied to the target being revealed
    pub revealing: String,
    pub toggle_header: String,
    /// Added to toggle headers at startup
    pub header_visible: String,
    pub header_active: String,
    pub header_open: String,
    /// Toggled on a section's content block
    pub content_shown: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            target_selector: ".typing-text".into(),
            art: "ascii-art".into(),
            caret: "typing-cursor".into(),
            caret_retiring: "typing-cursor-retire".into(),
            pending: "waiting-to-type".into(),
            revealing: "typing-animation".into(),
            toggle_header: "toggle-header".into(),
            header_visible: "visible".into(),
            header_active: "active".into(),
            header_open: "open".into(),
            content_shown: "show".into(),
        }
    }
}

/// Page layout collaborators: the responsive greeting swap and click sound.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Element id of the compact (phone) greeting
    pub compact_id: String,
    /// Element id of the full (desktop) greeting
    pub full_id: String,
    /// Viewport widths below this use the compact layout
    pub width_threshold: f64,
    pub click_sound_id: String,
    pub click_volume: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            compact_id: "PhoneaboutMeText".into(),
            full_id: "aboutMeText".into(),
            width_threshold: 900.0,
            click_sound_id: "clickSound".into(),
            click_volume: 0.25,
        }
    }
}

/// Timing and presentation parameters for the typing effect.
///
/// All fields have defaults, so a partial `typing.toml` works:
///
/// ```toml
/// text_rate = 60
/// caret_policy = "always"
///
/// [classes]
/// art = "banner"
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TypingConfig {
    /// Characters per second for ordinary text
    pub text_rate: u32,
    /// Characters per second for art fragments
    pub art_rate: u32,
    /// Virtual milliseconds added per animation frame
    pub tick_increment_ms: f64,
    /// Delay before a target's first frame
    pub start_delay_ms: u32,
    /// How long the caret fades before the target settles
    pub retire_delay_ms: u32,
    /// Pause between consecutive targets
    pub element_pause_ms: u32,
    pub caret_policy: CaretPolicy,
    /// Reveal whitespace-only fragments in one step instead of per character
    pub skip_whitespace_fragments: bool,
    pub classes: ClassNames,
    pub layout: LayoutConfig,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            text_rate: 850,
            art_rate: 30_000,
            tick_increment_ms: 5.0,
            start_delay_ms: 5,
            retire_delay_ms: 50,
            element_pause_ms: 100,
            caret_policy: CaretPolicy::default(),
            skip_whitespace_fragments: true,
            classes: ClassNames::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl TypingConfig {
    /// Parse a TOML string into a `TypingConfig`.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Milliseconds per character for a fragment of the given kind.
    ///
    /// Rates below one character per second are treated as one.
    #[inline]
    pub fn char_interval_ms(&self, is_art: bool) -> f64 {
        let rate = if is_art { self.art_rate } else { self.text_rate };
        1000.0 / f64::from(rate.max(1))
    }

    /// Virtual time per frame, at least [`MIN_TICK_MS`]. Zero, negative and
    /// NaN increments would never release a character.
    pub fn tick_ms(&self) -> f64 {
        self.tick_increment_ms.max(MIN_TICK_MS)
    }
}
