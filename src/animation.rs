//! Character reveal state machine driven by virtual-clock ticks.

use crate::config::{CaretPolicy, TypingConfig};
use crate::skeleton::TextFragment;

/// Where the caret should sit after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretPlacement {
    /// Immediately after the given fragment's output text
    After(usize),
    /// Present but not shown (art in progress)
    Hidden,
    /// Reveal finished; the caret should fade out and be removed
    Retired,
}

/// Text appended to one fragment's output during a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Append {
    pub fragment: usize,
    pub text: String,
}

/// Everything a host needs to apply after one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Appends in reveal order, at most one per fragment
    pub appends: Vec<Append>,
    pub caret: CaretPlacement,
    /// True once the cursor has passed the last fragment
    pub finished: bool,
}

impl TickOutcome {
    /// Total characters appended during the tick.
    pub fn appended_chars(&self) -> usize {
        self.appends.iter().map(|a| a.text.chars().count()).sum()
    }
}

/// Platform-agnostic reveal controller for one typing target.
///
/// Like a frame animation controller, it does not handle timing itself:
/// the caller invokes [`tick`](Typewriter::tick) once per display frame and
/// applies the returned [`TickOutcome`]. Each tick adds a fixed amount of
/// virtual time; characters are released while the accumulated time covers
/// the current fragment's per-character interval, and leftover time carries
/// across fragment boundaries.
///
/// ## Example
///
/// ```rust
/// use typeout_core::{CaretPlacement, TextFragment, TypingConfig, Typewriter};
///
/// let config = TypingConfig {
///     text_rate: 10,          // 100ms per character
///     tick_increment_ms: 16.0,
///     ..Default::default()
/// };
/// let mut typewriter = Typewriter::new(vec![TextFragment::new("Hi", false)], &config);
///
/// // 6 ticks = 96ms: nothing yet
/// for _ in 0..6 {
///     assert!(typewriter.tick().appends.is_empty());
/// }
/// // 7th tick reaches 112ms: "H"
/// let outcome = typewriter.tick();
/// assert_eq!(outcome.appends[0].text, "H");
/// assert_eq!(outcome.caret, CaretPlacement::After(0));
/// ```
#[derive(Clone, Debug)]
pub struct Typewriter {
    fragments: Vec<TextFragment>,
    text_interval_ms: f64,
    art_interval_ms: f64,
    tick_increment_ms: f64,
    caret_policy: CaretPolicy,
    skip_whitespace: bool,
    /// Fragment currently being revealed
    fragment_index: usize,
    /// Byte offset of the next character within the current fragment
    char_offset: usize,
    accumulated_ms: f64,
    ticks: u64,
}

impl Typewriter {
    /// Create a typewriter for the given fragments.
    pub fn new(fragments: Vec<TextFragment>, config: &TypingConfig) -> Self {
        Self {
            fragments,
            text_interval_ms: config.char_interval_ms(false),
            art_interval_ms: config.char_interval_ms(true),
            tick_increment_ms: config.tick_ms(),
            caret_policy: config.caret_policy,
            skip_whitespace: config.skip_whitespace_fragments,
            fragment_index: 0,
            char_offset: 0,
            accumulated_ms: 0.0,
            ticks: 0,
        }
    }

    #[inline]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    #[inline]
    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Index of the fragment in progress (equals `fragment_count()` when done).
    #[inline]
    pub fn fragment_index(&self) -> usize {
        self.fragment_index
    }

    /// Number of ticks processed so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Virtual time carried into the next tick.
    #[inline]
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.fragment_index >= self.fragments.len()
    }

    /// Text revealed so far for a fragment.
    pub fn revealed(&self, fragment: usize) -> &str {
        match self.fragments.get(fragment) {
            Some(f) if fragment < self.fragment_index => &f.text,
            Some(f) if fragment == self.fragment_index => &f.text[..self.char_offset],
            _ => "",
        }
    }

    /// Concatenated revealed text of every fragment.
    pub fn revealed_text(&self) -> String {
        (0..self.fragments.len()).map(|i| self.revealed(i)).collect()
    }

    /// Caret placement for the current position.
    pub fn caret(&self) -> CaretPlacement {
        match self.fragments.get(self.fragment_index) {
            None => CaretPlacement::Retired,
            Some(f) if self.caret_policy.shows_caret(f.is_art) => {
                CaretPlacement::After(self.fragment_index)
            }
            Some(_) => CaretPlacement::Hidden,
        }
    }

    /// Advance by one frame's worth of virtual time.
    pub fn tick(&mut self) -> TickOutcome {
        self.advance(self.tick_increment_ms)
    }

    /// Advance by an arbitrary amount of virtual time.
    pub fn advance(&mut self, elapsed_ms: f64) -> TickOutcome {
        let mut appends: Vec<Append> = Vec::new();
        if !self.is_finished() {
            self.ticks += 1;
            self.accumulated_ms += elapsed_ms;
            self.release(&mut appends);
        }
        TickOutcome {
            appends,
            caret: self.caret(),
            finished: self.is_finished(),
        }
    }

    fn release(&mut self, appends: &mut Vec<Append>) {
        while let Some(fragment) = self.fragments.get(self.fragment_index) {
            let rest = &fragment.text[self.char_offset..];
            let Some(ch) = rest.chars().next() else {
                self.next_fragment();
                continue;
            };

            if self.skip_whitespace && self.char_offset == 0 && fragment.is_blank() {
                push_append(appends, self.fragment_index, rest);
                self.next_fragment();
                continue;
            }

            let interval = if fragment.is_art {
                self.art_interval_ms
            } else {
                self.text_interval_ms
            };
            if self.accumulated_ms < interval {
                break;
            }

            let mut buf = [0u8; 4];
            push_append(appends, self.fragment_index, ch.encode_utf8(&mut buf));
            self.char_offset += ch.len_utf8();
            self.accumulated_ms -= interval;
        }
    }

    fn next_fragment(&mut self) {
        self.fragment_index += 1;
        self.char_offset = 0;
    }
}

fn push_append(appends: &mut Vec<Append>, fragment: usize, text: &str) {
    match appends.last_mut() {
        Some(last) if last.fragment == fragment => last.text.push_str(text),
        _ => appends.push(Append {
            fragment,
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(text_rate: u32, art_rate: u32, tick: f64) -> TypingConfig {
        TypingConfig {
            text_rate,
            art_rate,
            tick_increment_ms: tick,
            ..Default::default()
        }
    }

    fn run_to_end(typewriter: &mut Typewriter) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let outcome = typewriter.tick();
            let finished = outcome.finished;
            outcomes.push(outcome);
            if finished {
                return outcomes;
            }
            assert!(outcomes.len() < 100_000, "reveal never finished");
        }
    }

    #[test]
    fn test_hi_at_100ms_boundaries() {
        let mut tw = Typewriter::new(vec![TextFragment::new("Hi", false)], &config(10, 10_000, 16.0));
        let outcomes = run_to_end(&mut tw);

        // "H" at tick 7 (112ms), "i" at tick 13 (208ms)
        assert_eq!(outcomes.len(), 13);
        for (i, outcome) in outcomes.iter().enumerate() {
            let tick = i + 1;
            match tick {
                7 => assert_eq!(outcome.appends, vec![Append { fragment: 0, text: "H".into() }]),
                13 => assert_eq!(outcome.appends, vec![Append { fragment: 0, text: "i".into() }]),
                _ => assert!(outcome.appends.is_empty(), "unexpected append at tick {}", tick),
            }
        }
        let last = outcomes.last().unwrap();
        assert!(last.finished);
        assert_eq!(last.caret, CaretPlacement::Retired);
        assert_eq!(tw.revealed_text(), "Hi");
    }

    #[test]
    fn test_tick_count_matches_rate() {
        // ceil(L / (rate * tick_seconds)) for text fragments
        for len in [1usize, 5, 17, 40] {
            let text: String = "x".repeat(len);
            let mut tw = Typewriter::new(vec![TextFragment::new(text, false)], &config(10, 10_000, 16.0));
            let ticks = run_to_end(&mut tw).len();
            let expected = (len as f64 / (10.0 * 0.016)).ceil() as usize;
            assert!(
                ticks.abs_diff(expected) <= 1,
                "len {}: {} ticks, expected about {}",
                len,
                ticks,
                expected
            );
        }
    }

    #[test]
    fn test_art_reveals_in_one_tick() {
        let mut tw = Typewriter::new(vec![TextFragment::new("/\\", true)], &config(10, 10_000, 16.0));
        let outcome = tw.tick();
        assert_eq!(outcome.appended_chars(), 2);
        assert!(outcome.finished);
        assert_eq!(tw.revealed_text(), "/\\");
    }

    #[test]
    fn test_caret_hidden_during_art() {
        let art = "#".repeat(300);
        let fragments = vec![TextFragment::new(art, true), TextFragment::new("ok", false)];
        let mut tw = Typewriter::new(fragments, &config(10, 8_000, 16.0));

        // 128 art chars per tick
        let first = tw.tick();
        assert_eq!(first.appended_chars(), 128);
        assert_eq!(first.caret, CaretPlacement::Hidden);
        let second = tw.tick();
        assert_eq!(second.caret, CaretPlacement::Hidden);

        // Art finishes on the third tick; the caret moves to the text fragment
        let third = tw.tick();
        assert_eq!(third.appends[0].text.len(), 44);
        assert_eq!(third.caret, CaretPlacement::After(1));
    }

    #[test]
    fn test_caret_policies() {
        let fragments = vec![TextFragment::new("###", true), TextFragment::new("ab", false)];

        let always = TypingConfig {
            art_rate: 1,
            caret_policy: CaretPolicy::Always,
            ..Default::default()
        };
        let mut tw = Typewriter::new(fragments.clone(), &always);
        assert_eq!(tw.tick().caret, CaretPlacement::After(0));

        let never = TypingConfig {
            art_rate: 1,
            text_rate: 1,
            caret_policy: CaretPolicy::Never,
            ..Default::default()
        };
        let mut tw = Typewriter::new(fragments.clone(), &never);
        assert_eq!(tw.tick().caret, CaretPlacement::Hidden);
        assert_eq!(tw.fragment_index(), 0);

        // Past the art run, still hidden on ordinary text
        let mut tw = Typewriter::new(fragments, &never);
        let outcome = tw.advance(3000.0);
        assert_eq!(tw.fragment_index(), 1);
        assert_eq!(outcome.caret, CaretPlacement::Hidden);
        assert_eq!(tw.revealed_text(), "###");
    }

    #[test]
    fn test_degenerate_tick_increment_still_progresses() {
        for tick in [0.0, -5.0, f64::NAN] {
            let mut tw = Typewriter::new(vec![TextFragment::new("ab", false)], &config(1000, 1000, tick));
            let outcomes = run_to_end(&mut tw);
            assert!(outcomes.last().unwrap().finished);
            assert_eq!(tw.revealed_text(), "ab");
        }
    }

    #[test]
    fn test_leftover_time_carries_across_fragments() {
        let fragments = vec![TextFragment::new("a", false), TextFragment::new("b", false)];
        let mut tw = Typewriter::new(fragments, &config(10, 10_000, 16.0));

        // 112ms: "a" then 12ms carried
        for _ in 0..7 {
            tw.tick();
        }
        assert_eq!(tw.revealed_text(), "a");
        assert_eq!(tw.fragment_index(), 1);
        assert_eq!(tw.accumulated_ms(), 12.0);

        // 12 + 6 * 16 = 108ms: "b" one 100ms interval later
        for _ in 0..5 {
            tw.tick();
        }
        assert_eq!(tw.revealed_text(), "a");
        let outcome = tw.tick();
        assert_eq!(outcome.appends, vec![Append { fragment: 1, text: "b".into() }]);
        assert!(outcome.finished);
    }

    #[test]
    fn test_whitespace_fragment_revealed_whole() {
        let fragments = vec![
            TextFragment::new("\n    ", false),
            TextFragment::new("x", false),
        ];
        let mut tw = Typewriter::new(fragments, &config(10, 10_000, 16.0));

        // The blank run appears on the first tick without consuming time
        let first = tw.tick();
        assert_eq!(first.appends, vec![Append { fragment: 0, text: "\n    ".into() }]);
        assert_eq!(first.caret, CaretPlacement::After(1));
        assert_eq!(tw.accumulated_ms(), 16.0);
    }

    #[test]
    fn test_whitespace_typed_when_policy_off() {
        let fragments = vec![TextFragment::new("  ", false)];
        let cfg = TypingConfig {
            skip_whitespace_fragments: false,
            ..config(10, 10_000, 16.0)
        };
        let mut tw = Typewriter::new(fragments, &cfg);
        let outcomes = run_to_end(&mut tw);
        assert_eq!(outcomes.len(), 13);
        assert_eq!(tw.revealed_text(), "  ");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut tw = Typewriter::new(vec![TextFragment::new("héllo ✓", false)], &config(1000, 10_000, 2.0));
        let first = tw.tick();
        assert_eq!(first.appends[0].text, "hé");
        let outcomes = run_to_end(&mut tw);
        assert!(outcomes.last().unwrap().finished);
        assert_eq!(tw.revealed_text(), "héllo ✓");
    }

    #[test]
    fn test_empty_target_finishes_immediately() {
        let mut tw = Typewriter::new(Vec::new(), &TypingConfig::default());
        let outcome = tw.tick();
        assert!(outcome.finished);
        assert_eq!(outcome.caret, CaretPlacement::Retired);
        // Further ticks are no-ops
        assert!(tw.tick().appends.is_empty());
        assert_eq!(tw.ticks(), 0);
    }

    #[test]
    fn test_revealed_text_equals_source_at_any_rate() {
        let fragments = vec![
            TextFragment::new("Hello, ", false),
            TextFragment::new(" _\n(_)\n", true),
            TextFragment::new("\n", false),
            TextFragment::new("world", false),
        ];
        let source: String = fragments.iter().map(|f| f.text.as_str()).collect();
        for (text_rate, tick) in [(1, 500.0), (37, 5.0), (850, 5.0), (100_000, 16.0)] {
            let mut tw = Typewriter::new(fragments.clone(), &config(text_rate, 30_000, tick));
            run_to_end(&mut tw);
            assert_eq!(tw.revealed_text(), source);
        }
    }
}
