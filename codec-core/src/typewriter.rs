//! Typewriter reveal engine.
//!
//! A [`Reveal`] is the pure part: an iterator over the prefixes of a text,
//! one character per step. A [`Typewriter`] is one display target that owns
//! at most one reveal and releases its frames as an injected clock passes
//! each step's due time.

use std::time::Duration;

/// Default delay between characters.
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(50);

/// How a reveal discloses its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// One character per step, starting from the empty string.
    Progressive,
    /// Reduced motion: the full text as the only frame.
    Instant,
}

impl RevealMode {
    pub fn for_reduced_motion(reduced_motion: bool) -> Self {
        if reduced_motion {
            Self::Instant
        } else {
            Self::Progressive
        }
    }
}

// ---------------------------------------------------------------------------
// Reveal
// ---------------------------------------------------------------------------

/// Finite sequence of prefixes of `text`, from `""` to `text` inclusive.
///
/// Text of N characters yields N+1 frames in progressive mode and a single
/// frame in instant mode. Empty text yields one empty frame in either mode.
/// Once exhausted a reveal stays exhausted; start a new one to replay.
#[derive(Debug, Clone)]
pub struct Reveal {
    text: String,
    /// Byte offset of each frame's end, in emission order.
    ends: Vec<usize>,
    cursor: usize,
}

impl Reveal {
    pub fn new(text: &str, mode: RevealMode) -> Self {
        let ends = match mode {
            RevealMode::Instant => vec![text.len()],
            RevealMode::Progressive => std::iter::once(0)
                .chain(text.char_indices().map(|(i, c)| i + c.len_utf8()))
                .collect(),
        };
        Self {
            text: text.to_string(),
            ends,
            cursor: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total number of frames this reveal produces.
    pub fn frame_count(&self) -> usize {
        self.ends.len()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.ends.len()
    }

    /// Advance one step without allocating; returns the new frame.
    pub fn step(&mut self) -> Option<&str> {
        let end = *self.ends.get(self.cursor)?;
        self.cursor += 1;
        Some(&self.text[..end])
    }
}

impl Iterator for Reveal {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.step().map(str::to_string)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ends.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Reveal {}

// ---------------------------------------------------------------------------
// Typewriter (display target)
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ActiveReveal {
    reveal: Reveal,
    next_due: Duration,
}

/// A single dialogue display fed by one reveal at a time.
///
/// Starting a reveal discards the previous one and resets the display before
/// the new reveal's first frame, so stale text is never appended to.
#[derive(Debug)]
pub struct Typewriter {
    delay: Duration,
    active: Option<ActiveReveal>,
    displayed: String,
    target: String,
    /// Incremented on every start; identifies the reveal a frame came from.
    generation: u64,
}

impl Typewriter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            active: None,
            displayed: String::new(),
            target: String::new(),
            generation: 0,
        }
    }

    /// Begin revealing `text` at time `now`. Returns the new generation.
    pub fn start(&mut self, text: &str, mode: RevealMode, now: Duration) -> u64 {
        self.cancel();
        self.generation += 1;
        self.displayed.clear();
        self.target = text.to_string();

        let mut reveal = Reveal::new(text, mode);
        if let Some(first) = reveal.step() {
            self.displayed.push_str(first);
        }
        if !reveal.is_finished() {
            self.active = Some(ActiveReveal {
                reveal,
                next_due: now + self.delay,
            });
        }
        self.generation
    }

    /// Release every frame due at or before `now`. Returns how many were shown.
    pub fn advance(&mut self, now: Duration) -> usize {
        let mut emitted = 0;
        while let Some(active) = self.active.as_mut() {
            if now < active.next_due {
                break;
            }
            if let Some(frame) = active.reveal.step() {
                self.displayed.clear();
                self.displayed.push_str(frame);
                emitted += 1;
                active.next_due += self.delay;
            }
            if active.reveal.is_finished() {
                self.active = None;
            }
        }
        emitted
    }

    /// Drop the in-flight reveal. The display keeps its current frame and no
    /// later frame of that reveal is ever shown.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Jump straight to the full text of the current reveal.
    pub fn skip(&mut self) {
        if self.active.take().is_some() {
            self.displayed.clone_from(&self.target);
        }
    }

    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    /// Full text of the most recent reveal.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_revealing(&self) -> bool {
        self.active.is_some()
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: Duration = Duration::from_millis(50);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn progressive_reveal_yields_every_prefix() {
        let frames: Vec<String> = Reveal::new("abc", RevealMode::Progressive).collect();
        assert_eq!(frames, vec!["", "a", "ab", "abc"]);
    }

    #[test]
    fn progressive_frames_extend_by_one_char() {
        let text = "Codec online.";
        let frames: Vec<String> = Reveal::new(text, RevealMode::Progressive).collect();
        assert_eq!(frames.len(), text.chars().count() + 1);
        for pair in frames.windows(2) {
            assert!(pair[1].starts_with(pair[0].as_str()));
            assert_eq!(pair[1].chars().count(), pair[0].chars().count() + 1);
        }
        assert_eq!(frames.last().map(String::as_str), Some(text));
    }

    #[test]
    fn instant_reveal_yields_full_text_once() {
        let frames: Vec<String> = Reveal::new("abc", RevealMode::Instant).collect();
        assert_eq!(frames, vec!["abc"]);
    }

    #[test]
    fn empty_text_yields_single_empty_frame() {
        for mode in [RevealMode::Progressive, RevealMode::Instant] {
            let frames: Vec<String> = Reveal::new("", mode).collect();
            assert_eq!(frames, vec![""]);
        }
    }

    #[test]
    fn multibyte_text_steps_by_character() {
        let frames: Vec<String> = Reveal::new("é⚡", RevealMode::Progressive).collect();
        assert_eq!(frames, vec!["", "é", "é⚡"]);
    }

    #[test]
    fn exhausted_reveal_stays_exhausted() {
        let mut reveal = Reveal::new("x", RevealMode::Progressive);
        assert_eq!(reveal.len(), 2);
        reveal.by_ref().for_each(drop);
        assert!(reveal.is_finished());
        assert_eq!(reveal.next(), None);
        assert_eq!(reveal.len(), 0);
    }

    #[test]
    fn typewriter_releases_frames_on_schedule() {
        let mut tw = Typewriter::new(D);
        tw.start("hey", RevealMode::Progressive, ms(0));
        assert_eq!(tw.displayed(), "");
        assert!(tw.is_revealing());

        assert_eq!(tw.advance(ms(49)), 0);
        assert_eq!(tw.displayed(), "");

        assert_eq!(tw.advance(ms(50)), 1);
        assert_eq!(tw.displayed(), "h");

        assert_eq!(tw.advance(ms(149)), 1);
        assert_eq!(tw.displayed(), "he");

        assert_eq!(tw.advance(ms(150)), 1);
        assert_eq!(tw.displayed(), "hey");
        assert!(!tw.is_revealing());

        assert_eq!(tw.advance(ms(1_000)), 0);
    }

    #[test]
    fn late_poll_catches_up_in_one_call() {
        let mut tw = Typewriter::new(D);
        tw.start("abcd", RevealMode::Progressive, ms(0));
        assert_eq!(tw.advance(ms(10_000)), 4);
        assert_eq!(tw.displayed(), "abcd");
    }

    #[test]
    fn instant_mode_completes_on_start() {
        let mut tw = Typewriter::new(D);
        tw.start("full text", RevealMode::Instant, ms(0));
        assert_eq!(tw.displayed(), "full text");
        assert!(!tw.is_revealing());
    }

    #[test]
    fn restart_resets_display_and_never_shows_old_text() {
        let mut tw = Typewriter::new(D);
        tw.start("old message", RevealMode::Progressive, ms(0));
        tw.advance(ms(150));
        assert_eq!(tw.displayed(), "old");

        let gen = tw.start("new", RevealMode::Progressive, ms(150));
        assert_eq!(gen, 2);
        assert_eq!(tw.displayed(), "");

        let mut seen = Vec::new();
        for t in (150..=400).step_by(10) {
            tw.advance(ms(t));
            seen.push(tw.displayed().to_string());
        }
        assert!(seen.iter().all(|s| "new".starts_with(s.as_str())));
        assert_eq!(tw.displayed(), "new");
    }

    #[test]
    fn cancel_stops_further_frames() {
        let mut tw = Typewriter::new(D);
        tw.start("abc", RevealMode::Progressive, ms(0));
        tw.advance(ms(50));
        assert!(tw.cancel());
        assert_eq!(tw.advance(ms(1_000)), 0);
        assert_eq!(tw.displayed(), "a");
        assert!(!tw.cancel());
    }

    #[test]
    fn skip_jumps_to_full_text() {
        let mut tw = Typewriter::new(D);
        tw.start("abcdef", RevealMode::Progressive, ms(0));
        tw.advance(ms(100));
        tw.skip();
        assert_eq!(tw.displayed(), "abcdef");
        assert!(!tw.is_revealing());
    }

    #[test]
    fn empty_text_is_complete_immediately() {
        let mut tw = Typewriter::new(D);
        tw.start("", RevealMode::Progressive, ms(0));
        assert_eq!(tw.displayed(), "");
        assert!(!tw.is_revealing());
    }
}
