//! Typewriter - animated heading text
//!
//! Types a phrase one character at a time after a static prefix, pauses,
//! deletes back to the prefix and moves on to the next phrase. Time only
//! advances through `tick(now_ms)` so it shares the frame clock.

use serde::{Deserialize, Serialize};

use crate::core::rng::{next_unit, seed_state};

/// Guard against zero-length delays spinning forever inside one tick
const MAX_STEPS_PER_TICK: usize = 4096;
/// Gap between deleting one phrase and typing the next
const BETWEEN_PHRASES_MS: f64 = 100.0;
/// Undrained completion events kept; the oldest go first
pub const MAX_PENDING_EVENTS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypewriterConfig {
    pub phrases: Vec<String>,
    pub prefix: String,
    pub typing_speed_ms: f64,
    pub deleting_speed_ms: f64,
    pub pause_ms: f64,
    pub initial_delay_ms: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub reverse: bool,
    pub variable_speed: Option<SpeedRange>,
    /// `false` shows the first phrase at once (reduced motion)
    pub animate: bool,
    pub text_colors: Vec<String>,
    pub hide_cursor_while_typing: bool,
    pub seed: u32,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            phrases: Vec::new(),
            prefix: String::new(),
            typing_speed_ms: 50.0,
            deleting_speed_ms: 30.0,
            pause_ms: 2000.0,
            initial_delay_ms: 0.0,
            looping: true,
            reverse: false,
            variable_speed: None,
            animate: true,
            text_colors: Vec::new(),
            hide_cursor_while_typing: false,
            seed: 0x51A7_E5ED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Typing,
    Paused,
    Deleting,
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypewriterEvent {
    /// A phrase finished typing, as written before any reversal
    SentenceComplete { index: usize, phrase: String },
}

pub struct Typewriter {
    config: TypewriterConfig,
    /// Display form of each phrase (reversed in reverse mode)
    glyphs: Vec<Vec<char>>,
    index: usize,
    shown: usize,
    phase: Phase,
    next_at_ms: Option<f64>,
    started: bool,
    rng: u32,
    events: Vec<TypewriterEvent>,
}

impl Typewriter {
    pub fn new(mut config: TypewriterConfig) -> Self {
        if config.phrases.is_empty() {
            config.phrases.push(String::new());
        }
        let glyphs = config
            .phrases
            .iter()
            .map(|p| {
                let mut chars: Vec<char> = p.chars().collect();
                if config.reverse {
                    chars.reverse();
                }
                chars
            })
            .collect::<Vec<_>>();
        let rng = seed_state(config.seed);
        let mut writer = Self {
            glyphs,
            index: 0,
            shown: 0,
            phase: Phase::Typing,
            next_at_ms: None,
            started: false,
            rng,
            events: Vec::new(),
            config,
        };
        if !writer.config.animate {
            writer.shown = writer.glyphs[0].len();
            writer.phase = Phase::Done;
        }
        writer
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: TypewriterConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(Self::new(config))
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Prefix plus the visible part of the current phrase
    pub fn text(&self) -> String {
        let mut out = self.config.prefix.clone();
        out.extend(self.glyphs[self.index][..self.shown].iter());
        out
    }

    /// Characters needed to fit the longest prefix + phrase without layout shift
    pub fn reserve_width(&self) -> usize {
        let prefix = self.config.prefix.chars().count();
        self.glyphs.iter().map(|g| prefix + g.len()).max().unwrap_or(prefix)
    }

    pub fn current_color(&self) -> &str {
        let colors = &self.config.text_colors;
        if colors.is_empty() {
            "#ffffff"
        } else {
            &colors[self.index % colors.len()]
        }
    }

    pub fn cursor_hidden(&self) -> bool {
        if !self.config.hide_cursor_while_typing {
            return false;
        }
        let len = self.glyphs[self.index].len();
        match self.phase {
            Phase::Typing => self.shown > 0 && self.shown < len,
            Phase::Deleting => self.shown > 0,
            Phase::Paused | Phase::Done => false,
        }
    }

    pub fn drain_events(&mut self) -> Vec<TypewriterEvent> {
        std::mem::take(&mut self.events)
    }

    fn type_delay(&mut self) -> f64 {
        match self.config.variable_speed {
            Some(SpeedRange { min, max }) => next_unit(&mut self.rng) as f64 * (max - min) + min,
            None => self.config.typing_speed_ms,
        }
    }

    fn delete_delay(&mut self) -> f64 {
        if self.config.deleting_speed_ms > 0.0 {
            self.config.deleting_speed_ms
        } else {
            self.type_delay()
        }
    }

    fn complete_phrase(&mut self) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(TypewriterEvent::SentenceComplete {
            index: self.index,
            phrase: self.config.phrases[self.index].clone(),
        });
    }

    /// Advance to `now_ms`; returns whether the visible text changed
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if !self.started {
            self.started = true;
            if !self.config.animate {
                self.complete_phrase();
                return false;
            }
            let delay = self.config.initial_delay_ms.max(0.0) + self.type_delay();
            self.next_at_ms = Some(now_ms + delay);
        }

        let before = (self.index, self.shown);
        for _ in 0..MAX_STEPS_PER_TICK {
            match self.next_at_ms {
                Some(at) if at <= now_ms => self.step(at),
                _ => break,
            }
        }
        before != (self.index, self.shown)
    }

    fn step(&mut self, at: f64) {
        let len = self.glyphs[self.index].len();
        match self.phase {
            Phase::Typing => {
                if self.shown < len {
                    self.shown += 1;
                }
                if self.shown < len {
                    let d = self.type_delay();
                    self.next_at_ms = Some(at + d);
                    return;
                }
                self.complete_phrase();
                if !self.config.looping && self.index + 1 == self.glyphs.len() {
                    self.phase = Phase::Done;
                    self.next_at_ms = None;
                } else {
                    self.phase = Phase::Paused;
                    self.next_at_ms = Some(at + self.config.pause_ms.max(0.0));
                }
            }
            Phase::Paused => {
                self.phase = Phase::Deleting;
                let d = self.delete_delay();
                self.next_at_ms = Some(at + d);
            }
            Phase::Deleting => {
                self.shown = self.shown.saturating_sub(1);
                if self.shown > 0 {
                    let d = self.delete_delay();
                    self.next_at_ms = Some(at + d);
                    return;
                }
                self.index = (self.index + 1) % self.glyphs.len();
                self.phase = Phase::Typing;
                let gap = if self.index == 0 {
                    self.config.initial_delay_ms.max(0.0)
                } else {
                    BETWEEN_PHRASES_MS
                };
                let d = self.type_delay();
                self.next_at_ms = Some(at + gap + d);
            }
            Phase::Done => self.next_at_ms = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(phrases: &[&str]) -> Typewriter {
        Typewriter::new(TypewriterConfig {
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
            prefix: "I build ".into(),
            ..TypewriterConfig::default()
        })
    }

    #[test]
    fn types_one_char_per_interval() {
        let mut w = writer(&["apis"]);
        w.tick(0.0);
        assert_eq!(w.text(), "I build ");
        w.tick(50.0);
        assert_eq!(w.text(), "I build a");
        w.tick(150.0);
        assert_eq!(w.text(), "I build api");
    }

    #[test]
    fn completes_pauses_deletes_and_cycles() {
        let mut w = writer(&["ab", "cd"]);
        w.tick(0.0);
        w.tick(100.0);
        assert_eq!(w.text(), "I build ab");
        assert_eq!(
            w.drain_events(),
            vec![TypewriterEvent::SentenceComplete { index: 0, phrase: "ab".into() }]
        );
        assert_eq!(w.phase(), Phase::Paused);
        // pause 2000, then two deletes of 30 each
        w.tick(2100.0 + 30.0 + 30.0);
        assert_eq!(w.text(), "I build ");
        assert_eq!(w.index(), 1);
        // 100 gap + 50 per char
        w.tick(2160.0 + 100.0 + 100.0);
        assert_eq!(w.text(), "I build cd");
    }

    #[test]
    fn undrained_events_are_bounded() {
        let mut w = writer(&["ab", "cd"]);
        for i in 0..=100 {
            w.tick(i as f64 * 100_000.0);
        }
        let events = w.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        // consecutive completions alternate phrases
        for pair in events.windows(2) {
            let (TypewriterEvent::SentenceComplete { index: a, .. }, TypewriterEvent::SentenceComplete { index: b, .. }) =
                (&pair[0], &pair[1]);
            assert_ne!(a, b);
        }
        assert!(w.drain_events().is_empty());
    }

    #[test]
    fn non_looping_stops_on_last_phrase() {
        let mut w = Typewriter::new(TypewriterConfig {
            phrases: vec!["x".into()],
            looping: false,
            ..TypewriterConfig::default()
        });
        w.tick(0.0);
        w.tick(10_000.0);
        assert_eq!(w.phase(), Phase::Done);
        assert_eq!(w.text(), "x");
    }

    #[test]
    fn reduced_motion_shows_first_phrase() {
        let mut w = Typewriter::new(TypewriterConfig {
            phrases: vec!["hello".into(), "world".into()],
            animate: false,
            ..TypewriterConfig::default()
        });
        assert_eq!(w.text(), "hello");
        w.tick(0.0);
        assert_eq!(w.drain_events().len(), 1);
        w.tick(99_999.0);
        assert_eq!(w.text(), "hello");
    }

    #[test]
    fn reverse_mode_and_reserved_width() {
        let w = Typewriter::new(TypewriterConfig {
            phrases: vec!["abc".into(), "hello".into()],
            prefix: ">> ".into(),
            reverse: true,
            animate: false,
            ..TypewriterConfig::default()
        });
        assert_eq!(w.text(), ">> cba");
        assert_eq!(w.reserve_width(), 8);
    }

    #[test]
    fn initial_delay_is_respected() {
        let mut w = Typewriter::new(TypewriterConfig {
            phrases: vec!["a".into()],
            initial_delay_ms: 500.0,
            ..TypewriterConfig::default()
        });
        w.tick(0.0);
        w.tick(400.0);
        assert_eq!(w.text(), "");
        w.tick(550.0);
        assert_eq!(w.text(), "a");
    }

    #[test]
    fn variable_speed_stays_in_range() {
        let mut w = Typewriter::new(TypewriterConfig {
            phrases: vec!["abcdef".into()],
            variable_speed: Some(SpeedRange { min: 10.0, max: 20.0 }),
            ..TypewriterConfig::default()
        });
        for _ in 0..100 {
            let d = w.type_delay();
            assert!((10.0..20.0).contains(&d));
        }
    }
}
