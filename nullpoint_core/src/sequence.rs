//! Timed presentation sequences.
//!
//! A [`Sequence`] is a list of steps with fixed durations. Drivers sample it
//! with the time elapsed since it started and draw whatever text it reports,
//! so no timers or callbacks are involved.

use std::time::Duration;

const ESCAPE_TEXT: &str = "Without a second's hesitation you get up and run until you can \
feel a door, you use the key and get out of this nightmare.";

/// One stage of a presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Reveal `text` one character every `per_char`.
    Type { text: String, per_char: Duration },
    /// Keep showing whatever the previous step ended on.
    Hold(Duration),
    /// Blank the display for a while.
    Clear(Duration),
    /// Alternate `text` and blank `toggles` times, starting visible.
    Blink {
        text: String,
        toggles: u32,
        interval: Duration,
    },
}

impl Step {
    /// How long the step runs. Saturates at `Duration::MAX`.
    pub fn duration(&self) -> Duration {
        match self {
            Step::Type { text, per_char } => u32::try_from(text.chars().count())
                .ok()
                .and_then(|count| per_char.checked_mul(count))
                .unwrap_or(Duration::MAX),
            Step::Hold(duration) | Step::Clear(duration) => *duration,
            Step::Blink {
                toggles, interval, ..
            } => interval.checked_mul(*toggles).unwrap_or(Duration::MAX),
        }
    }

    /// Text shown `offset` into this step, given what was shown before it.
    fn text_at(&self, offset: Duration, previous: &str) -> String {
        match self {
            Step::Type { text, per_char } => {
                let shown = match per_char.as_nanos() {
                    0 => usize::MAX,
                    step => usize::try_from(offset.as_nanos() / step)
                        .unwrap_or(usize::MAX)
                        .saturating_add(1),
                };
                text.chars().take(shown).collect()
            }
            Step::Hold(_) => previous.to_string(),
            Step::Clear(_) => String::new(),
            Step::Blink { text, interval, .. } => {
                let toggle = match interval.as_nanos() {
                    0 => 0,
                    step => offset.as_nanos() / step,
                };
                if toggle % 2 == 0 {
                    text.clone()
                } else {
                    String::new()
                }
            }
        }
    }

    /// Text shown once this step has run to completion.
    fn final_text(&self, previous: &str) -> String {
        match self {
            Step::Type { text, .. } => text.clone(),
            Step::Hold(_) => previous.to_string(),
            Step::Clear(_) => String::new(),
            Step::Blink { text, toggles, .. } => {
                if *toggles % 2 == 1 {
                    text.clone()
                } else {
                    String::new()
                }
            }
        }
    }
}

/// What a sequence shows at a given moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceFrame {
    Showing(String),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Sequence { steps }
    }

    /// The presentation played when the key is picked up.
    pub fn objective_acquired() -> Self {
        let per_char = Duration::from_millis(60);
        Sequence::new(vec![
            Step::Type {
                text: "You found the ??? key".to_string(),
                per_char,
            },
            Step::Hold(Duration::from_millis(1000)),
            Step::Type {
                text: "Congratulations !!!".to_string(),
                per_char,
            },
            Step::Blink {
                text: "Congratulations !!!".to_string(),
                toggles: 6,
                interval: Duration::from_millis(500),
            },
            Step::Clear(Duration::from_millis(1000)),
        ])
    }

    /// The escape played when the key is used. Ends on the title, which
    /// stays up once the sequence has finished.
    pub fn good_ending() -> Self {
        Sequence::new(vec![
            Step::Type {
                text: ESCAPE_TEXT.to_string(),
                per_char: Duration::from_millis(50),
            },
            Step::Hold(Duration::from_millis(5000)),
            Step::Clear(Duration::from_millis(1000)),
            Step::Type {
                text: "GOOD ENDING".to_string(),
                per_char: Duration::from_millis(100),
            },
        ])
    }

    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::ZERO, |total, step| total.saturating_add(step.duration()))
    }

    /// Text left on display after the last step.
    pub fn final_text(&self) -> String {
        self.steps
            .iter()
            .fold(String::new(), |shown, step| step.final_text(&shown))
    }

    /// Samples the sequence `elapsed` after it started.
    pub fn frame_at(&self, elapsed: Duration) -> SequenceFrame {
        let mut start = Duration::ZERO;
        let mut shown = String::new();
        for step in &self.steps {
            let end = start.saturating_add(step.duration());
            if elapsed < end {
                return SequenceFrame::Showing(step.text_at(elapsed - start, &shown));
            }
            shown = step.final_text(&shown);
            start = end;
        }
        SequenceFrame::Finished
    }
}
