use std::time::Instant;

use nullpoint_core::{
    engine::{CloseReason, Engine, PresentationSink},
    map::Tile,
    render::{Glyph, RenderBuffer},
    sequence::{Sequence, SequenceFrame},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use ratatui::{prelude::*, widgets::*};

const NEON: Color = Color::Rgb(0x48, 0xee, 0x82);
const GLITCH_CHARS: [&str; 9] = ["#", "█", "▓", "▒", "░", "▄", "▀", "▌", "▐"];
const GLITCH_CHANCE: f64 = 0.01;

/// Everything the terminal shows. Receives the engine's presentation events.
pub struct Screen {
    frame: Option<RenderBuffer>,
    cutscene: Option<(Sequence, Instant)>,
    ending: Option<(Sequence, Instant)>,
    key_pending: bool,
    messages: Vec<String>,
    inventory: Vec<String>,
    glitch: StdRng,
}

impl Screen {
    pub fn new() -> Self {
        Screen {
            frame: None,
            cutscene: None,
            ending: None,
            key_pending: false,
            messages: vec![
                "Welcome to Nullpoint.".to_string(),
                "A single pixel flickers at the edge of the screen... (d)".to_string(),
            ],
            inventory: Vec::new(),
            glitch: StdRng::from_os_rng(),
        }
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Spends the key on the ending. Without a key, says so and returns false.
    pub fn use_key(&mut self, now: Instant) -> bool {
        let Some(index) = self.inventory.iter().position(|item| item == "key") else {
            self.push_message("You don't have a key.");
            return false;
        };
        self.inventory.remove(index);
        self.ending = Some((Sequence::good_ending(), now));
        true
    }

    /// Once the ending starts it owns the screen for good.
    pub fn in_ending(&self) -> bool {
        self.ending.is_some()
    }

    /// True once the running cutscene has played to the end.
    pub fn cutscene_finished(&self, now: Instant) -> bool {
        match &self.cutscene {
            Some((sequence, started)) => {
                let elapsed = now.saturating_duration_since(*started);
                sequence.frame_at(elapsed) == SequenceFrame::Finished
            }
            None => false,
        }
    }
}

impl PresentationSink for Screen {
    fn render(&mut self, frame: &RenderBuffer) {
        self.frame = Some(frame.clone());
    }

    fn objective_acquired(&mut self) {
        self.cutscene = Some((Sequence::objective_acquired(), Instant::now()));
        self.key_pending = true;
    }

    fn session_closed(&mut self, reason: CloseReason) {
        self.frame = None;
        self.cutscene = None;
        if self.key_pending {
            self.key_pending = false;
            self.inventory.push("key".to_string());
            self.push_message("You found a mysterious key! It's now in your inventory.");
        } else if reason == CloseReason::Cancelled {
            self.push_message("The dungeon fades away.");
        }
    }
}

/// Renders the user interface.
pub fn ui(frame: &mut Frame, screen: &mut Screen, engine: &Engine, now: Instant) {
    if !engine.is_open() {
        match &screen.ending {
            Some((sequence, started)) => {
                let text = match sequence.frame_at(now.saturating_duration_since(*started)) {
                    SequenceFrame::Showing(text) => text,
                    SequenceFrame::Finished => sequence.final_text(),
                };
                render_cutscene(frame, &text);
            }
            None => render_terminal(frame, screen),
        }
        return;
    }

    if let Some((sequence, started)) = &screen.cutscene {
        let text = match sequence.frame_at(now.saturating_duration_since(*started)) {
            SequenceFrame::Showing(text) => text,
            SequenceFrame::Finished => String::new(),
        };
        render_cutscene(frame, &text);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(frame.area());

    render_map(frame, layout[0], screen);

    let help_text = Paragraph::new("Use arrow keys to move. ESC to exit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, layout[1]);
}

/// The story terminal shown while the dungeon is closed.
fn render_terminal(frame: &mut Frame, screen: &Screen) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(70),
            Constraint::Percentage(20),
            Constraint::Percentage(10),
        ])
        .split(frame.area());

    let messages: Vec<ListItem> = screen
        .messages
        .iter()
        .map(|message| ListItem::new(Line::from(message.as_str())))
        .collect();
    let skip = messages.len().saturating_sub(layout[0].height.saturating_sub(2) as usize);
    let log = List::new(messages.into_iter().skip(skip).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title("Nullpoint"));
    frame.render_widget(log, layout[0]);

    let items: Vec<Span> = screen
        .inventory
        .iter()
        .map(|item| Span::styled(format!("{item} "), Style::default().fg(Color::Yellow)))
        .collect();
    let inventory = Paragraph::new(Line::from(items))
        .block(Block::default().borders(Borders::ALL).title("Inventory"));
    frame.render_widget(inventory, layout[1]);

    let help = if screen.inventory.iter().any(|item| item == "key") {
        "Press 'u' to use the key, 'q' to quit."
    } else {
        "Press 'q' to quit."
    };
    let help_text = Paragraph::new(help)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, layout[2]);
}

fn render_cutscene(frame: &mut Frame, text: &str) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .split(area);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Span::styled(text.to_string(), Style::default().fg(NEON).bold()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        layout[1],
    );
}

/// Renders the latest projection one terminal column per map cell,
/// scrambling a few walls each frame.
fn render_map(frame: &mut Frame, area: Rect, screen: &mut Screen) {
    let Screen {
        frame: Some(buffer),
        glitch,
        ..
    } = screen
    else {
        return;
    };

    let mut lines: Vec<Line> = Vec::with_capacity(buffer.height());
    for row in buffer.rows() {
        let spans: Vec<Span> = row
            .iter()
            .map(|glyph| {
                let cell = glyph.cell().to_string();
                match glyph {
                    Glyph::Player => Span::styled(cell, Style::default().fg(Color::Red).bold()),
                    Glyph::Objective => Span::styled(cell, Style::default().fg(Color::Yellow)),
                    Glyph::Enemy(_) => Span::styled(cell, Style::default().fg(NEON)),
                    Glyph::Terrain(Tile::Wall) => {
                        let symbol = if glitch.random_bool(GLITCH_CHANCE) {
                            GLITCH_CHARS[glitch.random_range(0..GLITCH_CHARS.len())].to_string()
                        } else {
                            cell
                        };
                        Span::styled(symbol, Style::default().fg(Color::DarkGray))
                    }
                    Glyph::Terrain(Tile::Open) => Span::raw(cell),
                }
            })
            .collect();
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("???").borders(Borders::ALL));
    frame.render_widget(map_paragraph, area);
}
