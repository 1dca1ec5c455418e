use colored::{ Color, Colorize };
use log::debug;
use std::io::{ self, Stdout, Write };

use super::{ Bubble, ChatView };
use crate::expand::ExpandState;
use crate::markup;
use crate::models::chat::Role;
use crate::theme::Theme;

const PROMPT: &str = "you> ";

pub struct TerminalView<W: Write + Send = Stdout> {
    out: W,
    theme: Theme,
    preview_len: usize,
    expand: ExpandState,
    bubbles: Vec<Bubble>,
}

impl TerminalView<Stdout> {
    pub fn stdout(theme: Theme, preview_len: usize) -> Self {
        Self::new(io::stdout(), theme, preview_len)
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, theme: Theme, preview_len: usize) -> Self {
        Self {
            out,
            theme,
            preview_len,
            expand: ExpandState::new(),
            bubbles: Vec::new(),
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        let line = format!("[theme: {}] {}", theme.as_str(), theme.icon());
        self.emit(&line);
    }

    /// Flips a long bubble between preview and full text and prints it again.
    /// Returns `None` when no bubble has that index.
    pub fn toggle_expand(&mut self, index: usize) -> Option<&'static str> {
        let bubble = self.bubbles.get(index)?.clone();
        self.expand.toggle(index);
        self.print_bubble(&bubble);
        Some(self.expand.label(index))
    }

    pub fn notice(&mut self, text: &str) {
        let line = text.dimmed().to_string();
        self.emit(&line);
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            debug!("Terminal write failed: {}", e);
        }
    }

    fn role_color(&self, role: Role) -> Color {
        match (self.theme, role) {
            (Theme::Light, Role::User) => Color::Blue,
            (Theme::Light, Role::Bot) => Color::Magenta,
            (Theme::Dark, Role::User) => Color::BrightCyan,
            (Theme::Dark, Role::Bot) => Color::BrightYellow,
        }
    }

    fn print_bubble(&mut self, bubble: &Bubble) {
        let label = match bubble.role {
            Role::User => "you",
            Role::Bot => "bot",
        };
        let label = format!("[{}] {}", bubble.index, label).color(self.role_color(bubble.role));

        let long = bubble.text.chars().count() > self.preview_len;
        let body = if long && !self.expand.is_expanded(bubble.index) {
            let preview: String = bubble.text.chars().take(self.preview_len).collect();
            format!(
                "{}\u{2026} ({}: /more {})",
                markup::to_terminal(&markup::tokenize(&preview)),
                self.expand.label(bubble.index),
                bubble.index
            )
        } else if long {
            format!(
                "{} ({}: /more {})",
                markup::to_terminal(&bubble.spans),
                self.expand.label(bubble.index),
                bubble.index
            )
        } else {
            markup::to_terminal(&bubble.spans)
        };

        let line = format!("{}: {}", label, body);
        self.emit(&line);
    }
}

impl<W: Write + Send> ChatView for TerminalView<W> {
    fn append_bubble(&mut self, bubble: &Bubble) {
        self.bubbles.push(bubble.clone());
        self.print_bubble(bubble);
    }

    fn clear_bubbles(&mut self) {
        self.bubbles.clear();
        self.expand.clear();
        let line = "--- new conversation ---".dimmed().to_string();
        self.emit(&line);
    }

    fn bubble_count(&self) -> usize {
        self.bubbles.len()
    }

    fn scroll_to_latest(&mut self) {
        if let Err(e) = self.out.flush() {
            debug!("Terminal flush failed: {}", e);
        }
    }

    fn clear_input(&mut self) {
        // the line was already consumed from stdin
    }

    fn focus_input(&mut self) {
        if let Err(e) = write!(self.out, "{}", PROMPT).and_then(|_| self.out.flush()) {
            debug!("Terminal write failed: {}", e);
        }
    }
}
