pub mod terminal;

use crate::markup::{ self, Span };
use crate::models::chat::Role;

pub use terminal::TerminalView;

/// A rendered message, ready to be placed in a chat container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub index: usize,
    pub role: Role,
    pub text: String,
    pub spans: Vec<Span>,
}

impl Bubble {
    pub fn new(index: usize, text: &str, role: Role) -> Self {
        Self {
            index,
            role,
            text: text.to_string(),
            spans: markup::tokenize(text),
        }
    }

    pub fn html(&self) -> String {
        format!(
            "<div class=\"chat-message {}\">{}</div>",
            self.role,
            markup::to_html(&self.spans)
        )
    }
}

/// The surface the chat widget draws on: a bubble container plus the input
/// field that feeds it.
pub trait ChatView: Send {
    /// Places the bubble after every bubble already shown.
    fn append_bubble(&mut self, bubble: &Bubble);

    fn clear_bubbles(&mut self);

    fn bubble_count(&self) -> usize;

    fn scroll_to_latest(&mut self);

    fn clear_input(&mut self);

    fn focus_input(&mut self);
}

/// Keeps everything in memory. Useful wherever no real display exists.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub bubbles: Vec<Bubble>,
    pub input: String,
    pub focused: bool,
    pub scrolled_to: Option<usize>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<(Role, String)> {
        self.bubbles.iter().map(|b| (b.role, b.text.clone())).collect()
    }
}

impl ChatView for RecordingView {
    fn append_bubble(&mut self, bubble: &Bubble) {
        self.bubbles.push(bubble.clone());
    }

    fn clear_bubbles(&mut self) {
        self.bubbles.clear();
        self.scrolled_to = None;
    }

    fn bubble_count(&self) -> usize {
        self.bubbles.len()
    }

    fn scroll_to_latest(&mut self) {
        self.scrolled_to = self.bubbles.len().checked_sub(1);
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {
        self.focused = true;
    }
}
