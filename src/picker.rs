// Selection state for the candidate list.

pub const CUSTOM_MESSAGE_LABEL: &str = "Edit custom message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Candidate { index: usize, text: String },
    Custom,
}

impl Selection {
    /// Text the editor starts from.
    pub fn initial_text(&self) -> &str {
        match self {
            Selection::Candidate { text, .. } => text,
            Selection::Custom => "",
        }
    }
}

/// Candidates followed by one trailing "custom message" row.
#[derive(Debug, Clone)]
pub struct Picker {
    candidates: Vec<String>,
    selected: usize,
}

impl Picker {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn row_count(&self) -> usize {
        self.candidates.len() + 1
    }

    /// Label shown for `row`.
    pub fn label(&self, row: usize) -> &str {
        self.candidates
            .get(row)
            .map(String::as_str)
            .unwrap_or(CUSTOM_MESSAGE_LABEL)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.row_count() {
            self.selected += 1;
        }
    }

    pub fn confirm(&self) -> Selection {
        match self.candidates.get(self.selected) {
            Some(text) => Selection::Candidate {
                index: self.selected,
                text: text.clone(),
            },
            None => Selection::Custom,
        }
    }
}
