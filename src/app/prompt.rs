/// What a submitted prompt line is used for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PromptKind {
    /// Import a file or directory into the playlist.
    AddPath,
    /// Write a backup of every persisted slot.
    Export,
    /// Restore persisted slots from a backup.
    Import,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::AddPath => " add file or directory ",
            Self::Export => " export playlist to ",
            Self::Import => " import playlist from ",
        }
    }
}

/// Single-line text input shown over the track list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() {
            self.input.push(c);
        }
    }

    pub fn pop(&mut self) {
        self.input.pop();
    }

    /// Trimmed input with a leading `~/` expanded, or `None` when blank.
    pub fn path(&self) -> Option<std::path::PathBuf> {
        let raw = self.input.trim();
        if raw.is_empty() {
            return None;
        }
        match (raw.strip_prefix("~/"), std::env::var_os("HOME")) {
            (Some(rest), Some(home)) => Some(std::path::PathBuf::from(home).join(rest)),
            _ => Some(std::path::PathBuf::from(raw)),
        }
    }
}
