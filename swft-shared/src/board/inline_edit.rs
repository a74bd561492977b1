/// Inline edit state machine
///
/// Editable regions (task title, description, section title and the add
/// forms) commit when focus leaves them and cancel on Escape:
///
/// ```text
/// Idle --begin--> Editing { original, draft }
/// Editing --blur / click_outside--> Idle   => Commit(draft) | Unchanged
/// Editing --escape-->               Idle   => Cancel
/// ```
///
/// Events arriving while idle produce no outcome.

/// Current state of an editable field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InlineEdit {
    #[default]
    Idle,
    Editing { original: String, draft: String },
}

/// What the caller should do after an edit ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Submit the new value
    Commit(String),
    /// Draft equals the original; nothing to submit
    Unchanged,
    /// Discard the draft
    Cancel,
}

impl InlineEdit {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Enters editing with the draft seeded from `original`
    pub fn begin(&mut self, original: impl Into<String>) {
        let original = original.into();
        *self = Self::Editing {
            draft: original.clone(),
            original,
        };
    }

    /// Replaces the draft; ignored while idle
    pub fn input(&mut self, value: impl Into<String>) {
        if let Self::Editing { draft, .. } = self {
            *draft = value.into();
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Self::Editing { draft, .. } => Some(draft),
            Self::Idle => None,
        }
    }

    pub fn blur(&mut self) -> Option<EditOutcome> {
        self.finish()
    }

    pub fn click_outside(&mut self) -> Option<EditOutcome> {
        self.finish()
    }

    pub fn escape(&mut self) -> Option<EditOutcome> {
        match std::mem::take(self) {
            Self::Editing { .. } => Some(EditOutcome::Cancel),
            Self::Idle => None,
        }
    }

    fn finish(&mut self) -> Option<EditOutcome> {
        match std::mem::take(self) {
            Self::Editing { original, draft } if draft == original => Some(EditOutcome::Unchanged),
            Self::Editing { draft, .. } => Some(EditOutcome::Commit(draft)),
            Self::Idle => None,
        }
    }
}
