/// Unique identifier for each wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    Welcome,
    Explorer,
    Configurations,
}

impl StepId {
    /// Steps in the order the wizard presents them
    pub const ALL: [StepId; 3] = [StepId::Welcome, StepId::Explorer, StepId::Configurations];

    /// Step for a wizard index; `None` for the result state
    pub fn from_index(idx: usize) -> Option<StepId> {
        Self::ALL.get(idx).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepId::Welcome => "Welcome",
            StepId::Explorer => "Explorer",
            StepId::Configurations => "Configurations",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            StepId::Welcome => "\u{2302}",
            StepId::Explorer => "\u{25a3}",
            StepId::Configurations => "\u{2699}",
        }
    }
}
