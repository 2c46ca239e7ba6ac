#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VimMode {
    #[default]
    Normal,
    Command,
}

impl VimMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            VimMode::Normal => "NORMAL",
            VimMode::Command => "COMMAND",
        }
    }

    pub fn transition(&self, action: ModeAction) -> VimMode {
        match (self, action) {
            (VimMode::Normal, ModeAction::EnterCommand) => VimMode::Command,
            (VimMode::Command, ModeAction::Escape) => VimMode::Normal,
            (VimMode::Command, ModeAction::Execute) => VimMode::Normal,
            _ => *self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    EnterCommand,
    Escape,
    Execute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_mode_round_trip() {
        let mode = VimMode::Normal.transition(ModeAction::EnterCommand);
        assert_eq!(mode, VimMode::Command);
        assert_eq!(mode.transition(ModeAction::Execute), VimMode::Normal);
        assert_eq!(mode.transition(ModeAction::Escape), VimMode::Normal);
    }

    #[test]
    fn escape_in_normal_mode_stays_normal() {
        assert_eq!(VimMode::Normal.transition(ModeAction::Escape), VimMode::Normal);
    }
}
