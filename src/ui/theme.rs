use ratatui::style::{Color, Modifier, Style};

use crate::packages::InstallStatus;
use crate::vim::VimMode;

/// Colors for the wizard. Everything else derives a `Style` from these.
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,
    pub info: Color,
    pub text: Color,
    pub background: Color,
    pub error: Color,
    pub done: Color,
    pub frame: Color,
    pub dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Yellow,
            info: Color::Cyan,
            text: Color::White,
            background: Color::Reset,
            error: Color::Red,
            done: Color::Green,
            frame: Color::DarkGray,
            dim: Color::DarkGray,
        }
    }
}

impl Theme {
    fn fg(color: Color) -> Style {
        Style::default().fg(color)
    }

    pub fn style(&self) -> Style {
        Self::fg(self.text).bg(self.background)
    }

    pub fn primary_style(&self) -> Style {
        Self::fg(self.accent)
    }

    pub fn secondary_style(&self) -> Style {
        Self::fg(self.info)
    }

    pub fn error_style(&self) -> Style {
        Self::fg(self.error)
    }

    pub fn success_style(&self) -> Style {
        Self::fg(self.done)
    }

    pub fn border_style(&self) -> Style {
        Self::fg(self.frame)
    }

    pub fn muted_style(&self) -> Style {
        Self::fg(self.dim)
    }

    pub fn mode_style(&self, mode: VimMode) -> Style {
        let color = match mode {
            VimMode::Normal => self.info,
            VimMode::Command => self.accent,
        };
        Self::fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn status_style(&self, status: InstallStatus) -> Style {
        match status {
            InstallStatus::Unknown => self.muted_style(),
            InstallStatus::Installed => self.success_style().add_modifier(Modifier::BOLD),
            InstallStatus::NotInstalled => self.secondary_style(),
        }
    }

    /// Step bar segment: completed steps are green, the active one inverted
    pub fn step_style(&self, idx: usize, active: usize) -> Style {
        if idx == active {
            self.primary_style()
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if idx < active {
            self.success_style()
        } else {
            self.muted_style()
        }
    }

    /// Footer button; a disabled button is drawn dim
    pub fn button_style(&self, enabled: bool, primary: bool) -> Style {
        let base = match (enabled, primary) {
            (false, _) => self.muted_style(),
            (true, true) => self.primary_style().add_modifier(Modifier::BOLD),
            (true, false) => self.secondary_style(),
        };
        base.add_modifier(Modifier::REVERSED)
    }
}
