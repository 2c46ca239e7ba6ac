/// Dynamic status bar state, chosen per step
#[derive(Debug, Clone, Default)]
pub struct StatusBarState {
    /// Left side hint text (e.g., "j/k: packages")
    pub left_hint: String,
    /// Right side hint text (e.g., "l/Enter: next")
    pub right_hint: String,
}

impl StatusBarState {
    /// Get hints for the welcome step
    pub fn welcome() -> Self {
        Self {
            left_hint: "t: launch at startup".to_string(),
            right_hint: "Enter: start  ?: help".to_string(),
        }
    }

    /// Get hints for the package explorer, with the number of packages still being checked
    pub fn explorer(pending: usize) -> Self {
        let left_hint = if pending > 0 {
            format!("j/k: packages  (checking {pending}...)")
        } else {
            "j/k: packages".to_string()
        };
        Self {
            left_hint,
            right_hint: "h: back  l/Enter: next".to_string(),
        }
    }

    /// Get hints for the configurations step
    pub fn configurations() -> Self {
        Self {
            left_hint: "t/Space: toggle launch at startup".to_string(),
            right_hint: "h: back  Enter: finish".to_string(),
        }
    }

    /// Get hints for the result view
    pub fn result() -> Self {
        Self {
            left_hint: "Setup complete".to_string(),
            right_hint: "r/Enter: start over  q: quit".to_string(),
        }
    }

    /// Get hints for command mode
    pub fn command_mode() -> Self {
        Self {
            left_hint: String::new(),
            right_hint: "Enter: run  Esc: cancel".to_string(),
        }
    }
}
