use ratatui::{prelude::*, widgets::Paragraph};

use super::super::StarterApp;

pub fn draw_settings(frame: &mut Frame, area: Rect, app: &StarterApp) {
    if area.height < 6 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("Configurations")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
    );
    y += 2;

    let enabled = app.launch_at_startup();
    let checkbox = if enabled { "[x]" } else { "[ ]" };
    let style = if enabled {
        app.theme.success_style().add_modifier(Modifier::BOLD)
    } else {
        app.theme.style()
    };

    frame.render_widget(
        Paragraph::new(format!("> {checkbox} Launch at startup")).style(style),
        Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
    );
    y += 1;

    frame.render_widget(
        Paragraph::new("      Open this wizard automatically when you log in.")
            .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
    );
    y += 2;

    if app.is_dryrun() && y < area.y + area.height {
        frame.render_widget(
            Paragraph::new("Dry run: the preference is kept in memory only.")
                .style(app.theme.error_style()),
            Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
        );
    }

    let hint = "t/Space: toggle   Enter: finish";
    frame.render_widget(
        Paragraph::new(hint).style(app.theme.muted_style()),
        Rect::new(area.x + 2, area.y + area.height - 1, area.width.saturating_sub(4), 1),
    );
}
