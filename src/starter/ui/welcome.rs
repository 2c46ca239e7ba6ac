use ratatui::{prelude::*, widgets::Paragraph};

use super::super::StarterApp;

pub fn draw_welcome(frame: &mut Frame, area: Rect, app: &StarterApp) {
    if area.height < 6 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new(app.config.general.subtitle.as_str())
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        Rect::new(area.x, y, area.width, 1),
    );
    y += 2;

    let welcome_text = [
        "This wizard walks you through getting started:",
        "",
        "  * Explore popular applications and see which are installed",
        "  * Choose whether this wizard opens when you log in",
        "",
        "Nothing is installed or removed by browsing.",
    ];

    for line in welcome_text {
        if y >= area.y + area.height {
            break;
        }
        frame.render_widget(
            Paragraph::new(line).style(app.theme.style()),
            Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
        );
        y += 1;
    }

    let hint = "Press Enter to begin";
    let hint_y = area.y + area.height - 1;
    frame.render_widget(
        Paragraph::new(hint)
            .style(app.theme.muted_style())
            .alignment(Alignment::Center),
        Rect::new(area.x, hint_y, area.width, 1),
    );
}
