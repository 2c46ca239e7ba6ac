use ratatui::{prelude::*, widgets::Paragraph};

use super::super::StarterApp;

pub fn draw_result(frame: &mut Frame, area: Rect, app: &StarterApp) {
    if area.height < 8 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("All done!")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        Rect::new(area.x, y, area.width, 1),
    );
    y += 2;

    let (installed, missing, pending) = app.catalog.status_summary(&app.resolver);
    let mut lines = vec![format!(
        "{installed} of {} catalog packages are installed.",
        installed + missing + pending
    )];
    if pending > 0 {
        lines.push(format!("{pending} still being checked."));
    }
    lines.push(if app.launch_at_startup() {
        "This wizard will open when you log in.".to_string()
    } else {
        "This wizard will not open at login.".to_string()
    });

    for line in lines {
        frame.render_widget(
            Paragraph::new(line)
                .style(app.theme.style())
                .alignment(Alignment::Center),
            Rect::new(area.x, y, area.width, 1),
        );
        y += 1;
    }

    // Reset is the only way out of the result view
    let button_text = " [r] Start Over ";
    let button_width = button_text.len() as u16;
    let button_x = area.x + area.width.saturating_sub(button_width) / 2;
    let button_y = area.y + area.height - 2;

    frame.render_widget(
        Paragraph::new(button_text)
            .style(app.theme.button_style(true, true)),
        Rect::new(button_x, button_y, button_width.min(area.width), 1),
    );
}
