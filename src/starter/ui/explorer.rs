use ratatui::{prelude::*, widgets::Paragraph};

use super::super::StarterApp;
use crate::packages::{InstallStatus, Package};

enum Row<'a> {
    Category { name: &'a str, description: &'a str },
    Package { index: usize, package: &'a Package },
}

pub fn draw_explorer(frame: &mut Frame, area: Rect, app: &mut StarterApp) {
    if area.height < 6 {
        return;
    }

    let mut y = area.y + 1;

    frame.render_widget(
        Paragraph::new("Packages").style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
    );
    y += 1;
    frame.render_widget(
        Paragraph::new("Install packages to set up your environment.")
            .style(app.theme.muted_style()),
        Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
    );
    y += 2;

    if app.catalog.is_empty() {
        frame.render_widget(
            Paragraph::new("No packages in the catalog.").style(app.theme.muted_style()),
            Rect::new(area.x + 2, y, area.width.saturating_sub(4), 1),
        );
        return;
    }

    let mut rows = Vec::new();
    let mut index = 0;
    for category in app.catalog.categories() {
        rows.push(Row::Category {
            name: &category.name,
            description: &category.description,
        });
        for package in &category.packages {
            rows.push(Row::Package { index, package });
            index += 1;
        }
    }

    let visible = (area.y + area.height).saturating_sub(y + 1) as usize;
    if visible == 0 {
        return;
    }

    let cursor_row = rows
        .iter()
        .position(|r| matches!(r, Row::Package { index, .. } if *index == app.package_cursor))
        .unwrap_or(0);

    // Keep the cursor in view; show the category header above the first package
    let mut scroll = app.package_scroll;
    if cursor_row < scroll + 1 {
        scroll = cursor_row.saturating_sub(1);
    } else if cursor_row >= scroll + visible {
        scroll = cursor_row + 1 - visible;
    }

    let width = area.width.saturating_sub(4);
    for row in rows.iter().skip(scroll).take(visible) {
        let line = match row {
            Row::Category { name, description } => {
                let mut spans = vec![Span::styled(
                    name.to_string(),
                    app.theme.secondary_style().add_modifier(Modifier::BOLD),
                )];
                if !description.is_empty() {
                    spans.push(Span::styled(format!("  {description}"), app.theme.muted_style()));
                }
                Line::from(spans)
            }
            Row::Package { index, package } => package_line(app, *index, package),
        };

        frame.render_widget(Paragraph::new(line), Rect::new(area.x + 2, y, width, 1));
        y += 1;
    }

    if scroll + visible < rows.len() {
        frame.render_widget(
            Paragraph::new(format!("\u{2193} {} more below", rows.len() - scroll - visible))
                .style(app.theme.muted_style()),
            Rect::new(area.x + 2, area.y + area.height - 1, width, 1),
        );
    }

    app.package_scroll = scroll;
}

fn package_line<'a>(app: &StarterApp, index: usize, package: &'a Package) -> Line<'a> {
    let status = app.status_of(package);
    let is_cursor = index == app.package_cursor;

    let glyph = match status {
        InstallStatus::Unknown => app.spinner_char().to_string(),
        InstallStatus::Installed => "\u{2713}".to_string(),
        InstallStatus::NotInstalled => "\u{2193}".to_string(),
    };

    let name_style = if is_cursor {
        app.theme.primary_style().add_modifier(Modifier::BOLD)
    } else {
        app.theme.style()
    };

    let mut spans = vec![
        Span::styled(if is_cursor { "  > " } else { "    " }, name_style),
        Span::styled(format!("[{glyph}] "), app.theme.status_style(status)),
        Span::styled(package.display_name.as_str(), name_style),
        Span::styled(format!("  ({})", status.label()), app.theme.status_style(status)),
    ];
    if !package.description.is_empty() {
        spans.push(Span::styled(
            format!("  {}", package.description),
            app.theme.muted_style(),
        ));
    }

    Line::from(spans)
}
