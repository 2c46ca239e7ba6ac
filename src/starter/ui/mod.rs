mod explorer;
mod result;
mod settings;
mod welcome;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::steps::StepId;
use super::{Overlay, StarterApp};
use crate::ui::Layout as ScreenLayout;
use crate::vim::VimMode;

/// Main draw function for the wizard
pub fn draw(frame: &mut Frame, app: &mut StarterApp) {
    let layout = ScreenLayout::new(frame.area());
    frame.render_widget(Clear, layout.full);

    draw_header(frame, layout.header, app);
    draw_step_bar(frame, layout.steps, app);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(layout.content);
    frame.render_widget(block, layout.content);

    match app.current_step() {
        Some(StepId::Welcome) => welcome::draw_welcome(frame, inner, app),
        Some(StepId::Explorer) => explorer::draw_explorer(frame, inner, app),
        Some(StepId::Configurations) => settings::draw_settings(frame, inner, app),
        None => result::draw_result(frame, inner, app),
    }

    if app.message.is_some() {
        draw_message(frame, layout.footer, app);
    } else if !app.wizard.is_finished() {
        draw_footer(frame, layout.footer, app);
    }

    draw_status_bar(frame, layout.status, app);

    match app.overlay {
        Some(Overlay::Help) => draw_help(frame, app),
        Some(Overlay::About) => draw_about(frame, app),
        None => {}
    }
}

/// Draw header bar (1 line, no borders)
fn draw_header(frame: &mut Frame, area: Rect, app: &StarterApp) {
    let title = format!(" {} (v{}) ", app.config.general.title, env!("CARGO_PKG_VERSION"));
    frame.render_widget(
        Paragraph::new(title).style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        area,
    );

    if app.is_dryrun() {
        frame.render_widget(
            Paragraph::new("[DRYRUN] ")
                .style(app.theme.error_style())
                .alignment(Alignment::Right),
            area,
        );
    }
}

/// Horizontal stepper: one segment per content step
fn draw_step_bar(frame: &mut Frame, area: Rect, app: &StarterApp) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let active = app.wizard.active_step();
    let mut spans = Vec::new();

    for (idx, step) in StepId::ALL.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" \u{2500}\u{2500} ", app.theme.border_style()));
        }

        let marker = if idx < active { "\u{2713}".to_string() } else { (idx + 1).to_string() };
        spans.push(Span::styled(
            format!(" {marker} {} {} ", step.icon(), step.label()),
            app.theme.step_style(idx, active),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        inner,
    );
}

/// Launch-at-startup toggle on the left, back/next controls on the right
fn draw_footer(frame: &mut Frame, area: Rect, app: &StarterApp) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(app.theme.border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let toggle = if app.launch_at_startup() { "[x]" } else { "[ ]" };
    let toggle_line = Line::from(vec![
        Span::styled(format!(" {toggle} "), app.theme.primary_style()),
        Span::styled("Launch at startup ", app.theme.style()),
        Span::styled("(t)", app.theme.muted_style()),
    ]);
    frame.render_widget(Paragraph::new(toggle_line), inner);

    let next_label = if app.wizard.is_last_step() { " Finish \u{2192} " } else { " Next \u{2192} " };

    let buttons = Line::from(vec![
        Span::styled(
            " \u{2190} Back ",
            app.theme.button_style(!app.wizard.is_first(), false),
        ),
        Span::raw("  "),
        Span::styled(next_label, app.theme.button_style(true, true)),
        Span::raw(" "),
    ]);
    frame.render_widget(Paragraph::new(buttons).alignment(Alignment::Right), inner);
}

fn draw_message(frame: &mut Frame, area: Rect, app: &StarterApp) {
    let Some(msg) = &app.message else {
        return;
    };

    let (title, border_style, text_style) = if msg.is_error {
        (" Error ", app.theme.error_style(), app.theme.error_style())
    } else {
        (" Info ", app.theme.secondary_style(), app.theme.style())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
        .title_style(border_style.add_modifier(Modifier::BOLD));

    let content = Line::from(vec![
        Span::styled(msg.text.as_str(), text_style),
        Span::styled(" (press any key to dismiss)", app.theme.muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &StarterApp) {
    frame.render_widget(Clear, area);

    let mode_span = Span::styled(
        format!(" {} ", app.vim_mode.display_name()),
        app.theme.mode_style(app.vim_mode),
    );

    let after_mode = if app.vim_mode == VimMode::Command {
        Span::styled(format!(":{}", app.command_buffer.content()), app.theme.style())
    } else {
        Span::styled(app.status_bar.left_hint.clone(), app.theme.muted_style())
    };

    frame.render_widget(
        Paragraph::new(Line::from(vec![mode_span, Span::raw(" "), after_mode])),
        Rect::new(area.x, area.y, area.width * 2 / 3, 1),
    );

    let step = app.wizard.active_step().min(app.wizard.step_count());
    let right_text = format!("{}  {}/{} ", app.status_bar.right_hint, step, app.wizard.step_count());
    frame.render_widget(
        Paragraph::new(right_text)
            .style(app.theme.muted_style())
            .alignment(Alignment::Right),
        Rect::new(area.x + area.width / 3, area.y, area.width - area.width / 3, 1),
    );
}

fn draw_help(frame: &mut Frame, app: &StarterApp) {
    let help_text = [
        "",
        "Navigation:",
        "",
        "  l/Enter/Right   Next step (Finish on the last)",
        "  h/Left          Previous step",
        "  j/k             Move through packages",
        "  g/G             First/last package",
        "  t/Space         Toggle launch at startup",
        "  r               Start over (result view)",
        "",
        "Commands:",
        "",
        "  :next :prev :reset :launch [on|off]",
        "  :help :about :q",
        "",
        "Press q or Esc to close",
    ];

    draw_overlay_box(frame, app, " Help ", &help_text);
}

fn draw_about(frame: &mut Frame, app: &StarterApp) {
    let version = format!("  Version {}", env!("CARGO_PKG_VERSION"));
    let license = format!("  License {}", env!("CARGO_PKG_LICENSE"));
    let about_text = [
        "",
        "  Desktop Starter",
        "",
        concat!("  ", env!("CARGO_PKG_DESCRIPTION")),
        "",
        version.as_str(),
        license.as_str(),
        "",
        "Press q or Esc to close",
    ];

    draw_overlay_box(frame, app, " About ", &about_text);
}

/// Centered bordered box with one line of text per row
fn draw_overlay_box(frame: &mut Frame, app: &StarterApp, title: &str, lines: &[&str]) {
    let width = 54.min(frame.area().width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(frame.area().height.saturating_sub(2));
    let area = ScreenLayout::centered_box(frame.area(), width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(title)
        .title_style(app.theme.primary_style());

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    for (i, line) in lines.iter().enumerate() {
        if i as u16 >= inner.height {
            break;
        }
        frame.render_widget(
            Paragraph::new(*line).style(app.theme.style()),
            Rect::new(inner.x, inner.y + i as u16, inner.width, 1),
        );
    }
}
