use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

pub struct Layout {
    pub full: Rect,
    pub header: Rect,
    pub steps: Rect,
    pub content: Rect,
    pub footer: Rect,
    pub status: Rect,
}

impl Layout {
    pub fn new(area: Rect) -> Self {
        // Footer space is always reserved so the content does not jump
        // when the controls give way to the result view
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Header
                Constraint::Length(3),  // Step bar
                Constraint::Min(8),     // Content
                Constraint::Length(3),  // Footer: controls or message
                Constraint::Length(1),  // Status bar
            ])
            .split(area);

        Self {
            full: area,
            header: chunks[0],
            steps: chunks[1],
            content: chunks[2],
            footer: chunks[3],
            status: chunks[4],
        }
    }

    pub fn centered_box(area: Rect, width: u16, height: u16) -> Rect {
        let horizontal = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(width.min(area.width)),
                Constraint::Fill(1),
            ])
            .split(area);

        let vertical = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(height.min(area.height)),
                Constraint::Fill(1),
            ])
            .split(horizontal[1]);

        vertical[1]
    }
}
