use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::utils::centered_rect;

pub fn draw_help_overlay(f: &mut Frame, area: Rect) {
    // Create a centered box for the help
    let help_area = centered_rect(50, 50, area);

    // Clear the area first
    f.render_widget(ratatui::widgets::Clear, help_area);

    let help_text = "
Keyboard Shortcuts

q: Quit the application
s: Switch ranking metric (Bytes / Packets)
h: Show/hide this help

Counters are cumulative since capture start.
Rx/Tx are relative to each flow's first-seen direction.

Press any key to close this help
";

    let help = Paragraph::new(help_text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(help, help_area);
}
