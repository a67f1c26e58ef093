use ratatui::prelude::*;

/// Formats a counter with K/M/G suffixes, base 1000, one decimal place.
/// Values below one thousand print as-is.
pub fn scale_count(value: u64) -> String {
    const KILO: f64 = 1e3;
    const MEGA: f64 = 1e6;
    const GIGA: f64 = 1e9;

    let v = value as f64;
    if v >= GIGA {
        format!("{:.1}G", v / GIGA)
    } else if v >= MEGA {
        format!("{:.1}M", v / MEGA)
    } else if v >= KILO {
        format!("{:.1}K", v / KILO)
    } else {
        value.to_string()
    }
}

// Helper to create centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
