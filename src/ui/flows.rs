use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::app::App;
use crate::utils::{centered_rect, scale_count};

pub fn draw_flows(f: &mut Frame, app: &App, area: Rect) {
    // Header with current settings and body with the flow table
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let header_text = format!(
        "Interface: {} | Sort: {} | Updated: {} | s: switch metric, h: help, q: quit",
        app.interface,
        app.sort.label(),
        app.last_update.format("%H:%M:%S"),
    );

    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).title("Capture"))
        .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    // Top flows, cumulative since capture start
    let rows = app.ranked.iter().map(|(key, record)| {
        Row::new(vec![
            Cell::from(key.src.to_string()),
            Cell::from(key.dst.to_string()),
            Cell::from(key.proto.name()),
            Cell::from(scale_count(record.bytes_rx)),
            Cell::from(scale_count(record.packets_rx)),
            Cell::from(scale_count(record.bytes_tx)),
            Cell::from(scale_count(record.packets_tx)),
        ])
    }).collect::<Vec<_>>();

    let widths = [
        Constraint::Length(35), // Source endpoint
        Constraint::Length(35), // Destination endpoint
        Constraint::Length(6),  // Protocol
        Constraint::Length(9),  // Rx bytes
        Constraint::Length(9),  // Rx packets
        Constraint::Length(9),  // Tx bytes
        Constraint::Length(9),  // Tx packets
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec![
            Cell::from("Src IP:port"),
            Cell::from("Dst IP:port"),
            Cell::from("Proto"),
            Cell::from("Rx B"),
            Cell::from("Rx pkts"),
            Cell::from("Tx B"),
            Cell::from("Tx pkts"),
        ]).style(Style::default().fg(Color::Yellow)))
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Top {} flows ({} total)",
            app.ranked.len(),
            app.total_flows
        )));

    f.render_widget(table, chunks[1]);

    // Show message while nothing has been captured yet
    if app.ranked.is_empty() {
        let message = Paragraph::new("Waiting for traffic...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));

        let message_area = centered_rect(60, 20, chunks[1]);
        f.render_widget(message, message_area);
    }
}
