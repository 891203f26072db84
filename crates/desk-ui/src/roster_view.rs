//! Roster table view for the desk activity TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per operator
//! plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use desk_core::formatting;
use desk_data::aggregator::{ActivityTotals, RosterEntry};

use crate::themes::Theme;

/// Placeholder for identity parts the raw string did not carry.
const MISSING_PART: &str = "-";

/// Render the operator roster into `area`.
///
/// The table has one data row per [`RosterEntry`], followed by a totals
/// row, all within a bordered block. An empty roster falls back to the
/// no-data placeholder.
pub fn render_roster_view(
    frame: &mut Frame,
    area: Rect,
    roster: &[RosterEntry],
    totals: &ActivityTotals,
    theme: &Theme,
) {
    if roster.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }

    let header_cells = [
        "Operator", "Person", "Department", "Unit", "SS", "WA", "Total", "Clients", "% SS",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = roster
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(entry.handled_by.clone()),
                Cell::from(entry.person.clone()),
                Cell::from(part_or_dash(entry.department.as_deref())),
                Cell::from(part_or_dash(entry.unit.as_deref())),
                Cell::from(formatting::format_count(entry.ss_count)),
                Cell::from(formatting::format_count(entry.wa_count)),
                Cell::from(formatting::format_count(entry.total)),
                Cell::from(formatting::format_count(entry.client_count)),
                Cell::from(formatting::format_pct(entry.pct_ss)).style(theme.share_style(entry.pct_ss)),
            ])
            .style(style)
        })
        .collect();

    // Totals row – styled separately to stand out.
    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(format!("{} operators", roster.len())),
        Cell::from(""),
        Cell::from(""),
        Cell::from(formatting::format_count(totals.ss_total)),
        Cell::from(formatting::format_count(totals.wa_total)),
        Cell::from(formatting::format_count(totals.total())),
        Cell::from(""),
        Cell::from(""),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(24),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(9),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Operator Roster "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when the source tables are empty.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No activity data found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check the service_requests.csv and messaging_log.csv exports.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Desk Activity "),
        ),
        area,
    );
}

fn part_or_dash(part: Option<&str>) -> String {
    part.unwrap_or(MISSING_PART).to_string()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
