//! Chart view: unit filter panel plus per-operator activity bars.
//!
//! The left panel lists every distinct unit as a checkbox row driven by a
//! cursor; the right side draws two horizontal bars (SS and WA) per operator
//! from the filtered pivot, with the filtered aggregate table underneath.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use desk_data::aggregator::PivotEntry;

use crate::themes::Theme;

/// Width of the bar body in characters.
const BAR_WIDTH: usize = 30;

// ── ChartViewData ─────────────────────────────────────────────────────────────

/// Everything the chart view needs for one frame.
#[derive(Debug, Clone)]
pub struct ChartViewData {
    /// Every distinct unit across the roster, sorted ascending.
    pub units: Vec<String>,
    /// Units currently selected in the filter panel.
    pub selected: Vec<String>,
    /// Cursor row inside the filter panel.
    pub cursor: usize,
    /// Pivot rows surviving the unit filter, sorted by total descending.
    pub entries: Vec<PivotEntry>,
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the chart view into `area`: filter panel on the left, bars and the
/// filtered table stacked on the right.
pub fn render_chart_view(frame: &mut Frame, area: Rect, data: &ChartViewData, theme: &Theme) {
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(40)])
        .split(area);

    render_filter_panel(frame, panels[0], data, theme);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(panels[1]);

    render_bars(frame, right[0], data, theme);
    render_pivot_table(frame, right[1], data, theme);
}

// ── Filter panel ──────────────────────────────────────────────────────────────

fn render_filter_panel(frame: &mut Frame, area: Rect, data: &ChartViewData, theme: &Theme) {
    let paragraph = Paragraph::new(Text::from(build_filter_lines(data, theme))).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Units ")
            .border_style(theme.table_border),
    );
    frame.render_widget(paragraph, area);
}

/// Build the checkbox rows for the unit filter.
///
/// The cursor row always wins the style contest so it stays visible even
/// when it sits on a selected unit.
pub fn build_filter_lines<'a>(data: &ChartViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(data.units.len() + 2);

    if data.units.is_empty() {
        lines.push(Line::from(Span::styled("No units found", theme.dim)));
        return lines;
    }

    for (i, unit) in data.units.iter().enumerate() {
        let checked = data.selected.iter().any(|u| u == unit);
        let mark = if checked { "[x] " } else { "[ ] " };
        let style = if i == data.cursor {
            theme.filter_cursor
        } else if checked {
            theme.filter_selected
        } else {
            theme.text
        };
        lines.push(Line::from(Span::styled(format!("{}{}", mark, unit), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Space toggle", theme.dim)));
    lines.push(Line::from(Span::styled("a all / n none", theme.dim)));
    lines
}

// ── Bars ──────────────────────────────────────────────────────────────────────

fn render_bars(frame: &mut Frame, area: Rect, data: &ChartViewData, theme: &Theme) {
    let paragraph = Paragraph::new(Text::from(build_chart_lines(&data.entries, theme))).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Activity by Operator ")
            .border_style(theme.table_border),
    );
    frame.render_widget(paragraph, area);
}

/// Build the grouped bar lines, three rows per operator.
///
/// Bars are scaled against the largest single count in the filtered set, so
/// the busiest operator always spans the full [`BAR_WIDTH`].
pub fn build_chart_lines<'a>(entries: &[PivotEntry], theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(entries.len() * 4 + 2);

    if entries.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("No units selected", theme.dim)));
        lines.push(Line::from(Span::styled(
            "Toggle at least one unit to draw the chart",
            theme.dim,
        )));
        return lines;
    }

    let max_count = entries
        .iter()
        .map(|e| e.ss_count.max(e.wa_count))
        .max()
        .unwrap_or(0)
        .max(1);

    for entry in entries {
        let mut label_spans = vec![Span::styled(entry.person.clone(), theme.bold)];
        if let Some(ref unit) = entry.unit {
            let dept = entry.department.as_deref().unwrap_or("-");
            label_spans.push(Span::styled(format!("  {} / {}", dept, unit), theme.dim));
        }
        lines.push(Line::from(label_spans));
        lines.push(bar_line("SS", entry.ss_count, max_count, theme.bar_ss, theme));
        lines.push(bar_line("WA", entry.wa_count, max_count, theme.bar_wa, theme));
        lines.push(Line::from(""));
    }

    lines
}

fn bar_line<'a>(label: &str, count: u64, max: u64, bar_style: Style, theme: &'a Theme) -> Line<'a> {
    let filled = scaled_width(count, max, BAR_WIDTH);
    Line::from(vec![
        Span::styled(format!("  {:<3}", label), theme.label),
        Span::styled("█".repeat(filled), bar_style),
        Span::styled("░".repeat(BAR_WIDTH - filled), theme.dim),
        Span::styled(format!(" {}", count), theme.value),
    ])
}

/// Scale `count` against `max` into a bar width in characters.
fn scaled_width(count: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    ((count as f64 / max as f64) * width as f64).round() as usize
}

// ── Filtered table ────────────────────────────────────────────────────────────

fn render_pivot_table(frame: &mut Frame, area: Rect, data: &ChartViewData, theme: &Theme) {
    let header_cells = ["Department", "Unit", "Person", "SS", "WA", "Total"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows = data.entries.iter().enumerate().map(|(i, entry)| {
        let row_style = if i % 2 == 0 {
            theme.table_row
        } else {
            theme.table_row_alt
        };
        Row::new(vec![
            Cell::from(entry.department.as_deref().unwrap_or("-").to_string()),
            Cell::from(entry.unit.as_deref().unwrap_or("-").to_string()),
            Cell::from(entry.person.clone()),
            Cell::from(entry.ss_count.to_string()),
            Cell::from(entry.wa_count.to_string()),
            Cell::from(entry.total.to_string()),
        ])
        .style(row_style)
    });

    let widths = [
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(18),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Filtered Activity ")
            .border_style(theme.table_border),
    );
    frame.render_widget(table, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_entries() -> Vec<PivotEntry> {
        vec![
            PivotEntry {
                department: Some("Suporte".to_string()),
                unit: Some("Norte".to_string()),
                person: "Ana".to_string(),
                ss_count: 6,
                wa_count: 2,
                total: 8,
            },
            PivotEntry {
                department: Some("Vendas".to_string()),
                unit: Some("Sul".to_string()),
                person: "Carla".to_string(),
                ss_count: 3,
                wa_count: 1,
                total: 4,
            },
        ]
    }

    fn make_data() -> ChartViewData {
        ChartViewData {
            units: vec!["Norte".to_string(), "Sul".to_string()],
            selected: vec!["Norte".to_string(), "Sul".to_string()],
            cursor: 0,
            entries: make_entries(),
        }
    }

    // ── Data construction ─────────────────────────────────────────────────────

    #[test]
    fn test_chart_view_data_construction() {
        let data = make_data();
        assert_eq!(data.units.len(), 2);
        assert_eq!(data.entries[0].person, "Ana");
        assert_eq!(data.entries[0].total, 8);
    }

    // ── build_filter_lines content checks ─────────────────────────────────────

    #[test]
    fn test_filter_lines_show_checkbox_marks() {
        let theme = Theme::dark();
        let mut data = make_data();
        data.selected = vec!["Norte".to_string()];

        let lines = build_filter_lines(&data, &theme);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        let second: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();

        assert_eq!(first, "[x] Norte");
        assert_eq!(second, "[ ] Sul");
    }

    #[test]
    fn test_filter_lines_cursor_row_uses_cursor_style() {
        let theme = Theme::dark();
        let mut data = make_data();
        data.cursor = 1;

        let lines = build_filter_lines(&data, &theme);
        assert_eq!(lines[1].spans[0].style, theme.filter_cursor);
        assert_eq!(lines[0].spans[0].style, theme.filter_selected);
    }

    #[test]
    fn test_filter_lines_include_key_hints() {
        let theme = Theme::dark();
        let data = make_data();

        let lines = build_filter_lines(&data, &theme);
        let all_text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.as_ref().to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(all_text.contains("Space toggle"), "hints: {}", all_text);
        assert!(all_text.contains("a all"), "hints: {}", all_text);
    }

    #[test]
    fn test_filter_lines_empty_units() {
        let theme = Theme::dark();
        let data = ChartViewData {
            units: vec![],
            selected: vec![],
            cursor: 0,
            entries: vec![],
        };

        let lines = build_filter_lines(&data, &theme);
        let text: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "No units found");
    }

    // ── build_chart_lines content checks ──────────────────────────────────────

    #[test]
    fn test_chart_lines_scale_against_largest_count() {
        let theme = Theme::dark();
        let entries = make_entries();

        let lines = build_chart_lines(&entries, &theme);
        // Ana's SS bar (count 6 of max 6) fills the full width.
        let ana_ss: &str = lines[1].spans[1].content.as_ref();
        assert_eq!(ana_ss.chars().count(), BAR_WIDTH);
        // Carla's SS bar (count 3 of max 6) fills half.
        let carla_ss: &str = lines[5].spans[1].content.as_ref();
        assert_eq!(carla_ss.chars().count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_chart_lines_show_counts_and_labels() {
        let theme = Theme::dark();
        let entries = make_entries();

        let lines = build_chart_lines(&entries, &theme);
        let all_text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.as_ref().to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(all_text.contains("Ana"), "labels: {}", all_text);
        assert!(all_text.contains("Suporte / Norte"), "labels: {}", all_text);
        assert!(all_text.contains(" 6"), "counts: {}", all_text);
        assert!(all_text.contains(" 2"), "counts: {}", all_text);
    }

    #[test]
    fn test_chart_lines_empty_entries() {
        let theme = Theme::dark();
        let lines = build_chart_lines(&[], &theme);
        let all_text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.as_ref().to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(all_text.contains("No units selected"), "got: {}", all_text);
    }

    #[test]
    fn test_chart_lines_bar_styles_differ_per_category() {
        let theme = Theme::dark();
        let entries = make_entries();

        let lines = build_chart_lines(&entries, &theme);
        assert_eq!(lines[1].spans[1].style, theme.bar_ss);
        assert_eq!(lines[2].spans[1].style, theme.bar_wa);
    }

    // ── scaled_width ──────────────────────────────────────────────────────────

    #[test]
    fn test_scaled_width() {
        assert_eq!(scaled_width(0, 10, 30), 0);
        assert_eq!(scaled_width(5, 10, 30), 15);
        assert_eq!(scaled_width(10, 10, 30), 30);
        assert_eq!(scaled_width(3, 0, 30), 0);
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_chart_view_does_not_panic() {
        let backend = TestBackend::new(130, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let data = make_data();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chart_view(frame, area, &data, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_chart_view_nothing_selected_does_not_panic() {
        let backend = TestBackend::new(130, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let mut data = make_data();
        data.selected.clear();
        data.entries.clear();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chart_view(frame, area, &data, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_chart_view_small_area_does_not_panic() {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let data = make_data();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_chart_view(frame, area, &data, &theme);
            })
            .unwrap();
    }
}
