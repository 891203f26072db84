//! Dashboard header: title, KPI strip and view tabs.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use desk_core::formatting;
use desk_data::aggregator::ActivityTotals;

use crate::app::ViewMode;
use crate::themes::Theme;

/// Decorative sparkle string placed either side of the dashboard title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

/// Dashboard header rendering five lines:
///
/// 1. Application title with sparkle decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. The four KPI cells: SS Total, WA Total, SS/Day, WA/Day.
/// 4. View tabs with the active view highlighted, plus key hints.
/// 5. The transient status line, or an empty line.
pub struct Header<'a> {
    /// Aggregate totals backing the KPI cells.
    pub totals: &'a ActivityTotals,
    /// View whose tab is highlighted.
    pub active: &'a ViewMode,
    /// Transient status message shown under the tabs.
    pub status: Option<&'a str>,
    /// Theme providing colour styles for each part of the header.
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    /// Construct a new header.
    pub fn new(
        totals: &'a ActivityTotals,
        active: &'a ViewMode,
        status: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            totals,
            active,
            status,
            theme,
        }
    }

    /// Render the header as a `Vec<Line>` containing exactly five lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        let status_line = match self.status {
            Some(status) => Line::from(Span::styled(status.to_string(), self.theme.info)),
            None => Line::from(""),
        };

        vec![
            // Title line.
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.separator),
                Span::styled(" DESK ACTIVITY DASHBOARD ", self.theme.header),
                Span::styled(SPARKLES, self.theme.separator),
            ]),
            // Separator line.
            Line::from(Span::styled(separator, self.theme.separator)),
            // KPI cells.
            Line::from(vec![
                Span::styled("SS Total: ", self.theme.label),
                Span::styled(formatting::format_count(self.totals.ss_total), self.theme.value),
                Span::raw("   "),
                Span::styled("WA Total: ", self.theme.label),
                Span::styled(formatting::format_count(self.totals.wa_total), self.theme.value),
                Span::raw("   "),
                Span::styled("SS/Day: ", self.theme.label),
                Span::styled(
                    formatting::format_per_day(self.totals.ss_per_day()),
                    self.theme.value,
                ),
                Span::raw("   "),
                Span::styled("WA/Day: ", self.theme.label),
                Span::styled(
                    formatting::format_per_day(self.totals.wa_per_day()),
                    self.theme.value,
                ),
            ]),
            // View tabs and key hints.
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled("1 Roster", self.tab_style(&ViewMode::Roster)),
                Span::styled(" | ", self.theme.label),
                Span::styled("2 Chart", self.tab_style(&ViewMode::Chart)),
                Span::styled(" | ", self.theme.label),
                Span::styled("3 Insight", self.tab_style(&ViewMode::Insight)),
                Span::styled(" ]", self.theme.label),
                Span::raw("   "),
                Span::styled("r refresh  q quit", self.theme.dim),
            ]),
            status_line,
        ]
    }

    fn tab_style(&self, mode: &ViewMode) -> Style {
        if self.active == mode {
            self.theme.tab_active
        } else {
            self.theme.tab_inactive
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
