//! Insight view: generated insight text, chat history and the question input.
//!
//! Three stacked panels. The top shows the latest generated insight, the
//! middle scrolls through completed chat turns plus the status line, and the
//! bottom is a single input row that submits on Enter.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use desk_insight::session::ChatTurn;

use crate::themes::Theme;

// ── InsightViewData ───────────────────────────────────────────────────────────

/// Everything the insight view needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct InsightViewData {
    /// Latest generated insight text, `None` until the first request lands.
    pub insight: Option<String>,
    /// Completed conversation turns, oldest first.
    pub turns: Vec<ChatTurn>,
    /// Text currently typed into the input line.
    pub input: String,
    /// Status line content (completion errors, refresh notices).
    pub status: Option<String>,
    /// True while a completion round-trip is in flight.
    pub busy: bool,
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the insight view into `area`.
pub fn render_insight_view(frame: &mut Frame, area: Rect, data: &InsightViewData, theme: &Theme) {
    let panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let insight = Paragraph::new(Text::from(build_insight_lines(data, theme)))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Insight ")
                .border_style(theme.table_border),
        );
    frame.render_widget(insight, panels[0]);

    let conversation = Paragraph::new(Text::from(build_conversation_lines(data, theme)))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Conversation ")
                .border_style(theme.table_border),
        );
    frame.render_widget(conversation, panels[1]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", theme.label),
        Span::styled(data.input.clone(), theme.text),
        Span::styled("█", theme.dim),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Ask ")
            .border_style(theme.table_border),
    );
    frame.render_widget(input, panels[2]);
}

// ── Line builders ─────────────────────────────────────────────────────────────

/// Build the insight panel lines.
pub fn build_insight_lines<'a>(data: &InsightViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    match data.insight {
        Some(ref text) => text
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), theme.text)))
            .collect(),
        None if data.busy => vec![Line::from(Span::styled(
            "Consulting the model...",
            theme.info,
        ))],
        None => vec![
            Line::from(Span::styled("No insight generated yet", theme.dim)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter on an empty input line to request three insights",
                theme.dim,
            )),
        ],
    }
}

/// Build the conversation panel lines: question/answer pairs followed by the
/// status line.
pub fn build_conversation_lines<'a>(data: &InsightViewData, theme: &'a Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(data.turns.len() * 4 + 2);

    if data.turns.is_empty() {
        lines.push(Line::from(Span::styled(
            "Type a question about the filtered roster and press Enter",
            theme.dim,
        )));
    }

    for turn in &data.turns {
        lines.push(Line::from(vec![
            Span::styled("You: ", theme.chat_question),
            Span::styled(turn.question.clone(), theme.text),
        ]));
        for (i, answer_line) in turn.answer.lines().enumerate() {
            let prefix = if i == 0 { "Analyst: " } else { "         " };
            lines.push(Line::from(vec![
                Span::styled(prefix, theme.chat_answer),
                Span::styled(answer_line.to_string(), theme.text),
            ]));
        }
        lines.push(Line::from(""));
    }

    if data.busy {
        lines.push(Line::from(Span::styled(
            "Consulting the model...",
            theme.info,
        )));
    } else if let Some(ref status) = data.status {
        lines.push(Line::from(Span::styled(status.clone(), theme.warning)));
    }

    lines
}

// ── Tests ──────────────────────────────────────────────────────────────────────
