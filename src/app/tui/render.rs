use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Gauge, Padding, Paragraph, Wrap};

use crate::app::cards::{Card, CardKind};
use crate::app::records::RecordRow;
use crate::app::sequencer::{Sequencer, SequencerState};
use crate::app::truncate;

use super::RecordField;

const ACCENT: Color = Color::Rgb(110, 210, 150);
const TEXT: Color = Color::Rgb(230, 230, 230);
const DIM: Color = Color::Rgb(140, 148, 158);

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_session(
    frame: &mut Frame,
    cards: &[Card],
    sequencer: &Sequencer,
    active_card: Option<usize>,
    row_cursor: usize,
    field: RecordField,
    progress: &(f64, String),
    results: Option<&str>,
    status: &str,
    pending_end: bool,
) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], cards, sequencer);

    if let Some(summary) = results {
        let body = Paragraph::new(summary.to_string())
            .style(Style::default().fg(TEXT))
            .wrap(Wrap { trim: false })
            .block(panel_block("本日の成果"));
        frame.render_widget(body, chunks[1]);
    } else {
        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        draw_timeline(frame, body_chunks[0], cards, active_card, sequencer);
        draw_card_detail(
            frame,
            body_chunks[1],
            cards,
            active_card,
            sequencer,
            row_cursor,
            field,
        );
    }

    let gauge = Gauge::default()
        .block(panel_block("Progress"))
        .gauge_style(
            Style::default()
                .fg(ACCENT)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .label(progress.1.clone())
        .ratio(progress.0);
    frame.render_widget(gauge, chunks[2]);

    let controls = Paragraph::new(control_hints(sequencer, cards, active_card))
        .style(Style::default().fg(DIM))
        .alignment(Alignment::Center)
        .block(panel_block("Controls"));
    frame.render_widget(controls, chunks[3]);

    let status_widget = Paragraph::new(status.to_string())
        .style(status_style(status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[4]);

    if pending_end {
        let popup_text = "本当に終了しますか？\n\n[y / Enter] End session   [n / Esc] Cancel";
        let popup_area = centered_fixed_rect(48, 9, frame.area());
        render_popup_shadow(frame, popup_area);
        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(popup_text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(modal_block("Confirm End"));
        frame.render_widget(popup, popup_area);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, cards: &[Card], sequencer: &Sequencer) {
    let state_text = match sequencer.state() {
        SequencerState::NotStarted => {
            if sequencer.ready_to_start() {
                "ready to start".to_string()
            } else {
                "not started".to_string()
            }
        }
        SequencerState::Playing(index) => {
            let paused = if sequencer.is_paused() { " (paused)" } else { "" };
            format!("card {}/{}{paused}", index + 1, cards.len())
        }
        SequencerState::Ended => "ended".to_string(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "GYMCARD",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(format!("{} cards", cards.len()), Style::default().fg(DIM)),
        Span::styled("   ", Style::default()),
        Span::styled(state_text, Style::default().fg(Color::Yellow)),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Session"));
    frame.render_widget(header, area);
}

fn draw_timeline(
    frame: &mut Frame,
    area: Rect,
    cards: &[Card],
    active_card: Option<usize>,
    sequencer: &Sequencer,
) {
    let cursor = match sequencer.state() {
        SequencerState::Playing(index) => Some(index),
        SequencerState::Ended => Some(cards.len()),
        SequencerState::NotStarted => None,
    };

    let lines: Vec<Line> = cards
        .iter()
        .enumerate()
        .map(|(index, card)| {
            let marker = if active_card == Some(index) {
                "▸ "
            } else {
                "  "
            };
            let text = format!(
                "{marker}{:<8} {}",
                card.kind.label(),
                truncate(&card.title, 24)
            );
            let style = if active_card == Some(index) {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else if cursor.is_some_and(|cursor| index < cursor) {
                Style::default().fg(DIM)
            } else {
                Style::default().fg(TEXT)
            };
            Line::styled(text, style)
        })
        .collect();

    let timeline = Paragraph::new(lines).block(panel_block("Timeline"));
    frame.render_widget(timeline, area);
}

fn draw_card_detail(
    frame: &mut Frame,
    area: Rect,
    cards: &[Card],
    active_card: Option<usize>,
    sequencer: &Sequencer,
    row_cursor: usize,
    field: RecordField,
) {
    let Some(card) = active_card.or((!cards.is_empty()).then_some(0)).and_then(|i| cards.get(i))
    else {
        return;
    };
    let editing = matches!(sequencer.state(), SequencerState::Playing(index) if active_card == Some(index))
        && card.kind == CardKind::Training;

    let mut lines: Vec<Line> = vec![Line::styled(
        card.title.clone(),
        Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
    )];

    if card.kind == CardKind::Training {
        lines.push(Line::styled(
            format!(
                "標準：{}回 × {}セット",
                card.standard_reps, card.standard_sets
            ),
            Style::default().fg(DIM),
        ));
        if !card.comment.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                card.comment.clone(),
                Style::default().fg(TEXT),
            ));
        }
        if let Some(media) = &card.media {
            lines.push(Line::styled(
                format!("映像: {media}"),
                Style::default().fg(DIM),
            ));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "実施記録入力：",
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ));
        for (index, row) in card.records.iter().enumerate() {
            lines.push(record_row_line(
                index,
                row,
                editing && index == row_cursor,
                field,
            ));
        }
    } else {
        lines.push(Line::raw(""));
        if !card.comment.is_empty() {
            lines.push(Line::styled(
                card.comment.clone(),
                Style::default().fg(TEXT),
            ));
        }
        if card.audio.is_none() {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                "（音声なし）",
                Style::default().fg(DIM),
            ));
        }
    }

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel_block(card.kind.label()));
    frame.render_widget(detail, area);
}

fn record_row_line(index: usize, row: &RecordRow, selected: bool, field: RecordField) -> Line<'static> {
    let marker = if selected { "▸ " } else { "  " };
    let weight_text = if row.bodyweight {
        "自重".to_string()
    } else {
        format!("{:>3}kg", row.weight)
    };
    let reps_text = format!("{:>3}回", row.reps);

    let weight_style = if selected && field == RecordField::Weight {
        field_selected_style()
    } else {
        Style::default().fg(TEXT)
    };
    let reps_style = if selected && field == RecordField::Reps {
        field_selected_style()
    } else {
        Style::default().fg(TEXT)
    };

    Line::from(vec![
        Span::styled(
            format!("{marker}{:>2}. ", index + 1),
            Style::default().fg(DIM),
        ),
        Span::styled(weight_text, weight_style),
        Span::styled("  ", Style::default()),
        Span::styled(reps_text, reps_style),
    ])
}

fn field_selected_style() -> Style {
    Style::default()
        .bg(ACCENT)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

fn control_hints(sequencer: &Sequencer, cards: &[Card], active_card: Option<usize>) -> &'static str {
    match sequencer.state() {
        SequencerState::NotStarted => "Enter start   e end   q quit",
        SequencerState::Playing(_) => {
            let editing = active_card
                .and_then(|index| cards.get(index))
                .is_some_and(|card| card.kind == CardKind::Training);
            if editing {
                "Space pause  n skip  e end  ↑/↓ set  ←/→ field  0-9 type  ⌫ delete  b bodyweight  c copy set  a add set  q quit"
            } else {
                "Space pause   n skip   e end   q quit"
            }
        }
        SequencerState::Ended => "c copy summary   q quit",
    }
}

fn panel_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(120, 130, 142)))
        .title(title.to_string())
}

fn modal_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(180, 220, 190))
    } else {
        Style::default().fg(TEXT)
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 18, 16)));
    frame.render_widget(shadow_block, shadow);
}
