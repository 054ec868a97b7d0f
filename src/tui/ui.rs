use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs};

use crate::attainment::attainment_matrix;
use crate::scores::INDIRECT_ASSESSMENT;
use crate::subject::roll_number;
use crate::tui::app::{App, InputMode, Tab};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 6 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.current_tab() {
        Tab::Assessment(_) | Tab::Indirect => render_score_grid(frame, chunks[2], app),
        Tab::Analytics => render_analytics(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::ScoreInput => render_score_popup(frame, app),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let left = format!("{} ({})", app.subject.name, app.subject.code);
    let right = format!("{} students", app.subject.student_count);
    let padding = (area.width as usize).saturating_sub(left.len() + right.len());

    let title = Line::from(vec![
        Span::styled(left, Style::default().fg(app.theme.title_color).bold()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(app.theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let tabs = Tabs::new(app.tab_titles())
        .select(app.tab_index)
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style)
        .divider(" | ");
    frame.render_widget(tabs, area);
}

/// The editable score grid: one row per student, one column per CO of the
/// current tab.
fn render_score_grid(frame: &mut Frame, area: Rect, app: &mut App) {
    let cos = app.column_cos();
    if cos.is_empty() {
        let msg = Paragraph::new("No COs configured for this assessment")
            .alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let assessment_name = match app.current_tab() {
        Tab::Indirect => INDIRECT_ASSESSMENT.to_string(),
        _ => app
            .current_assessment()
            .map(|a| a.name.clone())
            .unwrap_or_default(),
    };
    let selected_row = app.table_state.selected();

    let rows: Vec<Row> = (0..app.subject.student_count)
        .map(|i| {
            let roll = roll_number(i + 1);
            let mut cells = vec![
                Cell::from(roll.clone()).style(Style::default().fg(app.theme.index_color)),
            ];
            for (col, co_id) in cos.iter().enumerate() {
                let cell = match app.book.get(&roll, &assessment_name, co_id) {
                    Some(entry) => {
                        let text = format!("{:>6.1} ({})", entry.score, entry.band);
                        let style = Style::default().fg(app.theme.band_color(entry.band));
                        Cell::from(text).style(style)
                    }
                    None => Cell::from("     -").style(Style::default().fg(app.theme.muted)),
                };
                let cell = if selected_row == Some(i) && col == app.selected_col {
                    cell.style(app.theme.cell_selected)
                } else {
                    cell
                };
                cells.push(cell);
            }
            let row_style = if i % 2 == 1 {
                Style::default().bg(app.theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(6)];
    widths.extend(vec![Constraint::Length(12); cos.len()]);

    let mut header_cells = vec!["Roll".to_string()];
    header_cells.extend(cos.iter().cloned());

    let table = Table::new(rows, widths)
        .header(
            Row::new(header_cells)
                .style(app.theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

/// Distributions and the CO/PO attainment matrix.
fn render_analytics(frame: &mut Frame, area: Rect, app: &App) {
    let chunks =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    render_distributions(frame, chunks[0], app);
    render_attainment(frame, chunks[1], app);
}

fn render_distributions(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();
    let bar_width = 12usize;

    // (assessment name, CO column ids); the single-CO indirect assessment
    // needs no breakdown of its own
    let mut assessments: Vec<(String, Vec<String>)> = app
        .subject
        .direct_assessments
        .iter()
        .map(|a| (a.name.clone(), a.co_marks.keys().cloned().collect()))
        .collect();
    assessments.push((INDIRECT_ASSESSMENT.to_string(), Vec::new()));

    for (name, co_ids) in assessments {
        let dist = app.book.distribution_for_assessment(&name);
        if dist.total() == 0 {
            continue;
        }
        lines.push(Line::from(Span::styled(
            name.clone(),
            Style::default().bold(),
        )));
        let bands = [
            (3u8, dist.band3_count, app.theme.band_high),
            (2u8, dist.band2_count, app.theme.band_mid),
            (1u8, dist.band1_count, app.theme.band_low),
        ];
        for (band, count, color) in bands {
            let filled =
                (count as f64 / dist.total() as f64 * bar_width as f64).round() as usize;
            let filled = filled.min(bar_width);
            lines.push(Line::from(vec![
                Span::raw(format!("  Band {}  ", band)),
                Span::styled("█".repeat(filled), Style::default().fg(color)),
                Span::styled(
                    "░".repeat(bar_width - filled),
                    Style::default().fg(app.theme.bar_empty),
                ),
                Span::raw(format!("  {}", count)),
            ]));
        }
        lines.push(Line::from(Span::styled(
            format!("  Average band: {:.2}", dist.average_band),
            Style::default().fg(app.theme.muted),
        )));
        for co_id in &co_ids {
            let co_dist = app.book.distribution_for_co(&name, co_id);
            if co_dist.total() == 0 {
                continue;
            }
            lines.push(Line::from(Span::styled(
                format!(
                    "  {}  3:{} 2:{} 1:{}  avg {:.2}",
                    co_id,
                    co_dist.band3_count,
                    co_dist.band2_count,
                    co_dist.band1_count,
                    co_dist.average_band
                ),
                Style::default().fg(app.theme.muted),
            )));
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from("No scores recorded yet"));
    }

    let block = Block::bordered().title(" Distributions ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_attainment(frame: &mut Frame, area: Rect, app: &App) {
    let levels = attainment_matrix(&app.subject, &app.book);

    let block = Block::bordered().title(" CO/PO Attainment ");
    if levels.is_empty() {
        frame.render_widget(
            Paragraph::new("No attainment data yet").block(block),
            area,
        );
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("{:<6} {:<6} {:>8} {:>6}", "CO", "PO", "Attain%", "Level"),
        app.theme.header_style,
    ))];
    for entry in &levels {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<6} {:<6} {:>8.1} ", entry.co_id, entry.po_id, entry.percentage)),
            Span::styled(
                format!("{:>6}", entry.level),
                Style::default().fg(app.theme.level_color(entry.level)),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Error") {
            app.theme.flash_error
        } else {
            app.theme.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: Vec<(&str, &str)> = match app.current_tab() {
            Tab::Analytics => vec![
                ("Tab", ":next "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            _ => vec![
                ("hjkl", ":nav "),
                ("Enter", ":edit "),
                ("Tab", ":next "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };
        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                *key,
                Style::default().fg(app.theme.status_key_color),
            ));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(app.theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the score input popup
fn render_score_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(40, 5, frame.area());

    frame.render_widget(Clear, popup_area);

    let title = match (app.selected_roll(), app.selected_co()) {
        (Some(roll), Some(co)) => format!(" Score: roll {} / {} ", roll, co),
        _ => " Score ".to_string(),
    };
    let block = Block::bordered().title(title);
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    let input = Paragraph::new(format!("{}|", app.score_input));
    frame.render_widget(input, chunks[0]);

    let help = Paragraph::new("Enter: confirm | Esc: cancel")
        .style(Style::default().fg(app.theme.muted));
    frame.render_widget(help, chunks[1]);
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(50, 13, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().title(" Keyboard Shortcuts ");
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let key_style = Style::default().fg(app.theme.status_key_color).bold();

    let help_lines = vec![
        Line::from(vec![
            Span::styled("j / Down      ", key_style),
            Span::raw("Move down"),
        ]),
        Line::from(vec![
            Span::styled("k / Up        ", key_style),
            Span::raw("Move up"),
        ]),
        Line::from(vec![
            Span::styled("h / l         ", key_style),
            Span::raw("Move between CO columns"),
        ]),
        Line::from(vec![
            Span::styled("Enter / e     ", key_style),
            Span::raw("Edit selected score"),
        ]),
        Line::from(vec![
            Span::styled("Tab / S-Tab   ", key_style),
            Span::raw("Next / previous tab"),
        ]),
        Line::from(vec![
            Span::styled("?             ", key_style),
            Span::raw("Show/hide this help"),
        ]),
        Line::from(vec![
            Span::styled("q / Ctrl-c    ", key_style),
            Span::raw("Quit"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(app.theme.muted),
        )),
    ];

    frame.render_widget(Paragraph::new(help_lines), inner);
}
