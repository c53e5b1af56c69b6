//! UI rendering for the campaign monitor.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    style::{Color, Style, Modifier},
};
use crate::campaign::{aggregate, Outcome};
use super::app::MonitorApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &MonitorApp) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(55),
        ])
        .split(rows[1]);

    draw_progress(frame, rows[0], app);
    draw_outcomes(frame, middle[0], app);
    draw_recent(frame, middle[1], app);
    draw_status(frame, rows[2], app);
    draw_help(frame, rows[3]);
}

fn draw_progress(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let label = format!("{}/{}", app.session.completed(), app.session.total());
    let gauge = Gauge::default()
        .block(Block::default()
            .title(" Progress ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(app.progress_ratio().clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, area);
}

/// Golden values plus running outcome tallies.
fn draw_outcomes(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let baseline = app.session.baseline();
    let mut content = vec![
        Line::from(vec![
            Span::raw("Program: "),
            Span::styled(
                app.session.definition().program_path.display().to_string(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::raw("Golden:  result="),
            Span::styled(format!("{}", baseline.expected_result), Style::default().fg(Color::Yellow)),
            Span::raw("  cycles="),
            Span::styled(format!("{}", baseline.expected_instructions), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
    ];

    if let Ok(summary) = aggregate(app.session.results()) {
        for outcome in Outcome::ALL {
            content.push(Line::from(vec![
                Span::styled(format!("{:<10}", outcome.label()), outcome_style(outcome)),
                Span::raw(format!(
                    "{:>7.2}%  ({})",
                    summary.percent(outcome),
                    summary.count(outcome)
                )),
            ]));
        }
    } else {
        content.push(Line::from(Span::styled(
            "No outcomes yet",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Outcomes ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

fn draw_recent(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let visible = (area.height as usize).saturating_sub(2);

    let items: Vec<ListItem> = app.recent
        .iter()
        .take(visible)
        .map(|r| {
            let text = format!(
                "#{:<5} cycle {:>5}  r{:<2} bit {}  {}",
                r.index, r.cycle, r.register, r.bit, r.outcome
            );
            ListItem::new(text).style(outcome_style(r.outcome))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Recent injections ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let style = if app.running {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let status = Paragraph::new(app.status.clone())
        .style(style)
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("r: Run  p: Pause  s: Step one injection"),
        Line::from("x: Reset results  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn outcome_style(outcome: Outcome) -> Style {
    match outcome {
        Outcome::NoEffect => Style::default().fg(Color::Gray),
        Outcome::Sdc => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Outcome::Sed => Style::default().fg(Color::Yellow),
        Outcome::Due => Style::default().fg(Color::Magenta),
    }
}
