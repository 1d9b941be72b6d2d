//! TUI rendering

use super::app::{App, StepView};
use crate::tutorial::OutputBlock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(6), // Logs
            Constraint::Length(1), // Help
        ])
        .split(f.area());

    draw_header(f, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_logs(f, app, chunks[2]);
    draw_help(f, chunks[3]);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let title = vec![Line::from(vec![
        Span::styled(
            "Rag",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Tour",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            "A guided tour of a retrieval-augmented pipeline",
            Style::default().fg(Color::Gray),
        ),
    ])];

    let header = Paragraph::new(title)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);

    f.render_widget(header, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(area);

    draw_step_list(f, app, panes[0]);
    if let Some(view) = app.views.get(app.selected) {
        draw_step_detail(f, view, panes[1]);
    }
}

fn step_marker(view: &StepView) -> (&'static str, Color) {
    if view.error.is_some() {
        ("✗", Color::Red)
    } else if view.skipped {
        ("·", Color::DarkGray)
    } else if view.on {
        ("✓", Color::Green)
    } else {
        ("⭘", Color::Gray)
    }
}

fn draw_step_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .views
        .iter()
        .enumerate()
        .map(|(index, view)| {
            let (marker, color) = step_marker(view);
            let selected = index == app.selected;
            let style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", marker), Style::default().fg(color)),
                Span::styled(format!("{}. {}", index + 1, view.title), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Steps ({})", app.step_count())),
    );

    f.render_widget(list, area);
}

fn draw_step_detail(f: &mut Frame, view: &StepView, area: Rect) {
    let code_height = (view.sample_code.lines().count() as u16).saturating_add(2);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),           // Explanation
            Constraint::Length(code_height), // Code sample
            Constraint::Min(0),              // Result
        ])
        .split(area);

    let explanation = Paragraph::new(view.explanation.as_str())
        .block(Block::default().borders(Borders::ALL).title(view.title.as_str()))
        .wrap(Wrap { trim: true });
    f.render_widget(explanation, chunks[0]);

    let code = Paragraph::new(view.sample_code.as_str())
        .block(Block::default().borders(Borders::ALL).title("Code"))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(code, chunks[1]);

    draw_step_result(f, view, chunks[2]);
}

fn draw_step_result(f: &mut Frame, view: &StepView, area: Rect) {
    let (title, style, body) = if let Some(error) = &view.error {
        (
            "Error",
            Style::default().fg(Color::Red),
            error.clone(),
        )
    } else if view.skipped {
        (
            "Result",
            Style::default().fg(Color::DarkGray),
            "Not reached: an earlier step failed. Fix it or toggle it off, then press r.".to_string(),
        )
    } else if !view.on {
        (
            "Result",
            Style::default().fg(Color::Gray),
            "Toggle this step on (Space) to run it.".to_string(),
        )
    } else {
        let mut rendered = String::new();
        for block in &view.outputs {
            match block {
                OutputBlock::Text(text) => {
                    rendered.push_str(text);
                    rendered.push('\n');
                }
                OutputBlock::Value(value) => {
                    let pretty = serde_json::to_string_pretty(value)
                        .unwrap_or_else(|_| value.to_string());
                    rendered.push_str(&pretty);
                    rendered.push('\n');
                }
            }
        }
        ("Result", Style::default().fg(Color::Green), rendered)
    };

    let result = Paragraph::new(body)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(style)
        .wrap(Wrap { trim: false });
    f.render_widget(result, area);
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .map(|log| ListItem::new(Line::from(log.as_str())))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Logs (most recent first)"),
    );

    f.render_widget(list, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled("j/k", Style::default().fg(Color::Yellow)),
        Span::raw(" move   "),
        Span::styled("Space", Style::default().fg(Color::Yellow)),
        Span::raw(" toggle step   "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" re-run pass   "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ]);

    f.render_widget(Paragraph::new(help), area);
}
