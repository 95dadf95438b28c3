mod big_text;
mod countdown;
mod form;
pub mod helpers;
mod history;

use crate::app::App;
use countdown::draw_countdown;
use form::draw_form;
use helpers::{build_hint_line, centered_rect};
use history::draw_history;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_title_bar(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(9)])
        .split(body[0]);

    draw_form(f, app, left[0]);
    draw_countdown(f, app, left[1]);
    draw_history(f, app, body[1]);

    draw_status_bar(f, app, chunks[2]);

    if app.show_help {
        draw_help_modal(f);
    }
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let state = match app.snapshot.active_cycle {
        Some(ref cycle) => Span::styled(
            format!("▶ {} ({})", cycle.task, app.snapshot.countdown()),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("idle", Style::default().fg(Color::DarkGray)),
    };

    let spans = vec![
        Span::styled(
            "⏱ cycletimer ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        state,
        Span::raw(" │ [F1]Help [Ctrl+c]Quit"),
    ];

    let title = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(title, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&'static str, &'static str)] = if app.is_active() {
        &[("[x/Esc]", "Interrupt"), ("[q]", "Quit")]
    } else {
        &[
            ("[Tab]", "Next field"),
            ("[↑↓]", "Suggest/Adjust"),
            ("[Enter]", "Start"),
            ("[Esc]", "Quit"),
        ]
    };

    let mut line = build_hint_line(hints);
    if !app.status_message.is_empty() {
        line.spans.push(Span::raw("│ "));
        line.spans.push(Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::Cyan),
        ));
    }

    let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

fn draw_help_modal(f: &mut Frame) {
    let modal_area = centered_rect(f.area(), 60, 16);
    f.render_widget(Clear, modal_area);

    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let help_text = vec![
        Line::from(Span::styled("  NEW CYCLE (idle)", heading)),
        Line::from("    [type]        Edit the focused field"),
        Line::from("    [Tab]         Switch between task and minutes"),
        Line::from("    [↑↓]          Task: cycle suggestions"),
        Line::from("                  Minutes: step the duration"),
        Line::from("    [Enter]       Start the cycle"),
        Line::from(""),
        Line::from(Span::styled("  RUNNING CYCLE", heading)),
        Line::from("    [x] / [Esc]   Interrupt"),
        Line::from(""),
        Line::from(Span::styled("  ANYWHERE", heading)),
        Line::from("    [PgUp/PgDn]   Scroll history"),
        Line::from("    [F1]          Toggle this help"),
        Line::from("    [Ctrl+c]      Quit"),
    ];

    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Keyboard Shortcuts ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(help, modal_area);
}
