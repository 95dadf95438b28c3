use crate::app::{App, FormField};
use crate::ui::helpers::focused_border_style;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let enabled = !app.is_active();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" New cycle ")
        .border_style(focused_border_style(enabled));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let field_style = |field: FormField| {
        if !enabled {
            Style::default().fg(Color::DarkGray)
        } else if app.form.focused == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let task_text = if app.form.task.is_empty() {
        Span::styled("Name your task", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(app.form.task.as_str(), field_style(FormField::Task))
    };

    let line = Line::from(vec![
        Span::raw(" I will work on "),
        Span::styled("[", field_style(FormField::Task)),
        task_text,
        Span::styled("]", field_style(FormField::Task)),
        Span::raw(" for "),
        Span::styled(
            format!("[{:>2}]", app.form.minutes),
            field_style(FormField::Minutes),
        ),
        Span::raw(" minutes."),
    ]);
    f.render_widget(Paragraph::new(line.clone()), rows[0]);

    if let Some(ref error) = app.form.error {
        let message =
            Paragraph::new(format!(" ✗ {}", error)).style(Style::default().fg(Color::Red));
        f.render_widget(message, rows[1]);
    }

    let button = if app.is_active() {
        Span::styled(
            " ■ Interrupt [x] ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )
    } else if app.form.can_submit() {
        Span::styled(
            " ▶ Start [Enter] ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(" ▶ Start ", Style::default().fg(Color::DarkGray))
    };
    f.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), button])), rows[2]);

    if enabled {
        // Place the cursor at the end of the focused field
        let cursor_offset = match app.form.focused {
            FormField::Task if app.form.task.is_empty() => line_spans_width(&line, 2),
            FormField::Task => line_spans_width(&line, 3),
            FormField::Minutes => line_spans_width(&line, 6).saturating_sub(1),
        };
        let max_x = rows[0].x + rows[0].width.saturating_sub(1);
        let cursor_x = (rows[0].x as usize + cursor_offset).min(max_x as usize) as u16;
        f.set_cursor_position((cursor_x, rows[0].y));
    }
}

fn line_spans_width(line: &Line, n: usize) -> usize {
    line.spans.iter().take(n).map(|span| span.width()).sum()
}
