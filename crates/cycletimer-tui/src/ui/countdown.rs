use crate::app::App;
use crate::ui::big_text::BigText;
use crate::ui::helpers::centered_rect;
use cycletimer_core::format::format_elapsed;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

pub fn draw_countdown(f: &mut Frame, app: &App, area: Rect) {
    let countdown = app.snapshot.countdown().to_string();

    let (title, color) = match app.snapshot.active_cycle {
        Some(ref cycle) => (format!(" ⏳ {} ", cycle.task), Color::Green),
        None => (" ⏳ Countdown ".to_string(), Color::DarkGray),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let digits_area = centered_rect(
        Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(2)),
        BigText::width(&countdown),
        BigText::height(),
    );
    f.render_widget(
        BigText::new(&countdown).style(Style::default().fg(color)),
        digits_area,
    );

    let Some(ref cycle) = app.snapshot.active_cycle else {
        let hint = Paragraph::new(Line::from("Start a cycle to begin the countdown"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(hint, bottom_line(inner));
        return;
    };

    let target = cycle.target_seconds().max(1);
    let elapsed = app.snapshot.elapsed_seconds.min(target);
    let ratio = elapsed as f64 / target as f64;

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .ratio(ratio)
        .label(format!(
            "{} / {}",
            format_elapsed(elapsed),
            format_elapsed(target)
        ));
    f.render_widget(gauge, bottom_line(inner));
}

fn bottom_line(area: Rect) -> Rect {
    Rect::new(
        area.x + 1,
        area.y + area.height.saturating_sub(1),
        area.width.saturating_sub(2),
        area.height.min(1),
    )
}
