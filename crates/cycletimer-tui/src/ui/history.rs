use crate::app::App;
use crate::ui::helpers::format_local_time;
use cycletimer_core::format::format_elapsed;
use cycletimer_core::models::{Cycle, CycleStatus};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem},
};

pub fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.history.is_empty() {
        vec![
            ListItem::new(""),
            ListItem::new("  No cycles yet."),
            ListItem::new(""),
            ListItem::new("  Finished and interrupted cycles show up here."),
        ]
    } else {
        app.history
            .iter()
            .enumerate()
            .map(|(i, cycle)| history_item(app, cycle, i == app.selected_history_index))
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" 📝 History ({}) ", app.history.len()))
        .title_bottom(Line::from(" [PgUp/PgDn]Scroll ").right_aligned());

    f.render_widget(List::new(items).block(block), area);
}

fn history_item(app: &App, cycle: &Cycle, selected: bool) -> ListItem<'static> {
    let (icon, color) = match cycle.status {
        CycleStatus::Active => ("▶", Color::Yellow),
        CycleStatus::Finished { .. } => ("✓", Color::Green),
        CycleStatus::Interrupted { .. } => ("✗", Color::Red),
    };

    let duration = match cycle.ended_at() {
        Some(end) => cycle.elapsed_at(end).min(cycle.target_seconds()),
        None => app.snapshot.elapsed_seconds,
    };

    let mut style = Style::default().fg(color);
    if selected {
        style = style.add_modifier(Modifier::BOLD);
    }

    let text = format!(
        "{} {} {} │ {:>3} min │ {:>8} │ {:<11} │ {}",
        if selected { "→" } else { " " },
        icon,
        format_local_time(cycle.start_date),
        cycle.minutes_amount,
        format_elapsed(duration),
        cycle.status.as_str(),
        cycle.task
    );
    ListItem::new(text).style(style)
}
