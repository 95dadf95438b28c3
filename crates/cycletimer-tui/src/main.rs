mod app;
mod ui;

use anyhow::Result;
use app::{App, FormField};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use cycletimer_core::format::APP_NAME;
use cycletimer_core::models::Config;
use cycletimer_core::storage::{ConfigStorage, init_config_dir};
use cycletimer_engine::{CycleEvent, CycleEventType, CycleManager};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn setup_logging(level: &str) -> Result<PathBuf> {
    let mut log_path = std::env::temp_dir();
    log_path.push("cycletimer.log");

    let log_file = std::fs::File::create(&log_path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cycletimer={level},cycletimer_engine={level}"))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(log_path)
}

fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);

        tracing::error!(?panic_info, "Application panicked");

        eprintln!("A fatal error occurred: {}", panic_info);

        original_hook(panic_info);
    }));
}

#[derive(Parser, Debug)]
#[command(name = "cycletimer")]
#[command(about = "cycletimer - focus cycles in your terminal", long_about = None)]
struct Args {
    /// Directory holding config.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Pre-filled duration in minutes
    #[arg(short, long)]
    minutes: Option<u32>,

    /// Countdown refresh interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Do not mirror the countdown into the terminal title
    #[arg(long)]
    no_title: bool,

    /// Do not send a desktop notification when a cycle finishes
    #[arg(long)]
    no_notify: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(minutes) = self.minutes {
            config.timer.default_minutes = minutes;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.timer.tick_interval_ms = tick_ms;
        }
        if let Some(ref level) = self.log_level {
            config.log.level = level.clone();
        }
        if self.no_title {
            config.ui.mirror_title = false;
        }
        if self.no_notify {
            config.ui.notify_on_finish = false;
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_dir = match args.config_dir {
        Some(ref dir) => dir.clone(),
        None => init_config_dir()?,
    };

    let mut config = ConfigStorage::new(config_dir).load()?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn send_os_notification(title: &str, body: &str) {
    if let Err(e) = notify_rust::Notification::new()
        .summary(title)
        .body(body)
        .icon("alarm-clock")
        .timeout(notify_rust::Timeout::Milliseconds(5000))
        .show()
    {
        tracing::error!("Failed to send notification: {}", e);
    }
}

async fn handle_cycle_event(app: &mut App, event: CycleEvent) {
    if let CycleEventType::Finished { elapsed_seconds } = event.event_type {
        let task = app
            .manager
            .store()
            .get_cycle(&event.cycle_id)
            .await
            .map(|cycle| cycle.task)
            .unwrap_or_default();

        info!(cycle_id = %event.cycle_id, elapsed_seconds, "Cycle finished");
        app.status_message = format!("Finished '{}'", task);

        if app.config.ui.notify_on_finish {
            send_os_notification("Cycle finished", &format!("Time is up for '{}'", task));
        }
    }

    app.refresh().await;
}

async fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
    if modifiers.contains(KeyModifiers::CONTROL)
        && matches!(code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        app.should_quit = true;
        return Ok(());
    }

    if app.show_help {
        if matches!(code, KeyCode::F(1) | KeyCode::Esc | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return Ok(());
    }

    match code {
        KeyCode::F(1) => {
            app.show_help = true;
            return Ok(());
        }
        KeyCode::PageDown => {
            app.select_next_history();
            return Ok(());
        }
        KeyCode::PageUp => {
            app.select_previous_history();
            return Ok(());
        }
        _ => {}
    }

    if app.is_active() {
        match code {
            KeyCode::Char('x') | KeyCode::Esc => app.interrupt().await,
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('?') => app.show_help = true,
            _ => {}
        }
        return Ok(());
    }

    match code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit().await?,
        KeyCode::Tab | KeyCode::BackTab => app.form.toggle_field(),
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Up => match app.form.focused {
            FormField::Task => app.next_suggestion(false),
            FormField::Minutes => app.step_minutes(true),
        },
        KeyCode::Down => match app.form.focused {
            FormField::Task => app.next_suggestion(true),
            FormField::Minutes => app.step_minutes(false),
        },
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => app.form.push_char(c),
        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let log_path = setup_logging(&config.log.level)?;
    setup_panic_hook();
    info!(log = %log_path.display(), "cycletimer starting up");

    let manager = Arc::new(CycleManager::new(config.timer.tick_interval()));
    let mut cycle_rx = manager.subscribe();
    let mirror_title = config.ui.mirror_title;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(manager.clone(), config);
    app.refresh().await;

    let mut last_title = String::new();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if mirror_title {
            let title = app.window_title();
            if title != last_title {
                execute!(terminal.backend_mut(), SetTitle(&title))?;
                last_title = title;
            }
        }

        if app.should_quit {
            break;
        }

        tokio::select! {
            received = cycle_rx.recv() => {
                match received {
                    Ok(event) => handle_cycle_event(&mut app, event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Cycle events lagged");
                        app.refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(16)) => {
                if event::poll(Duration::from_millis(0))? {
                    let event = event::read()?;
                    match event {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            handle_key_event(&mut app, key.code, key.modifiers).await?;
                        }
                        Event::Resize(width, height) => {
                            info!(width, height, "Terminal resized");
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    manager.shutdown().await;
    info!("cycletimer shutting down");

    if mirror_title {
        execute!(terminal.backend_mut(), SetTitle(APP_NAME))?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
