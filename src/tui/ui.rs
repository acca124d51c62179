use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::constants::{
    EVENT_CHANNEL_CAPACITY, UI_DEFAULT_VIEWPORT_HEIGHT, UI_POLL_INTERVAL_MS, UI_SCROLL_LINES,
};
use crate::gateway::{Backend, SelectedFile};
use crate::tui::app::{App, BackendEvent, InputMode, Task};
use crate::tui::render::render_ui;

/// Run the terminal UI
pub async fn run_ui(mut app: App) -> Result<()> {
    // Check if we have an interactive terminal
    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("❌ docqa requires an interactive terminal.");
        eprintln!("   For scripts, use: docqa --file <PDF> --prompt \"<question>\"");
        return Err(anyhow::anyhow!("No interactive terminal available"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Spawned tasks report back over this channel
    let (tx, mut rx) = mpsc::channel::<BackendEvent>(EVENT_CHANNEL_CAPACITY);

    // A file given on the command line is selected right away
    if !app.upload.path_input.is_empty() {
        if let Some(task) = app.confirm_path() {
            spawn_task(task, app.backend.clone(), tx.clone());
        }
    }

    let res = run_app(&mut terminal, &mut app, tx, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Run one task on the runtime and send its result back to the loop
fn spawn_task(task: Task, backend: Arc<dyn Backend>, tx: mpsc::Sender<BackendEvent>) {
    tokio::spawn(async move {
        let event = match task {
            Task::Inspect(path) => {
                let result = SelectedFile::inspect(&path).await;
                BackendEvent::Selected { path, result }
            }
            Task::Upload(selected) => {
                let result = match selected.read().await {
                    Ok(upload) => backend.ingest(&upload).await,
                    Err(err) => Err(err),
                };
                BackendEvent::Ingested(result)
            }
            Task::Ask(pending) => {
                let outcome = backend
                    .ask(&pending.handle, &pending.question, &pending.history)
                    .await;
                BackendEvent::Answered {
                    epoch: pending.epoch,
                    outcome,
                }
            }
        };
        if tx.send(event).await.is_err() {
            debug!("UI closed before a task finished");
        }
    });
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tx: mpsc::Sender<BackendEvent>,
    rx: &mut mpsc::Receiver<BackendEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(Duration::from_millis(UI_POLL_INTERVAL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(task) = handle_key(app, key) {
                        spawn_task(task, app.backend.clone(), tx.clone());
                    }
                }
            }
        }

        // Apply every finished task before the next draw
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}

/// Route a key press; returns work to spawn, if any
pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> Option<Task> {
    // Global keyboard shortcuts that work in any state
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.quit(),
            KeyCode::Char('r') if !app.on_upload_screen() => app.change_file(),
            // Unbound chords are not text
            _ => {}
        }
        return None;
    }
    if key.code == KeyCode::F(1) {
        app.toggle_help();
        return None;
    }
    if app.show_help && key.code == KeyCode::Esc {
        app.show_help = false;
        return None;
    }

    if app.on_upload_screen() {
        return match key.code {
            KeyCode::Enter => app.confirm_path(),
            KeyCode::Char(c) => {
                app.push_path_char(c);
                None
            }
            KeyCode::Backspace => {
                app.pop_path_char();
                None
            }
            _ => None,
        };
    }

    match app.input_mode {
        InputMode::Insert => match key.code {
            KeyCode::Esc => {
                app.input_mode = InputMode::Normal;
                None
            }
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                app.input.push('\n');
                None
            }
            KeyCode::Enter => app.send_input(),
            KeyCode::Char(c) => {
                app.input.push(c);
                None
            }
            KeyCode::Backspace => {
                app.input.pop();
                None
            }
            KeyCode::PageUp => {
                app.scroll_up(UI_DEFAULT_VIEWPORT_HEIGHT / 2);
                None
            }
            KeyCode::PageDown => {
                app.scroll_down(UI_DEFAULT_VIEWPORT_HEIGHT / 2);
                None
            }
            _ => None,
        },
        InputMode::Normal => {
            match key.code {
                KeyCode::Char('q') => app.quit(),
                KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Insert,
                KeyCode::Char(':') => {
                    app.input_mode = InputMode::Command;
                    app.input.clear();
                }
                KeyCode::Up => app.scroll_up(1),
                KeyCode::Down => app.scroll_down(1),
                KeyCode::PageUp => app.scroll_up(UI_SCROLL_LINES * 5),
                KeyCode::PageDown => app.scroll_down(UI_SCROLL_LINES * 5),
                _ => {}
            }
            None
        }
        InputMode::Command => {
            match key.code {
                KeyCode::Esc => {
                    app.input.clear();
                    app.input_mode = InputMode::Normal;
                }
                KeyCode::Enter => {
                    let command = std::mem::take(&mut app.input);
                    app.input_mode = InputMode::Insert;
                    handle_command(app, &command);
                }
                KeyCode::Char(c) => app.input.push(c),
                KeyCode::Backspace => {
                    if app.input.is_empty() {
                        // If input is empty, exit command mode
                        app.input_mode = InputMode::Insert;
                    } else {
                        app.input.pop();
                    }
                }
                _ => {}
            }
            None
        }
    }
}

fn handle_command(app: &mut App, command: &str) {
    match command.split_whitespace().next() {
        Some("quit") | Some("q") => app.quit(),
        Some("change") | Some("reset") => app.change_file(),
        Some("help") | Some("h") => app.toggle_help(),
        _ => app.set_status(format!("Unknown command: {}", command)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;
    use crate::gateway::{DocumentHandle, MockBackend};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn chatting() -> App {
        let mut app = App::new(
            Arc::new(MockBackend::new()),
            Config::default(),
            "http://localhost:8000/api".to_string(),
        );
        app.apply(BackendEvent::Ingested(Ok(DocumentHandle::new("notes.pdf"))));
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(handle_key(app, key(KeyCode::Char(c))).is_none());
        }
    }

    #[test]
    fn test_enter_sends_question() {
        let mut app = chatting();
        type_text(&mut app, "Why?");
        let task = handle_key(&mut app, key(KeyCode::Enter));
        assert!(matches!(task, Some(Task::Ask(ref p)) if p.question == "Why?"));
    }

    #[test]
    fn test_alt_enter_adds_newline() {
        let mut app = chatting();
        type_text(&mut app, "line one");
        let task = handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        assert!(task.is_none());
        assert_eq!(app.input, "line one\n");
    }

    #[test]
    fn test_ctrl_r_returns_to_upload() {
        let mut app = chatting();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert!(app.on_upload_screen());
        assert!(app.session.transcript().is_empty());
    }

    #[test]
    fn test_ctrl_chords_are_not_typed() {
        let mut app = chatting();
        app.change_file();
        let task = handle_key(&mut app, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert!(task.is_none());
        assert!(app.upload.path_input.is_empty());

        let mut app = chatting();
        type_text(&mut app, "Why");
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert_eq!(app.input, "Why");
        assert!(app.running);
    }

    #[test]
    fn test_command_mode() {
        let mut app = chatting();
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        handle_key(&mut app, key(KeyCode::Char(':')));
        type_text(&mut app, "change");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.on_upload_screen());

        let mut app = chatting();
        app.input_mode = InputMode::Command;
        type_text(&mut app, "bogus");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.status_message.as_deref(), Some("Unknown command: bogus"));
    }

    #[test]
    fn test_upload_screen_typing() {
        let mut app = chatting();
        app.change_file();
        type_text(&mut app, "a.pdf");
        assert_eq!(app.upload.path_input, "a.pdf");
        let task = handle_key(&mut app, key(KeyCode::Enter));
        assert!(matches!(task, Some(Task::Inspect(_))));
    }
}
