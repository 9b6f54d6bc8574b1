// TUI event loop and terminal management
use crate::App;
use chrono::Utc;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pkgscout_core::search::fetch_page;
use pkgscout_core::{FavoritesStore, PageRequest, SearchPage, SearchProvider};
use pkgscout_store::KeyValueStore;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, warn};

type Completion = (PageRequest, pkgscout_core::Result<SearchPage>);

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run_tui<S: KeyValueStore>(
    mut app: App,
    provider: Arc<dyn SearchProvider>,
    favorites: FavoritesStore<S>,
    mouse_enabled: bool,
) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if mouse_enabled {
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    } else {
        execute!(stdout, EnterAlternateScreen)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, provider, &favorites, mouse_enabled).await;

    // Restore terminal even when the loop bailed out
    disable_raw_mode()?;
    if mouse_enabled {
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    } else {
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    }
    terminal.show_cursor()?;

    result
}

async fn event_loop<S: KeyValueStore>(
    terminal: &mut Term,
    app: &mut App,
    provider: Arc<dyn SearchProvider>,
    favorites: &FavoritesStore<S>,
    mouse_enabled: bool,
) -> anyhow::Result<()> {
    let (tx, mut rx) = unbounded_channel::<Completion>();

    loop {
        app.toasts.prune(Utc::now());
        terminal.draw(|f| crate::ui::render(f, app))?;

        // Last result came into view
        if let Some(request) = app.poll_scroll_trigger() {
            spawn_fetch(&provider, request, &tx);
        }

        while let Ok((request, outcome)) = rx.try_recv() {
            app.apply_page(&request, outcome);
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(request) = app.handle_key(key, favorites) {
                        spawn_fetch(&provider, request, &tx);
                    }
                }
                Event::Mouse(mouse) if mouse_enabled => match mouse.kind {
                    MouseEventKind::ScrollDown => app.next_result(),
                    MouseEventKind::ScrollUp => app.previous_result(),
                    _ => {}
                },
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn spawn_fetch(
    provider: &Arc<dyn SearchProvider>,
    request: PageRequest,
    tx: &UnboundedSender<Completion>,
) {
    debug!(
        "Fetching '{}' from={} size={}",
        request.query,
        request.offset(),
        request.size()
    );

    let provider = Arc::clone(provider);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = fetch_page(provider.as_ref(), &request).await;
        if tx.send((request, outcome)).is_err() {
            warn!("Search finished after the UI closed");
        }
    });
}
