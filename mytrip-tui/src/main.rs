//! Terminal UI for mytrip that lets users browse, filter, and bookmark tourist attractions.

mod app;
mod bookmarks;
mod config;
mod input;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mytrip_core::{ContentId, Session, SessionEvent, service::TourService};
use mytrip_provider_kto as kto;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::{App, DetailView, Screen};
use crate::bookmarks::FileBookmarkStore;
use crate::config::{Args, Settings};
use crate::input::Action;

const DEFAULT_LOG_FILTER: &str = "info,mytrip_core=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(&args)?;
    init_logging(&settings)?;

    // HTTP + service setup
    let client = Client::builder()
        .user_agent(concat!("mytrip/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let backend = Arc::new(kto::backend(client, settings.provider_config()));
    let store = Arc::new(FileBookmarkStore::new(settings.bookmarks_file.clone()));
    let service = Arc::new(TourService::new(backend).with_bookmarks(store));
    info!(backend = %service.backend().name, page_size = settings.page_size, "starting mytrip");

    // App state
    let mut app = App::new(
        Arc::clone(&service),
        Session::new(settings.page_size, settings.sort),
    );
    app.dispatch(SessionEvent::Refresh);
    match service.areas(None).await {
        Ok(areas) => app.set_area_names(areas),
        Err(err) => warn!(error = %err, "could not load area names"),
    }
    match service.bookmarks().await {
        Ok(bookmarks) => app.set_bookmarks(bookmarks),
        Err(err) => {
            warn!(error = %err, "could not read bookmarks");
            app.message = Some(format!("Bookmarks unavailable: {err}"));
        }
    }

    // Terminal init
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn init_logging(settings: &Settings) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("Failed to open log file: {}", settings.log_file.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.poll_responses();
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout so responses show up promptly)
        if !event::poll(StdDuration::from_millis(100))? {
            continue;
        }
        let CEvent::Key(key) = event::read()? else {
            continue;
        };

        match input::handle_key_event(key, &mut app) {
            Action::Quit => break,
            Action::None => {}
            Action::Session(event) => {
                app.message = None;
                app.dispatch(event);
            }
            Action::OpenDetail(content_id) => {
                app.is_loading_detail = true;
                app.message = None;
                terminal.draw(|frame| ui::draw(frame, &app))?;

                let view = load_detail(&app.service, content_id).await;

                app.is_loading_detail = false;
                app.open_detail_screen(view);
            }
            Action::ToggleBookmark(content_id) => {
                match app.service.toggle_bookmark(&content_id).await {
                    Ok(saved) => {
                        app.message = None;
                        if saved {
                            app.bookmarked.insert(content_id);
                        } else {
                            app.bookmarked.remove(&content_id);
                        }
                        refresh_bookmarks(&mut app).await;
                    }
                    Err(err) => app.message = Some(format!("Bookmark failed: {err}")),
                }
            }
            Action::ShowBookmarks => {
                refresh_bookmarks(&mut app).await;
                app.bookmark_index = 0;
                app.screen = Screen::Bookmarks;
            }
            Action::RemoveBookmark(content_id) => {
                if let Err(err) = app.service.remove_bookmark(&content_id).await {
                    app.message = Some(format!("Could not remove bookmark: {err}"));
                }
                refresh_bookmarks(&mut app).await;
            }
        }
    }

    Ok(())
}

async fn refresh_bookmarks(app: &mut App) {
    match app.service.bookmarks().await {
        Ok(bookmarks) => app.set_bookmarks(bookmarks),
        Err(err) => app.message = Some(format!("Bookmarks unavailable: {err}")),
    }
}

/// Fetch everything the detail screen shows. Partial failures are reported inline.
async fn load_detail(service: &TourService, content_id: ContentId) -> DetailView {
    let mut errors = Vec::new();

    let detail = match service.detail(&content_id).await {
        Ok(detail) => Some(detail),
        Err(err) => {
            errors.push(format!("Detail unavailable: {err}"));
            None
        }
    };

    let content_type = detail
        .as_ref()
        .map(|detail| detail.content_type_id.clone());
    let intro_request = async {
        match content_type.as_ref() {
            Some(kind) => service.intro(&content_id, kind).await,
            None => Ok(None),
        }
    };
    let (intro, images, pet_info) = tokio::join!(
        intro_request,
        service.images(&content_id),
        service.pet_info(&content_id),
    );

    let intro = intro.unwrap_or_else(|err| {
        errors.push(format!("Visiting information unavailable: {err}"));
        None
    });
    let image_count = images.map_or_else(
        |err| {
            errors.push(format!("Images unavailable: {err}"));
            0
        },
        |images| images.len(),
    );
    let pet_info = pet_info.unwrap_or_else(|err| {
        errors.push(format!("Pet information unavailable: {err}"));
        None
    });

    DetailView {
        content_id,
        detail,
        intro,
        pet_info,
        image_count,
        errors,
    }
}
