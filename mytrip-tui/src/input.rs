use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mytrip_core::{ContentId, SessionEvent};

use crate::app::{App, InputMode, Screen};

#[derive(Debug, Clone)]
pub(crate) enum Action {
    None,
    Quit,
    /// Feed the event to the list session.
    Session(SessionEvent),
    /// Load detail, intro, pet info and images for the item.
    OpenDetail(ContentId),
    ToggleBookmark(ContentId),
    /// Load the bookmark list and switch to it.
    ShowBookmarks,
    RemoveBookmark(ContentId),
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Up};

    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if app.input_mode == InputMode::Keyword {
        return handle_keyword_key(key, app);
    }

    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    match app.screen {
        Screen::Browse => handle_browse_key(key, app),

        Screen::Detail => match key.code {
            Left | Esc | Backspace => {
                app.close_detail_screen();
                Action::None
            }
            Char('b') => app
                .detail
                .as_ref()
                .map_or(Action::None, |view| {
                    Action::ToggleBookmark(view.content_id.clone())
                }),
            _ => Action::None,
        },

        Screen::Bookmarks => match key.code {
            Up | Char('k') => {
                app.bookmark_index = app.bookmark_index.saturating_sub(1);
                Action::None
            }
            Down | Char('j') => {
                if app.bookmark_index + 1 < app.bookmarks.len() {
                    app.bookmark_index += 1;
                }
                Action::None
            }
            Enter => app
                .selected_bookmark()
                .map_or(Action::None, |bookmark| {
                    Action::OpenDetail(bookmark.content_id.clone())
                }),
            Char('d') => app
                .selected_bookmark()
                .map_or(Action::None, |bookmark| {
                    Action::RemoveBookmark(bookmark.content_id.clone())
                }),
            Left | Esc => {
                app.screen = Screen::Browse;
                Action::None
            }
            _ => Action::None,
        },
    }
}

fn handle_browse_key(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Esc, Up};

    let session = app.session();
    let selected = session.selected_id().cloned();
    let previous = session.neighbor_id(-1).cloned();
    let next = session.neighbor_id(1).cloned();
    let order = session.order();

    match key.code {
        Char('/') => {
            app.start_keyword_edit();
            Action::None
        }
        Up | Char('k') => select(previous),
        Down | Char('j') => select(next),
        Char('a') => Action::Session(app.cycle_area(true)),
        Char('A') => Action::Session(app.cycle_area(false)),
        Char('t') => Action::Session(app.cycle_type(true)),
        Char('T') => Action::Session(app.cycle_type(false)),
        Char('c') => Action::Session(app.clear_filters()),
        Char('s') => Action::Session(SessionEvent::SortChanged(order.toggled())),
        Char('n') => Action::Session(SessionEvent::LoadMore),
        Char('r') => Action::Session(SessionEvent::Retry),
        Char('m') => {
            app.show_map = !app.show_map;
            Action::None
        }
        Enter => selected.map_or(Action::None, Action::OpenDetail),
        Char('b') => selected.map_or(Action::None, Action::ToggleBookmark),
        Char('B') => Action::ShowBookmarks,
        Esc => {
            app.message = None;
            Action::None
        }
        _ => Action::None,
    }
}

fn select(target: Option<ContentId>) -> Action {
    target.map_or(Action::None, |id| Action::Session(SessionEvent::Select(id)))
}

fn handle_keyword_key(key: KeyEvent, app: &mut App) -> Action {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            Action::Session(SessionEvent::KeywordChanged(app.keyword_input.clone()))
        }
        KeyCode::Esc => {
            app.cancel_keyword_edit();
            Action::None
        }
        KeyCode::Backspace => {
            app.keyword_input.pop();
            Action::None
        }
        KeyCode::Char(character)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            app.keyword_input.push(character);
            Action::None
        }
        _ => Action::None,
    }
}
