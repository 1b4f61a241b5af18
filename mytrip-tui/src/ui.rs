use chrono::{DateTime, Local, NaiveDateTime, Utc};
use mytrip_core::{
    IntroDetails, LoadPhase, PetTourInfo, Session, TourDetail, TourIntro, TourItem,
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Wrap,
        canvas::{Canvas, Points},
    },
};

use crate::app::{App, DetailView, InputMode, Screen};

/// Longitude range of the map pane.
const MAP_X_BOUNDS: [f64; 2] = [124.5, 131.0];
/// Latitude range of the map pane.
const MAP_Y_BOUNDS: [f64; 2] = [33.0, 38.7];

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    draw_header(frame, app, *header_area);

    match app.screen {
        Screen::Browse => draw_browse(frame, app, *content_area),
        Screen::Detail => draw_detail(frame, app, *content_area),
        Screen::Bookmarks => draw_bookmarks(frame, app, *content_area),
    }

    draw_status(frame, app, *status_area);
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let session = app.session();
    let editing = app.input_mode == InputMode::Keyword;

    let keyword = if editing {
        format!("{}▏", app.keyword_input)
    } else if session.filters().keyword.trim().is_empty() {
        "(press / to search)".to_owned()
    } else {
        session.filters().keyword.clone()
    };

    let area_label = app.area_label().unwrap_or_else(|| "전체 지역".to_owned());
    let type_label = app
        .content_type()
        .map_or_else(|| "전체 유형".to_owned(), |kind| kind.label().to_owned());

    let chip = |label: String, active: bool| {
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Span::styled(format!(" {label} "), style)
    };

    let keyword_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let line = Line::from(vec![
        Span::styled(keyword, keyword_style),
        Span::raw("  "),
        chip(area_label, app.area_index.is_some()),
        Span::raw(" "),
        chip(type_label, app.type_index.is_some()),
        Span::raw(" "),
        chip(session.order().to_string(), false),
    ]);

    let title = if editing {
        "Search (Enter submit, Esc cancel)"
    } else {
        "mytrip"
    };
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(header, area);
}

fn draw_browse(frame: &mut Frame<'_>, app: &App, area: Rect) {
    if !app.show_map {
        draw_tour_list(frame, app, area);
        return;
    }

    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [list_area, map_area] = chunks else {
        return;
    };

    draw_tour_list(frame, app, *list_area);
    draw_map(frame, app.session(), *map_area);
}

fn draw_tour_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let session = app.session();

    let items = if session.tours().is_empty() {
        let placeholder = match session.phase() {
            LoadPhase::LoadingFirstPage => "Loading…",
            LoadPhase::Error => "Failed to load. Press r to retry.",
            _ if session.is_empty_result() => "No results.",
            _ => "Nothing loaded yet.",
        };
        vec![ListItem::new(placeholder)]
    } else {
        session
            .tours()
            .iter()
            .map(|tour| tour_list_item(tour, app.bookmarked.contains(&tour.content_id)))
            .collect()
    };

    let title = format!(
        "Places {}/{} (↑/↓ select, Enter detail, n more)",
        session.tours().len(),
        session.total_count()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(session.selected_index());
    frame.render_stateful_widget(list, area, &mut state);
}

fn tour_list_item(tour: &TourItem, bookmarked: bool) -> ListItem<'static> {
    let marker = if bookmarked { "★ " } else { "  " };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::raw(tour.title.clone()),
    ];
    if !tour.address.is_empty() {
        spans.push(Span::styled(
            format!("  {}", tour.address),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(date) = tour.modified_time.as_deref().and_then(format_modified_time) {
        spans.push(Span::styled(
            format!("  {date}"),
            Style::default().fg(Color::Gray),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn draw_map(frame: &mut Frame<'_>, session: &Session, area: Rect) {
    let selected = session.selected_tour();
    let others: Vec<(f64, f64)> = session
        .tours()
        .iter()
        .filter(|tour| Some(&tour.content_id) != selected.map(|sel| &sel.content_id))
        .filter_map(TourItem::coordinates)
        .map(|point| (point.lng, point.lat))
        .collect();
    let highlighted = selected.and_then(|tour| {
        tour.coordinates()
            .map(|point| (point.lng, point.lat, tour.title.clone()))
    });

    let title = format!("Map ({} plotted, m hide)", others.len() + usize::from(highlighted.is_some()));
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds(MAP_X_BOUNDS)
        .y_bounds(MAP_Y_BOUNDS)
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &others,
                color: Color::Cyan,
            });
            if let Some((lng, lat, label)) = highlighted.as_ref() {
                ctx.layer();
                ctx.draw(&Points {
                    coords: &[(*lng, *lat)],
                    color: Color::Yellow,
                });
                ctx.print(
                    *lng,
                    *lat,
                    Span::styled(
                        format!(" {label}"),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(view) = app.detail.as_ref() else {
        let paragraph = Paragraph::new("Loading detail…")
            .block(Block::default().borders(Borders::ALL).title("Detail"));
        frame.render_widget(paragraph, area);
        return;
    };

    let bookmarked = app.bookmarked.contains(&view.content_id);
    let name = view
        .detail
        .as_ref()
        .map_or_else(|| view.content_id.to_string(), |detail| detail.title.clone());
    let title = format!(
        "{}{name} (b bookmark, Esc back)",
        if bookmarked { "★ " } else { "" }
    );

    let paragraph = Paragraph::new(detail_lines(view))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn detail_lines(view: &DetailView) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(detail) = view.detail.as_ref() {
        push_common(&mut lines, detail);
    }
    if let Some(intro) = view.intro.as_ref() {
        push_intro(&mut lines, intro);
    }
    if let Some(pet) = view.pet_info.as_ref() {
        push_pet(&mut lines, pet);
    }

    lines.push(Line::raw(""));
    lines.push(field_line("Images", &view.image_count.to_string()));

    for error in &view.errors {
        lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    }
    lines
}

fn push_common(lines: &mut Vec<Line<'static>>, detail: &TourDetail) {
    lines.push(field_line("Type", detail.content_type_id.kind().label()));
    let address = [detail.address.as_deref(), detail.address_detail.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    push_field(lines, "Address", (!address.is_empty()).then_some(address.as_str()));
    push_field(lines, "Zip", detail.zipcode.as_deref());
    push_field(lines, "Tel", detail.tel.as_deref());
    push_field(lines, "Homepage", detail.homepage.as_deref());
    if let Some(point) = detail.coordinates() {
        lines.push(field_line(
            "Location",
            &format!("{:.5}, {:.5}", point.lat, point.lng),
        ));
    }
    push_field(
        lines,
        "Updated",
        detail
            .modified_time
            .as_deref()
            .and_then(format_modified_time)
            .as_deref(),
    );
    if let Some(overview) = detail.overview.as_deref() {
        lines.push(Line::raw(""));
        lines.push(Line::raw(overview.to_owned()));
    }
}

fn push_intro(lines: &mut Vec<Line<'static>>, intro: &TourIntro) {
    lines.push(Line::raw(""));
    lines.push(section_line("Visiting"));
    let common = &intro.common;
    push_field(lines, "Info", common.info_center.as_deref());
    push_field(lines, "Hours", common.use_time.as_deref());
    push_field(lines, "Closed", common.rest_date.as_deref());
    push_field(lines, "Parking", common.parking.as_deref());
    push_field(lines, "Pets", common.pets.as_deref());

    match &intro.details {
        IntroDetails::Attraction {
            heritage_culture,
            heritage_nature,
            heritage_record,
        } => {
            push_field(lines, "Cultural heritage", heritage_culture.as_deref());
            push_field(lines, "Natural heritage", heritage_nature.as_deref());
            push_field(lines, "Documentary heritage", heritage_record.as_deref());
        }
        IntroDetails::Culture {
            use_fee,
            discount_info,
        } => {
            push_field(lines, "Fee", use_fee.as_deref());
            push_field(lines, "Discounts", discount_info.as_deref());
        }
        IntroDetails::Festival {
            event_start,
            event_end,
            event_place,
            use_fee,
        } => {
            let period = match (event_start.as_deref(), event_end.as_deref()) {
                (Some(start), Some(end)) => Some(format!("{start} ~ {end}")),
                (Some(day), None) | (None, Some(day)) => Some(day.to_owned()),
                (None, None) => None,
            };
            push_field(lines, "Period", period.as_deref());
            push_field(lines, "Venue", event_place.as_deref());
            push_field(lines, "Fee", use_fee.as_deref());
        }
        IntroDetails::Lodging {
            room_count,
            room_type,
        } => {
            push_field(lines, "Rooms", room_count.as_deref());
            push_field(lines, "Room types", room_type.as_deref());
        }
        IntroDetails::Restaurant { treat_menu } => {
            push_field(lines, "Menu", treat_menu.as_deref());
        }
        IntroDetails::Other(fields) => {
            for (key, value) in fields {
                lines.push(field_line(key, value));
            }
        }
    }
}

fn push_pet(lines: &mut Vec<Line<'static>>, pet: &PetTourInfo) {
    lines.push(Line::raw(""));
    lines.push(section_line("Travelling with pets"));
    push_field(lines, "Leash", pet.leash.as_deref());
    push_field(lines, "Size", pet.size.as_deref());
    push_field(lines, "Allowed in", pet.places.as_deref());
    push_field(lines, "Fee", pet.fee.as_deref());
    push_field(lines, "Parking", pet.parking.as_deref());
    push_field(lines, "Notes", pet.info.as_deref());
}

fn push_field(lines: &mut Vec<Line<'static>>, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        lines.push(field_line(label, value));
    }
}

fn field_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value.to_owned()),
    ])
}

fn section_line(title: &str) -> Line<'static> {
    Line::styled(
        title.to_owned(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn draw_bookmarks(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = if app.bookmarks.is_empty() {
        vec![ListItem::new("No bookmarks yet. Press b on a place to add one.")]
    } else {
        app.bookmarks
            .iter()
            .map(|bookmark| {
                let title = app
                    .titles
                    .get(&bookmark.content_id)
                    .map_or_else(|| format!("#{}", bookmark.content_id), Clone::clone);
                ListItem::new(Line::from(vec![
                    Span::raw(title),
                    Span::styled(
                        format!("  saved {}", format_saved_at(bookmark.created_at)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bookmarks ({})", app.bookmarks.len())),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.bookmarks.is_empty() {
        state.select(Some(app.bookmark_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let session = app.session();

    let nav_hint = match (app.screen, app.input_mode) {
        (_, InputMode::Keyword) => "Type a keyword · Enter search · Esc cancel",
        (Screen::Browse, InputMode::Normal) => {
            "/ search · a/A area · t/T type · c clear · s sort · m map · b bookmark · B bookmarks · q quit"
        }
        (Screen::Detail, InputMode::Normal) => "b bookmark · Esc back · q quit",
        (Screen::Bookmarks, InputMode::Normal) => "↑/↓ move · Enter open · d remove · Esc back · q quit",
    };

    let (state_text, state_style) = if app.is_loading_detail {
        ("Loading detail…".to_owned(), Style::default().fg(Color::Yellow))
    } else if let Some(message) = app.message.as_deref() {
        (message.to_owned(), Style::default().fg(Color::Red))
    } else {
        list_status(session)
    };

    let status = Paragraph::new(format!("{state_text} · {nav_hint}"))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(state_style)
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn list_status(session: &Session) -> (String, Style) {
    match session.phase() {
        LoadPhase::LoadingFirstPage => ("Loading…".to_owned(), Style::default().fg(Color::Yellow)),
        LoadPhase::LoadingMore => (
            format!("Loading page {}…", session.page() + 1),
            Style::default().fg(Color::Yellow),
        ),
        LoadPhase::Error => (
            format!(
                "{} (r retry)",
                session.error().unwrap_or("Request failed")
            ),
            Style::default().fg(Color::Red),
        ),
        LoadPhase::Idle if session.is_empty_result() => {
            ("No results".to_owned(), Style::default())
        }
        LoadPhase::Idle => {
            let more = if session.has_more() { " · n more" } else { "" };
            (
                format!(
                    "Page {}/{} · {} of {}{more}",
                    session.page(),
                    session.total_pages(),
                    session.tours().len(),
                    session.total_count()
                ),
                Style::default(),
            )
        }
    }
}

/// `YYYYMMDDhhmmss` to a local date, or `None` for missing or malformed input.
fn format_modified_time(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y%m%d%H%M%S")
        .ok()
        .map(|time| time.format("%Y-%m-%d").to_string())
}

fn format_saved_at(created_at: DateTime<Utc>) -> String {
    created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modified_time_is_shown_as_a_date() {
        assert_eq!(
            format_modified_time("20250214093011").as_deref(),
            Some("2025-02-14")
        );
        assert_eq!(format_modified_time(""), None);
        assert_eq!(format_modified_time("00000000000000"), None);
    }
}
