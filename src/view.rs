//! Text rendering of a session: header, banners, skeletons, empty state
//! and one card per visible item.

use std::fmt::Write;

use crate::feed::NewsItem;
use crate::fetcher::FetchError;
use crate::session::Session;
use crate::state::Phase;
use crate::store::KeyValueStore;
use crate::theme::Theme;

const SKELETON_CARDS: usize = 3;
const RESET: &str = "\x1b[0m";

struct Palette {
    title: &'static str,
    text: &'static str,
    muted: &'static str,
    star: &'static str,
    error: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            title: "\x1b[1;97m",
            text: "\x1b[37m",
            muted: "\x1b[90m",
            star: "\x1b[93m",
            error: "\x1b[1;91m",
        },
        Theme::Light => Palette {
            title: "\x1b[1;30m",
            text: "\x1b[30m",
            muted: "\x1b[2;37m",
            star: "\x1b[33m",
            error: "\x1b[1;31m",
        },
    }
}

pub fn render<S: KeyValueStore>(session: &Session<S>) -> String {
    let colors = palette(session.theme());
    let feed = session.feed();
    let mut out = String::new();

    render_header(&mut out, session, &colors);

    if let Some(notice) = feed.upstream_error() {
        let _ = writeln!(out, "{}note: the source reported: {}{}", colors.muted, notice, RESET);
    }
    if let Some(error) = feed.error() {
        let _ = writeln!(
            out,
            "{}! {} Type :retry to try again.{}",
            colors.error,
            error_message(error),
            RESET
        );
    }

    match feed.phase() {
        Phase::Loading => {
            for _ in 0..SKELETON_CARDS {
                render_skeleton(&mut out, &colors);
            }
        }
        Phase::Failed => {}
        Phase::Ready => {
            let visible = session.visible_items();
            if visible.is_empty() {
                render_empty(&mut out, session.query().committed(), &colors);
            }
            for (index, item) in visible.iter().enumerate() {
                render_card(&mut out, index, item, session.is_favorite(&item.link), &colors);
            }
        }
    }

    out
}

fn render_header<S: KeyValueStore>(out: &mut String, session: &Session<S>, colors: &Palette) {
    let feed = session.feed();
    let _ = write!(out, "{}newsdeck{} [{}]", colors.title, RESET, session.theme());
    if let Some(at) = feed.scraped_at() {
        let _ = write!(out, " updated {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    if feed.is_loading() {
        out.push_str(" (refreshing)");
    }
    out.push('\n');

    let raw = session.query().raw();
    if !raw.is_empty() {
        let _ = write!(out, "search: {}", raw);
        if session.query().is_pending() {
            out.push_str(" ...");
        }
        out.push('\n');
    }
}

pub fn error_message(error: &FetchError) -> String {
    match error {
        FetchError::Network(_) => "Could not reach the news server.".to_string(),
        FetchError::Server { status } => format!("The news server answered with status {}.", status),
        FetchError::Decode(_) => "The news server sent an unreadable response.".to_string(),
    }
}

fn render_skeleton(out: &mut String, colors: &Palette) {
    let _ = writeln!(out, "{}     {}", colors.muted, "░".repeat(24));
    let _ = writeln!(out, "     {}{}", "░".repeat(36), RESET);
}

fn render_empty(out: &mut String, query: &str, colors: &Palette) {
    if query.is_empty() {
        let _ = writeln!(out, "{}No news available right now.{}", colors.muted, RESET);
    } else {
        let _ = writeln!(out, "{}No news matches \"{}\".{}", colors.muted, query, RESET);
    }
}

fn render_card(out: &mut String, index: usize, item: &NewsItem, favorite: bool, colors: &Palette) {
    let star = if favorite { "★" } else { "☆" };
    let _ = writeln!(
        out,
        "{:>3}. {}{}{} {}{}{}",
        index + 1,
        colors.star,
        star,
        RESET,
        colors.title,
        item.title,
        RESET
    );
    if !item.description().is_empty() {
        let _ = writeln!(out, "     {}{}{}", colors.text, item.description(), RESET);
    }
    let _ = writeln!(out, "     {}{}{}", colors.muted, item.link, RESET);
    if let Some(image) = &item.image_url {
        let _ = writeln!(out, "     {}image: {}{}", colors.muted, image, RESET);
    }
}
