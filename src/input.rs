/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// New contents of the search field
    Search(String),
    /// Zero-based position in the visible list
    ToggleFavorite(usize),
    ToggleTheme,
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP: &str = "\
/text        search (plain text works too, an empty line clears)
:fav N       toggle favorite on item N
:theme       switch between light and dark
:refresh     fetch the feed now (also :retry)
:clear       clear the search
:quit        exit";

/// Lines starting with `:` are commands, `/` jumps to search, anything else
/// is search text.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = line.strip_prefix('/') {
        return Command::Search(rest.to_string());
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Command::Search(line.to_string());
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or("");
    let arg = words.next();

    match (name, arg) {
        ("fav" | "f", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Command::ToggleFavorite(n - 1),
            _ => Command::Unknown(line.to_string()),
        },
        ("theme" | "t", None) => Command::ToggleTheme,
        ("refresh" | "retry" | "r", None) => Command::Refresh,
        ("clear" | "c", None) => Command::Search(String::new()),
        ("help" | "h" | "?", None) => Command::Help,
        ("quit" | "q", None) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}
