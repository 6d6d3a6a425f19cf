//! Interactive browsing: each stdin line is an edit of the search box.

use std::io;
use std::mem;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use marquee_api::ProxyClient;
use marquee_core::storage::Storage;
use marquee_runtime::{debounce, Changed, Session, DEBOUNCE_DELAY};

use crate::commands::Favorites;
use crate::error::CliError;
use crate::render;

const HELP: &str = "\
Type a title to search. Commands:
  :open N   show details for result N
  :fav [N]  toggle favorite for result N, or the open movie
  :close    close the details view
  :favs     list favorites
  :quit     leave";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Query(String),
    Open(usize),
    Favorite(Option<usize>),
    Close,
    Favorites,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Text(String),
    NotUtf8,
    End,
}

/// Read one line into `buf`, which holds partial input between calls so
/// the read can be dropped from a `select!` and resumed.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Line> {
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(Line::End);
    }

    let mut bytes = mem::take(buf);
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
    Ok(String::from_utf8(bytes).map_or(Line::NotUtf8, Line::Text))
}

/// Result numbers are 1-based on screen.
fn result_index(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok()?.checked_sub(1)
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("open", Some(n)) => result_index(n).map_or_else(|| Input::Unknown(line.into()), Input::Open),
        ("fav", None) => Input::Favorite(None),
        ("fav", Some(n)) => result_index(n)
            .map_or_else(|| Input::Unknown(line.into()), |i| Input::Favorite(Some(i))),
        ("close", None) => Input::Close,
        ("favs", None) => Input::Favorites,
        ("help", None) => Input::Help,
        ("quit" | "q", None) => Input::Quit,
        _ => Input::Unknown(line.into()),
    }
}

pub async fn run(client: ProxyClient, favorites: Favorites) -> Result<(), CliError> {
    let mut session = Session::new(client, favorites);
    let (debouncer, mut queries) = debounce::<String>(DEBOUNCE_DELAY);
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();

    println!("{HELP}");

    loop {
        tokio::select! {
            line = read_line(&mut stdin, &mut buf) => {
                let line = match line? {
                    Line::Text(line) => line,
                    Line::NotUtf8 => {
                        warn!("Ignoring stdin line that is not UTF-8");
                        println!("Input is not valid UTF-8, ignored.");
                        continue;
                    }
                    Line::End => break,
                };
                match parse_input(&line) {
                    Input::Query(query) => debouncer.push(query),
                    Input::Open(index) => match session.search().results().get(index).cloned() {
                        Some(movie) => {
                            session.open_details(movie);
                            print_details(&session);
                        }
                        None => println!("No result {}.", index + 1),
                    },
                    Input::Favorite(Some(index)) => {
                        match session.search().results().get(index).cloned() {
                            Some(movie) => {
                                let store = session.favorites_mut();
                                if store.is_favorite(movie.id) {
                                    store.remove_favorite(movie.id);
                                    println!("Removed {} from favorites.", movie.title);
                                } else {
                                    store.add_favorite(&movie);
                                    println!("Added {} to favorites.", movie.title);
                                }
                            }
                            None => println!("No result {}.", index + 1),
                        }
                    }
                    Input::Favorite(None) => match session.toggle_favorite_from_details() {
                        Some(_) => print_details(&session),
                        None => println!("No movie open."),
                    },
                    Input::Close => session.close_details(),
                    Input::Favorites => {
                        println!("{}", render::favorites_list(&session.favorites().favorites()));
                    }
                    Input::Help => println!("{HELP}"),
                    Input::Quit => break,
                    Input::Unknown(line) => println!("Unknown command: {line}"),
                }
            }
            Some(query) = queries.recv() => {
                debug!(query = %query, "Debounced query");
                session.set_query(&query);
                if let Some(status) = render::search_status(session.search()) {
                    println!("{status}");
                }
            }
            changed = session.next_event() => match changed {
                Changed::Search => print_results(&session),
                Changed::Details => print_details(&session),
                Changed::Nothing => {}
            },
        }
    }

    Ok(())
}

fn print_results(session: &Session<ProxyClient, Storage>) {
    let favorites = session.favorites();
    println!(
        "{}",
        render::search_results(session.search(), |id| favorites.is_favorite(id))
    );
}

fn print_details(session: &Session<ProxyClient, Storage>) {
    let favorite = session
        .details()
        .selected_id()
        .is_some_and(|id| session.favorites().is_favorite(id));
    if let Some(panel) = render::details_panel(session.details(), favorite) {
        println!("{panel}");
    }
}
