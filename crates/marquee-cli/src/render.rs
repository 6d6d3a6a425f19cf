//! Plain-text rendering of session state.

use marquee_core::format::{
    poster_url, runtime, short_overview, year_from_release_date, PosterSize, SHORT_OVERVIEW_LEN,
};
use marquee_core::models::{FavoriteItem, MovieId, MovieSummary};
use marquee_runtime::{DetailFetcher, DetailView, SearchOrchestrator};

const FAVORITE_MARK: &str = "★";

fn title_with_year(title: &str, release_date: Option<&str>) -> String {
    match year_from_release_date(release_date) {
        Some(year) => format!("{title} ({year})"),
        None => title.to_string(),
    }
}

/// One numbered search result, with a short overview underneath.
pub fn movie_line(index: usize, movie: &MovieSummary, favorite: bool) -> String {
    let mark = if favorite {
        format!(" {FAVORITE_MARK}")
    } else {
        String::new()
    };
    let mut line = format!(
        "{:>2}. {}{mark}",
        index + 1,
        title_with_year(&movie.title, movie.release_date.as_deref())
    );
    let overview = short_overview(&movie.overview, SHORT_OVERVIEW_LEN);
    if !overview.is_empty() {
        line.push_str("\n    ");
        line.push_str(&overview);
    }
    line
}

/// The status line above the results: loading, error, or hint.
pub fn search_status(search: &SearchOrchestrator) -> Option<String> {
    if search.loading() {
        Some(format!("Searching for \"{}\"…", search.query()))
    } else if let Some(error) = search.error() {
        Some(format!("Error: {error}"))
    } else {
        search.notice().map(|n| n.message().to_string())
    }
}

pub fn search_results(search: &SearchOrchestrator, is_favorite: impl Fn(MovieId) -> bool) -> String {
    let mut out = Vec::new();
    if let Some(status) = search_status(search) {
        out.push(status);
    }
    if !search.loading() {
        for (i, movie) in search.results().iter().enumerate() {
            out.push(movie_line(i, movie, is_favorite(movie.id)));
        }
    }
    out.join("\n")
}

pub fn detail_view(view: &DetailView, favorite: bool) -> String {
    let mut out = vec![title_with_year(&view.title, view.release_date.as_deref())];
    out.push(format!(
        "{} · {}",
        view.release_date.as_deref().unwrap_or("Release date —"),
        runtime(view.runtime)
    ));
    if let Some(url) = poster_url(view.poster_path.as_deref(), PosterSize::W500) {
        out.push(url);
    }
    if !view.overview.is_empty() {
        out.push(String::new());
        out.push(view.overview.clone());
    }
    out.push(String::new());
    out.push(if favorite {
        format!("{FAVORITE_MARK} In favorites")
    } else {
        "Not in favorites".to_string()
    });
    out.join("\n")
}

/// The details panel including loading and error lines.
pub fn details_panel(details: &DetailFetcher, favorite: bool) -> Option<String> {
    let view = details.view()?;
    let mut out = detail_view(&view, favorite);
    if details.loading() {
        out.push_str("\nLoading details…");
    } else if let Some(error) = details.error() {
        out.push_str(&format!("\nError: {error}"));
    }
    Some(out)
}

pub fn favorite_line(item: &FavoriteItem) -> String {
    let mut line = format!(
        "{:>8}  {}",
        item.id,
        title_with_year(&item.title, item.release_date.as_deref())
    );
    if let Some(rating) = item.rating {
        line.push_str(&format!("  [{rating}]"));
    }
    match item.note.as_deref().map(str::trim) {
        Some(note) if !note.is_empty() => {
            line.push_str("\n          ");
            line.push_str(&short_overview(note, SHORT_OVERVIEW_LEN));
        }
        _ => {}
    }
    line
}

pub fn favorites_list(items: &[FavoriteItem]) -> String {
    if items.is_empty() {
        return "No favorites yet.".to_string();
    }
    items
        .iter()
        .map(favorite_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use marquee_core::models::Rating;

    use super::*;

    fn inception() -> MovieSummary {
        MovieSummary {
            id: 27205,
            title: "Inception".into(),
            overview: "A thief who steals corporate secrets.".into(),
            release_date: Some("2010-07-15".into()),
            poster_path: Some("/inception.jpg".into()),
        }
    }

    #[test]
    fn test_movie_line() {
        assert_eq!(
            movie_line(0, &inception(), true),
            " 1. Inception (2010) ★\n    A thief who steals corporate secrets."
        );

        let bare = MovieSummary {
            id: 1,
            title: "Untitled".into(),
            overview: "  ".into(),
            release_date: Some(String::new()),
            poster_path: None,
        };
        assert_eq!(movie_line(9, &bare, false), "10. Untitled");
    }

    #[test]
    fn test_search_status_hints() {
        let mut search = SearchOrchestrator::new();
        assert_eq!(
            search_status(&search).as_deref(),
            Some("Start typing a movie title to search.")
        );

        search.set_query("a");
        assert_eq!(
            search_status(&search).as_deref(),
            Some("Type at least 2 characters to search.")
        );

        let req = search.set_query("Incep").unwrap();
        assert_eq!(
            search_status(&search).as_deref(),
            Some("Searching for \"Incep\"…")
        );

        search.apply(req.attempt.generation, Ok(vec![inception()]));
        assert_eq!(search_status(&search), None);
        assert!(search_results(&search, |_| false).starts_with(" 1. Inception (2010)"));
    }

    #[test]
    fn test_detail_view() {
        let view = DetailView {
            id: 27205,
            title: "Inception".into(),
            poster_path: None,
            release_date: None,
            overview: String::new(),
            runtime: None,
        };
        assert_eq!(
            detail_view(&view, false),
            "Inception\nRelease date — · Runtime —\n\nNot in favorites"
        );
    }

    #[test]
    fn test_favorite_line() {
        let item = FavoriteItem {
            id: 27205,
            title: "Inception".into(),
            poster_path: None,
            release_date: Some("2010-07-15".into()),
            rating: Some(Rating::new(4).unwrap()),
            note: Some(" rewatch ".into()),
            updated_at: 1,
        };
        assert_eq!(
            favorite_line(&item),
            "   27205  Inception (2010)  [4/5]\n          rewatch"
        );
        assert_eq!(favorites_list(&[]), "No favorites yet.");
    }
}
