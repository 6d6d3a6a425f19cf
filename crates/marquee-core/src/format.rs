//! Display formatting helpers for movie metadata values.

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";

/// Default length for [`short_overview`].
pub const SHORT_OVERVIEW_LEN: usize = 140;

/// Poster widths served by the image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PosterSize {
    W154,
    #[default]
    W342,
    W500,
}

impl PosterSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W154 => "w154",
            Self::W342 => "w342",
            Self::W500 => "w500",
        }
    }
}

/// Full image URL for a poster path, or `None` when there is no poster.
pub fn poster_url(poster_path: Option<&str>, size: PosterSize) -> Option<String> {
    match poster_path {
        Some(path) if !path.is_empty() => Some(format!("{IMAGE_BASE_URL}{}{path}", size.as_str())),
        _ => None,
    }
}

/// The four-digit year of a `YYYY-MM-DD` release date, if it has one.
pub fn year_from_release_date(release_date: Option<&str>) -> Option<&str> {
    let year = release_date?.get(..4)?;
    year.bytes().all(|b| b.is_ascii_digit()).then_some(year)
}

/// Trim and cut `text` to at most `max` characters, ending in an ellipsis when cut.
pub fn short_overview(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

/// Runtime in minutes as shown in the details view.
pub fn runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(m) if m > 0 => format!("{m} min"),
        _ => "Runtime —".into(),
    }
}
