/// Path tokenizing, joining and URL coercion
///
/// All free functions are **pure**: given same input, always produce same output with no side effects.
use std::borrow::Cow;
use std::fmt;

use url::Url;

/// Default path separator
pub const SEPARATOR: char = '/';

/// Default leading token marking a path as relative (`./a/b`)
pub const RELATIVE_INDICATOR: &str = ".";

/// Tokenizer options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOptions {
    pub separator: char,
    pub relative_indicator: String,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            separator: SEPARATOR,
            relative_indicator: RELATIVE_INDICATOR.to_string(),
        }
    }
}

/// A tokenized URL path
///
/// Segments are URL-decoded and never empty. The relative flag is metadata:
/// the leading relative indicator is not stored as a segment.
///
/// # Examples
///
/// ```
/// use cascade_router::Path;
///
/// let path = Path::parse("./users//42/");
/// assert!(path.is_relative());
/// assert_eq!(path.segments(), ["users", "42"]);
/// assert_eq!(path.to_string(), "/users/42/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
    relative: bool,
}

impl Path {
    pub fn new(segments: Vec<String>, relative: bool) -> Self {
        let segments = segments.into_iter().filter(|s| !s.is_empty()).collect();
        Self { segments, relative }
    }

    /// Parses a path with the default separator and relative indicator
    pub fn parse(path: &str) -> Self {
        Self::parse_with(path, &PathOptions::default())
    }

    /// Parses a path: split → drop empty → decode → strip relative indicator
    pub fn parse_with(path: &str, options: &PathOptions) -> Self {
        let mut segments: Vec<String> = path
            .split(options.separator)
            .filter(|s| !s.is_empty())
            .map(decode_token)
            .collect();

        let relative = segments
            .first()
            .map(|first| *first == options.relative_indicator)
            .unwrap_or(false);

        if relative {
            segments.remove(0);
        }

        Self { segments, relative }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends `other`'s segments, keeping this path's relative flag
    pub fn combine(&self, other: &Path) -> Path {
        let segments = self
            .segments
            .iter()
            .chain(other.segments.iter())
            .cloned()
            .collect();
        Path {
            segments,
            relative: self.relative,
        }
    }

    /// Segment-wise prefix test; the relative flag is ignored
    pub fn starts_with(&self, other: &Path) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// Segment-wise equality; the relative flag is ignored
    pub fn equals(&self, other: &Path) -> bool {
        self.segments == other.segments
    }

    /// Joins the segments with a custom separator
    pub fn join_with(&self, separator: char) -> String {
        join(&self.segments, separator)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.segments, SEPARATOR))
    }
}

fn decode_token(token: &str) -> String {
    urlencoding::decode(token)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| token.to_string())
}

/// Joins segments into canonical `/a/b/` form
///
/// Each segment is trimmed of one leading and trailing separator first.
///
/// # Examples
///
/// ```
/// use cascade_router::path::join;
///
/// assert_eq!(join(&["a", "b"], '/'), "/a/b/");
/// assert_eq!(join(&["/a/", "b/"], '/'), "/a/b/");
/// assert_eq!(join::<&str>(&[], '/'), "/");
/// ```
pub fn join<S: AsRef<str>>(segments: &[S], separator: char) -> String {
    let mut joined = String::from(separator);
    for segment in segments {
        let segment = trim(segment.as_ref(), separator);
        if segment.is_empty() {
            continue;
        }
        joined.push_str(segment);
        joined.push(separator);
    }
    joined
}

/// Removes at most one leading and one trailing separator
///
/// # Examples
///
/// ```
/// use cascade_router::path::trim;
///
/// assert_eq!(trim("/a/b/", '/'), "a/b");
/// assert_eq!(trim("//a//", '/'), "/a/");
/// ```
pub fn trim(path: &str, separator: char) -> &str {
    let path = path.strip_prefix(separator).unwrap_or(path);
    path.strip_suffix(separator).unwrap_or(path)
}

/// Coerces user input into a URL the router can split
///
/// **Pure function** with zero-copy optimization using `Cow<'_, str>`:
/// input that needs no change is returned borrowed.
///
/// - Surrounding whitespace is trimmed
/// - Backslashes become forward slashes: `\users\42` → `/users/42`
///
/// # Examples
///
/// ```
/// use cascade_router::path::coerce;
/// use std::borrow::Cow;
///
/// assert!(matches!(coerce("/about"), Cow::Borrowed("/about")));
/// assert_eq!(coerce("  \\users\\42 "), "/users/42");
/// ```
pub fn coerce(url: &str) -> Cow<'_, str> {
    let trimmed = url.trim();

    if !trimmed.contains('\\') {
        return Cow::Borrowed(trimmed);
    }

    Cow::Owned(trimmed.replace('\\', "/"))
}

/// Splits a URL into `(pathname, query)`
///
/// Absolute URLs are parsed as-is; host-less input such as `/a/b?x=1` is
/// resolved against `base`. Fragments are dropped.
///
/// # Examples
///
/// ```
/// use cascade_router::path::split_url;
///
/// let (path, query) = split_url("https://localhost/page/a?x=1#top", "http://localhost/");
/// assert_eq!(path, "/page/a");
/// assert_eq!(query.as_deref(), Some("x=1"));
///
/// let (path, query) = split_url("/page/b", "http://localhost/");
/// assert_eq!(path, "/page/b");
/// assert_eq!(query, None);
/// ```
pub fn split_url(url: &str, base: &str) -> (String, Option<String>) {
    let parsed = match Url::parse(url) {
        Ok(parsed) => Some(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(base).and_then(|base| base.join(url)).ok()
        }
        Err(_) => None,
    };

    match parsed {
        Some(parsed) => (
            parsed.path().to_string(),
            parsed.query().map(str::to_string),
        ),
        // Unparseable input: fall back to a plain split on `?`
        None => {
            let without_fragment = url.split('#').next().unwrap_or(url);
            match without_fragment.split_once('?') {
                Some((path, query)) => (path.to_string(), Some(query.to_string())),
                None => (without_fragment.to_string(), None),
            }
        }
    }
}
