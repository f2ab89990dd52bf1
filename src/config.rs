/// MediaWiki API endpoint queried for page wikitext.
pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

pub const USER_AGENT: &str = concat!("polity_compare/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Compared when no entity is named on the command line.
pub const DEFAULT_ENTITIES: &[&str] = &["Canada", "France", "Italy"];

/// Width of every entity column in the report. Wide enough for the longest
/// expected cell, e.g. "$2.231 trillion (10th)".
pub const COLUMN_WIDTH: usize = 30;

/// Added to the longest section name: two for the row indent, two for the gap.
pub const LABEL_PADDING: usize = 4;

/// Upper bound on link-collapsing passes in the sanitizer.
pub const MAX_LINK_PASSES: usize = 8;

/// Extensions recognised by the local document source.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["wiki", "wikitext", "txt"];

pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "polity_compare=debug"
    } else {
        "polity_compare=warn"
    }
}
