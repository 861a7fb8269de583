//! Small datasets with known answers.

/// Field count of a visitor row; names live at
/// [`VISITOR_NAME_FIELDS`](crate::mappers::VISITOR_NAME_FIELDS).
pub const VISITOR_ROW_WIDTH: usize = 22;

/// Short posts with a known number of hashtags.
///
/// # Example
///
/// ```
/// use irontally::testing::sample_tweets;
///
/// assert_eq!(sample_tweets().len(), 4);
/// ```
#[must_use]
pub fn sample_tweets() -> Vec<String> {
    vec![
        "Loving the weather #sunny #happy".to_string(),
        "Just a normal day".to_string(),
        "#rust is great".to_string(),
        "Coffee time #coffee #morning #monday".to_string(),
    ]
}

/// Hashtag-count totals for [`sample_tweets`].
#[must_use]
pub fn sample_tweets_expected() -> Vec<(String, u64)> {
    vec![("tweets".to_string(), 4), ("hashtags".to_string(), 6)]
}

/// A visitor-log header row.
#[must_use]
pub fn visitor_header() -> Vec<String> {
    (0..VISITOR_ROW_WIDTH)
        .map(|i| match i {
            19 => "NAMELAST".to_string(),
            20 => "NAMEFIRST".to_string(),
            _ => format!("COL{i}"),
        })
        .collect()
}

/// One visitor-log row with the given names and filler elsewhere.
#[must_use]
pub fn visitor_row(last: &str, first: &str) -> Vec<String> {
    (0..VISITOR_ROW_WIDTH)
        .map(|i| match i {
            19 => last.to_string(),
            20 => first.to_string(),
            _ => format!("v{i}"),
        })
        .collect()
}

/// Eight visits by four people.
///
/// `SMITH JOHN` visits three times. `DOE JANE` and `BROWN ALEX` tie at two,
/// with `DOE JANE` seen first; `LEE KIM` visits once.
#[must_use]
pub fn visitor_rows() -> Vec<Vec<String>> {
    [
        ("SMITH", "JOHN"),
        ("DOE", "JANE"),
        ("SMITH", "JOHN"),
        ("BROWN", "ALEX"),
        ("DOE", "JANE"),
        ("SMITH", "JOHN"),
        ("BROWN", "ALEX"),
        ("LEE", "KIM"),
    ]
    .into_iter()
    .map(|(last, first)| visitor_row(last, first))
    .collect()
}

/// Keys of a contribution stream with a tie at the top.
///
/// With every contribution worth 1, the top two are `w1` and `w2` at 2 each.
#[must_use]
pub fn tied_words() -> Vec<String> {
    ["w1", "w2", "w1", "w3", "w2"]
        .into_iter()
        .map(String::from)
        .collect()
}
