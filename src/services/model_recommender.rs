//! Recommendations from a generative model, matched back onto the catalog.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
    services::{completion::CompletionClient, recommendations::MAX_RECOMMENDATIONS},
};

/// One line of the model's reply
///
/// Holds every spelling of the line obtained by peeling leading indices off
/// one at a time, most stripped first. Titles that start with digits ("1917",
/// "2 Fast 2 Furious") survive through the less stripped spellings.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    forms: Vec<String>,
}

impl Candidate {
    /// Parses a reply line, `None` when it carries no title text
    ///
    /// Strips surrounding whitespace and one leading `-`, then peels numeric
    /// indices (each optionally followed by `.` or `)`). Blank lines, a lone
    /// `-` and bare numbering such as `1.` or `2)` hold no title.
    pub fn parse(line: &str) -> Option<Self> {
        let mut forms = Vec::new();
        let mut title = strip_dash(line);

        while !title.is_empty() {
            let stripped = strip_index(title);
            if !matches!(stripped, Some(("", true))) {
                forms.push(title.to_string());
            }
            match stripped {
                Some((rest, _)) => title = rest,
                None => break,
            }
        }

        forms.reverse();
        (!forms.is_empty()).then_some(Self { forms })
    }

    /// The fully cleaned title
    pub fn title(&self) -> &str {
        &self.forms[0]
    }

    /// Spellings to try against the catalog, in order
    pub fn forms(&self) -> impl Iterator<Item = &str> {
        self.forms.iter().map(String::as_str)
    }
}

fn strip_dash(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix('-').unwrap_or(line).trim()
}

/// Removes one leading digit run and its `.`/`)` marker
///
/// The flag reports whether a marker followed the digits.
fn strip_index(title: &str) -> Option<(&str, bool)> {
    let rest = title.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == title.len() {
        return None;
    }

    let rest = rest.trim_start();
    match rest.strip_prefix(['.', ')']) {
        Some(after) => Some((after.trim(), true)),
        None => Some((rest.trim(), false)),
    }
}

/// Splits a reply into candidate titles, skipping lines without title text
pub fn parse_candidates(reply: &str) -> Vec<Candidate> {
    reply.lines().filter_map(Candidate::parse).collect()
}

fn find_title<'a>(title: &str, catalog: &'a [Movie]) -> Option<&'a Movie> {
    let wanted = title.to_lowercase();
    catalog.iter().find(|m| m.title.to_lowercase() == wanted)
}

/// Resolves candidates to catalog movies, case-insensitively
///
/// Unmatched candidates are dropped, repeats collapse to their first
/// occurrence and the result never exceeds [`MAX_RECOMMENDATIONS`].
pub fn match_titles(candidates: &[Candidate], catalog: &[Movie]) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();

    for candidate in candidates {
        let movie = candidate.forms().find_map(|form| find_title(form, catalog));

        match movie {
            Some(movie) if seen.insert(movie.id) => {
                matched.push(movie.clone());
                if matched.len() == MAX_RECOMMENDATIONS {
                    break;
                }
            }
            Some(_) => {}
            None => tracing::debug!(candidate = %candidate.title(), "Model suggestion not in catalog"),
        }
    }

    matched
}

/// Builds the prompt listing the whole catalog as context
pub fn build_prompt(profile: &str, catalog: &[Movie]) -> String {
    let movie_list: Vec<String> = catalog
        .iter()
        .map(|m| format!("- {} ({}, {})", m.title, m.genre.join(", "), m.year))
        .collect();

    format!(
        "Based on the following user preferences, recommend {count} movies from the available \
         catalog that the user would likely enjoy.\n\n\
         User Preferences:\n{profile}\n\n\
         Available Movies:\n{movies}\n\n\
         Please recommend exactly {count} movies by their exact titles. Return only the titles, \
         one per line, without numbering or additional text.",
        count = MAX_RECOMMENDATIONS,
        profile = profile,
        movies = movie_list.join("\n"),
    )
}

/// Asks the completion model for picks and keeps the ones in the catalog
#[derive(Clone)]
pub struct ModelRecommender {
    client: Arc<dyn CompletionClient>,
}

impl ModelRecommender {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Makes exactly one model call
    ///
    /// Errors when the call fails or the reply holds no candidate text. A reply
    /// whose candidates all miss the catalog is an empty success.
    pub async fn recommend(&self, profile: &str, catalog: &[Movie]) -> AppResult<Vec<Movie>> {
        let prompt = build_prompt(profile, catalog);
        let reply = self.client.complete(&prompt).await?;

        let candidates = parse_candidates(&reply);
        if candidates.is_empty() {
            return Err(AppError::ExternalApi(
                "Model reply contained no candidate titles".to_string(),
            ));
        }

        let movies = match_titles(&candidates, catalog);
        tracing::debug!(
            provider = self.client.name(),
            candidates = candidates.len(),
            matched = movies.len(),
            "Model recommendations matched against catalog"
        );

        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::MockCompletionClient;
    use crate::services::preferences::test_support::movie;

    fn recommender(reply: AppResult<String>) -> ModelRecommender {
        let mut client = MockCompletionClient::new();
        client.expect_complete().times(1).return_once(move |_| reply);
        client.expect_name().return_const("mock");
        ModelRecommender::new(Arc::new(client))
    }

    fn title(line: &str) -> Option<String> {
        Candidate::parse(line).map(|c| c.title().to_string())
    }

    #[test]
    fn test_candidate_strips_markers() {
        assert_eq!(title("1. Movie Title").as_deref(), Some("Movie Title"));
        assert_eq!(title("- Movie Title").as_deref(), Some("Movie Title"));
        assert_eq!(title("  Movie Title  ").as_deref(), Some("Movie Title"));
        assert_eq!(title("2) Inception").as_deref(), Some("Inception"));
        assert_eq!(title("10 . Heat").as_deref(), Some("Heat"));
        assert_eq!(title("- 3. Alien").as_deref(), Some("Alien"));
    }

    #[test]
    fn test_parse_candidates_skips_blank_lines() {
        let candidates = parse_candidates("1. Heat\n\n   \n- Alien\n-\n");
        let titles: Vec<&str> = candidates.iter().map(Candidate::title).collect();
        assert_eq!(titles, vec!["Heat", "Alien"]);
    }

    #[test]
    fn test_bare_numbering_is_not_a_candidate() {
        assert!(parse_candidates("1.\n2)\n3.\n- 4.").is_empty());
        assert_eq!(Candidate::parse("10 )"), None);
    }

    #[test]
    fn test_stacked_indices_are_all_removed() {
        assert_eq!(title("1. 2. Heat").as_deref(), Some("Heat"));
        assert_eq!(title("- 1) 2 Alien").as_deref(), Some("Alien"));

        let catalog = vec![movie("Heat", &["Crime"])];
        let matched = match_titles(&parse_candidates("1. 2. Heat"), &catalog);
        assert_eq!(matched, catalog);
    }

    #[test]
    fn test_titles_containing_leading_numbers() {
        let catalog = vec![movie("2 Fast 2 Furious", &["Action"])];
        let matched = match_titles(&parse_candidates("3. 2 Fast 2 Furious"), &catalog);
        assert_eq!(matched, catalog);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let catalog = vec![movie("The Matrix", &["Sci-Fi"])];
        let matched = match_titles(&parse_candidates("the matrix"), &catalog);
        assert_eq!(matched, catalog);
    }

    #[test]
    fn test_titles_starting_with_digits_fall_back_to_literal() {
        let catalog = vec![movie("1917", &["War"]), movie("300", &["Action"])];
        let matched = match_titles(&parse_candidates("1. 1917\n300"), &catalog);
        let titles: Vec<&str> = matched.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["1917", "300"]);
    }

    #[test]
    fn test_match_drops_unknown_and_duplicates() {
        let catalog = vec![movie("Heat", &["Crime"]), movie("Alien", &["Horror"])];
        let reply = "Heat\nNot In Catalog\nHEAT\nAlien";
        let matched = match_titles(&parse_candidates(reply), &catalog);
        let titles: Vec<&str> = matched.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Heat", "Alien"]);
    }

    #[test]
    fn test_match_caps_result() {
        let catalog: Vec<Movie> = (0..8).map(|i| movie(&format!("M{}", i), &[])).collect();
        let reply: Vec<String> = catalog.iter().map(|m| m.title.clone()).collect();
        let matched = match_titles(&parse_candidates(&reply.join("\n")), &catalog);
        assert_eq!(matched.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_prompt_lists_catalog() {
        let catalog = vec![movie("Heat", &["Crime", "Drama"])];
        let prompt = build_prompt("No viewing history available.", &catalog);

        assert!(prompt.contains("User Preferences:\nNo viewing history available."));
        assert!(prompt.contains("- Heat (Crime, Drama, 2010)"));
        assert!(prompt.contains("recommend exactly 5 movies"));
    }

    #[tokio::test]
    async fn test_reply_preserves_model_order() {
        let catalog = vec![movie("The Matrix", &["Sci-Fi"]), movie("Inception", &["Sci-Fi"])];
        let recommender = recommender(Ok("2) Inception\n- The Matrix".to_string()));

        let picks = recommender.recommend("profile", &catalog).await.unwrap();
        let titles: Vec<&str> = picks.iter().map(|m| m.title.as_str()).collect();

        assert_eq!(titles, vec!["Inception", "The Matrix"]);
    }

    #[tokio::test]
    async fn test_client_failure_propagates() {
        let catalog = vec![movie("Heat", &["Crime"])];
        let recommender = recommender(Err(AppError::ModelUnavailable("no key".to_string())));

        let err = recommender.recommend("profile", &catalog).await.unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_reply_without_candidates_is_an_error() {
        let catalog = vec![movie("Heat", &["Crime"])];
        let recommender = recommender(Ok("-\n  \n".to_string()));

        let err = recommender.recommend("profile", &catalog).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_reply_of_only_numbering_is_an_error() {
        let catalog = vec![movie("Heat", &["Crime"])];
        let recommender = recommender(Ok("1.\n2)\n3.".to_string()));

        let err = recommender.recommend("profile", &catalog).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }
}
