//! Token-overlap relevancy scoring.
//!
//! Two strings score by how many positions match exactly plus how many
//! characters match within a small window, the window matches weighted down by
//! their distance. Token lists are scored the same way one level up, with
//! [`compare_strings`] as the per-position similarity.

/// Window searched on each side for a displaced character.
const CHARACTER_WINDOW: usize = 4;

/// Suffix of the entity attribute holding a serialized relevancy token list.
pub const RELEVANCY_KEY_SUFFIX: &str = "_relevancyIndex";

/// Suffix of the entity attribute holding the token count of that list.
pub const RELEVANCY_LENGTH_KEY_SUFFIX: &str = "_relevancyIndexLength";

const TOKEN_SEPARATOR: char = '\0';

pub fn relevancy_key(index_key: &str) -> String {
    format!("{index_key}{RELEVANCY_KEY_SUFFIX}")
}

pub fn relevancy_length_key(index_key: &str) -> String {
    format!("{index_key}{RELEVANCY_LENGTH_KEY_SUFFIX}")
}

/// Join tokens into the stored attribute form.
pub fn serialize_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut result = String::new();
    for (id, token) in tokens.iter().enumerate() {
        if id > 0 {
            result.push(TOKEN_SEPARATOR);
        }
        result.push_str(token.as_ref());
    }
    result
}

/// Split a stored token list, keeping at most `count` tokens.
pub fn deserialize_tokens(serialized: &str, count: usize) -> Vec<String> {
    if serialized.is_empty() || count == 0 {
        return Vec::new();
    }
    serialized
        .split(TOKEN_SEPARATOR)
        .take(count)
        .map(str::to_string)
        .collect()
}

/// Similarity of two strings in `[0.0, 2.0]`; `1.0` for identical strings.
pub fn compare_strings(alpha: &str, beta: &str) -> f64 {
    let alpha = alpha.as_bytes();
    let beta = beta.as_bytes();

    if alpha.is_empty() || beta.is_empty() {
        return 0.0;
    }

    let mut exact_matches = 0usize;
    let mut distance_matches = 0usize;
    let mut total_distance = 0usize;

    for ii in 0..alpha.len().min(beta.len()) {
        if alpha[ii] == beta[ii] {
            exact_matches += 1;
            continue;
        }

        let backward = (1..CHARACTER_WINDOW)
            .take_while(|step| *step <= ii)
            .find(|step| beta[ii - step] == alpha[ii]);
        let found = backward.or_else(|| {
            (1..CHARACTER_WINDOW)
                .take_while(|step| ii + step < beta.len())
                .find(|step| beta[ii + step] == alpha[ii])
        });

        if let Some(distance) = found {
            distance_matches += 1;
            total_distance += distance + 1;
        }
    }

    score(
        exact_matches as f64,
        distance_matches as f64,
        total_distance as f64,
        alpha.len(),
        beta.len(),
        alpha.len(),
        beta.len(),
    )
}

/// Similarity of two token lists, searching `max_distance - 1` positions on
/// each side for a displaced token.
pub fn compare_arrays<A: AsRef<str>, B: AsRef<str>>(
    alpha: &[A],
    beta: &[B],
    max_distance: usize,
) -> f64 {
    if alpha.is_empty() || beta.is_empty() {
        return 0.0;
    }

    let mut exact_matches = 0.0;
    let mut distance_matches = 0.0;
    let mut total_distance = 0usize;
    // Lengths of the last compared pair decide the identical-list ratio.
    let mut last_alpha_length = 0usize;
    let mut last_beta_length = 0usize;

    for ii in 0..alpha.len().min(beta.len()) {
        let token = alpha[ii].as_ref();
        last_alpha_length = token.len();
        last_beta_length = beta[ii].as_ref().len();

        let matched = compare_strings(token, beta[ii].as_ref());
        if matched == 1.0 {
            exact_matches += matched;
            continue;
        }

        let mut highest = matched;
        let mut highest_distance = 0usize;
        let mut found = None;

        for step in (1..max_distance).take_while(|step| *step <= ii) {
            last_beta_length = beta[ii - step].as_ref().len();
            let candidate = compare_strings(token, beta[ii - step].as_ref());
            if candidate == 1.0 {
                found = Some(step);
                break;
            }
            if candidate > highest {
                highest = candidate;
                highest_distance = step;
            }
        }

        if found.is_none() {
            for step in (1..max_distance).take_while(|step| ii + step < beta.len()) {
                last_beta_length = beta[ii + step].as_ref().len();
                let candidate = compare_strings(token, beta[ii + step].as_ref());
                if candidate == 1.0 {
                    found = Some(step);
                    break;
                }
                if candidate > highest {
                    highest = candidate;
                    highest_distance = step;
                }
            }
        }

        match found {
            Some(distance) => {
                distance_matches += 1.0;
                total_distance += distance + 1;
            }
            None => {
                distance_matches += highest;
                total_distance += highest_distance + 1;
            }
        }
    }

    score(
        exact_matches,
        distance_matches,
        total_distance as f64,
        alpha.len(),
        beta.len(),
        last_alpha_length,
        last_beta_length,
    )
}

fn score(
    exact: f64,
    distance: f64,
    total_distance: f64,
    alpha_count: usize,
    beta_count: usize,
    alpha_length: usize,
    beta_length: usize,
) -> f64 {
    if exact <= 0.0 && distance <= 0.0 {
        return 0.0;
    }

    let mut average = (alpha_count + beta_count) / 2;
    if exact as usize > average {
        average = exact as usize;
    }
    let average = average as f64;

    if exact as usize as f64 == average {
        return match alpha_length.cmp(&beta_length) {
            std::cmp::Ordering::Greater => beta_length as f64 / alpha_length as f64,
            std::cmp::Ordering::Less => alpha_length as f64 / beta_length as f64,
            std::cmp::Ordering::Equal => exact / average,
        };
    }

    if distance <= 0.0 {
        exact / average
    } else if exact <= 0.0 {
        (distance / average) / (total_distance / distance)
    } else {
        exact / average + (distance / average) / (total_distance / distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_one() {
        assert_eq!(compare_strings("search", "search"), 1.0);
        assert_eq!(compare_strings("", "search"), 0.0);
    }

    #[test]
    fn test_prefix_strings_score_by_average_length() {
        assert_eq!(compare_strings("sea", "search"), 0.75);
        assert_eq!(compare_strings("search", "sea"), 0.75);
    }

    #[test]
    fn test_displaced_characters_score_partially() {
        let exact = compare_strings("abcd", "abcd");
        let swapped = compare_strings("abdc", "abcd");
        let unrelated = compare_strings("wxyz", "abcd");

        assert!(swapped > 0.0 && swapped < 2.0);
        assert!(swapped != exact);
        assert_eq!(unrelated, 0.0);
    }

    #[test]
    fn test_compare_arrays() {
        let query = ["red", "car"];

        assert_eq!(compare_arrays(&query, &["red", "car"], 4), 1.0);
        assert_eq!(compare_arrays(&query, &["moon", "sky"], 4), 0.0);
        assert!(compare_arrays(&query, &["car", "red"], 4) > 0.0);
        assert_eq!(compare_arrays::<&str, &str>(&[], &["red"], 4), 0.0);
    }

    #[test]
    fn test_token_serialization() {
        let tokens = ["red", "sport", "car"];
        let serialized = serialize_tokens(&tokens);

        assert_eq!(deserialize_tokens(&serialized, 3), vec!["red", "sport", "car"]);
        assert_eq!(deserialize_tokens(&serialized, 2), vec!["red", "sport"]);
        assert!(deserialize_tokens("", 3).is_empty());
    }

    #[test]
    fn test_relevancy_keys() {
        assert_eq!(relevancy_key("title"), "title_relevancyIndex");
        assert_eq!(relevancy_length_key("title"), "title_relevancyIndexLength");
    }
}
