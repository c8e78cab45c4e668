// libs/voice-cell/src/services/matcher.rs
use chrono::{Duration, NaiveDate};
use tracing::debug;

use shared_config::MatcherConfig;
use shared_models::Doctor;

use crate::models::{DateRule, ResolvedDate};

/// Domain filler tokens stripped before scoring. Removed as substrings, in
/// this order, matching the legacy behavior ("dr." before "dr" so the dot
/// goes with it).
const STOPLIST: [&str; 7] = ["doctor", "dr.", "dr", "appointment", "book", "with", "for"];

/// Phrases that end a voice session wherever they appear in a command.
const STOP_PHRASES: [&str; 4] = ["stop", "exit", "cancel", "close"];

/// Lower-case, strip the filler stoplist, and keep only alphanumerics and
/// whitespace. Applied identically to commands and candidate names so the
/// similarity score stays symmetric.
pub fn normalize(text: &str) -> String {
    let mut text = text.to_lowercase();
    for word in STOPLIST {
        text = text.replace(word, "");
    }
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn is_stop_phrase(command: &str) -> bool {
    let command = command.to_lowercase();
    STOP_PHRASES.iter().any(|p| command.contains(p))
}

/// Sequence similarity in `[0, 1]`: twice the total length of matched
/// character runs over the combined length (Ratcliff/Obershelp). The run
/// total is the longest common substring plus, recursively, the best runs on
/// either side of it.
pub fn similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matched_run_total(&a, &b);
    2.0 * matched as f32 / total as f32
}

fn matched_run_total(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut stack = vec![(0usize, a.len(), 0usize, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = stack.pop() {
        let (a_start, b_start, size) = longest_common_run(a, a_lo, a_hi, b, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        total += size;
        stack.push((a_lo, a_start, b_lo, b_start));
        stack.push((a_start + size, a_hi, b_start + size, b_hi));
    }

    total
}

/// Longest common substring of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`,
/// preferring the earliest start on ties.
fn longest_common_run(
    a: &[char],
    a_lo: usize,
    a_hi: usize,
    b: &[char],
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let mut best = (a_lo, b_lo, 0usize);
    // run_ends[j] = length of the common run ending at (i, j).
    let mut run_ends = vec![0usize; b_hi.saturating_sub(b_lo)];

    for i in a_lo..a_hi {
        let mut prev_diagonal = 0;
        for (j_off, j) in (b_lo..b_hi).enumerate() {
            let current = run_ends[j_off];
            if a[i] == b[j] {
                let size = prev_diagonal + 1;
                run_ends[j_off] = size;
                if size > best.2 {
                    best = (i + 1 - size, j + 1 - size, size);
                }
            } else {
                run_ends[j_off] = 0;
            }
            prev_diagonal = current;
        }
    }

    best
}

/// Approximate doctor-name matching over a candidate directory.
pub struct DoctorMatcher {
    config: MatcherConfig,
}

impl DoctorMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Resolve a free-form command to a doctor, or `None` below threshold.
    ///
    /// Each candidate scores the base similarity of normalized name against
    /// normalized command, plus a fixed bonus when the candidate's first or
    /// last name token appears verbatim in the command. Ties keep the first
    /// candidate in input order; callers relying on the tie-break must pass
    /// a stable ordering.
    pub fn match_doctor<'a>(&self, command: &str, candidates: &'a [Doctor]) -> Option<&'a Doctor> {
        let command_clean = normalize(command);
        let mut best_match: Option<&Doctor> = None;
        let mut highest_score = 0.0f32;

        for doctor in candidates {
            let name_clean = normalize(&doctor.full_name());
            let mut score = similarity(&name_clean, &command_clean);

            let first = doctor.first_name.to_lowercase();
            let last = doctor.last_name.to_lowercase();
            if command_clean.contains(&first) || command_clean.contains(&last) {
                score += self.config.name_token_bonus;
            }

            debug!("Comparing '{}' -> score {:.2}", doctor.full_name(), score);

            if score > highest_score {
                highest_score = score;
                best_match = Some(doctor);
            }
        }

        if highest_score >= self.config.score_threshold {
            if let Some(doctor) = best_match {
                debug!("Matched doctor: {} (score {:.2})", doctor.full_name(), highest_score);
                return Some(doctor);
            }
        }

        debug!("No close doctor match found");
        None
    }
}

/// Map a command's temporal cue to a calendar date.
///
/// "tomorrow" wins over "today" when both appear, and anything without a
/// recognizable cue falls back to tomorrow. The fallback favors the next
/// business day over an ambiguous same-day booking; callers receive the rule
/// that fired so they can announce the default out loud.
pub fn resolve_relative_date(command: &str, today: NaiveDate) -> ResolvedDate {
    let command = command.to_lowercase();

    if command.contains("tomorrow") {
        ResolvedDate {
            date: today + Duration::days(1),
            rule: DateRule::Tomorrow,
        }
    } else if command.contains("today") || command.contains("aaj") {
        ResolvedDate {
            date: today,
            rule: DateRule::Today,
        }
    } else {
        ResolvedDate {
            date: today + Duration::days(1),
            rule: DateRule::DefaultTomorrow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_filler_and_punctuation() {
        assert_eq!(normalize("Book an appointment with Dr. Smith!"), "an    smith");
        assert_eq!(normalize("DOCTOR JONES"), "jones");
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("smith", "smith"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn similarity_counts_matched_runs() {
        // Runs "ab" and "d" match out of 4 + 4 chars: 2*3/8.
        assert!((similarity("abcd", "abxd") - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn resolve_prefers_tomorrow_cue() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let resolved = resolve_relative_date("book smith tomorrow", today);
        assert_eq!(resolved.rule, DateRule::Tomorrow);
        assert_eq!(resolved.date, today + Duration::days(1));
    }

    #[test]
    fn resolve_recognizes_today_and_transliteration() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(resolve_relative_date("smith today", today).rule, DateRule::Today);
        assert_eq!(resolve_relative_date("smith aaj", today).rule, DateRule::Today);
    }

    #[test]
    fn resolve_defaults_to_tomorrow_without_cue() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let resolved = resolve_relative_date("book smith", today);
        assert_eq!(resolved.rule, DateRule::DefaultTomorrow);
        assert_eq!(resolved.date, today + Duration::days(1));
    }

    #[test]
    fn stop_phrase_matches_anywhere() {
        assert!(is_stop_phrase("please cancel everything"));
        assert!(is_stop_phrase("STOP"));
        assert!(!is_stop_phrase("book smith tomorrow"));
    }
}
