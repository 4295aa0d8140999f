//! "Did you mean" handling for commands that could not be resolved.
//!
//! [`suggest`] ranks the candidate universe against the mistyped name; when it
//! finds anything, the interpreter waits for the next line and hands it to
//! [`resolve`].

use crate::error::ShellError;
use std::fmt::Write as _;
use std::num::{IntErrorKind, ParseIntError};

/// Candidates at this distance or further are never offered.
pub const MAX_DISTANCE: usize = 3;

/// At most this many candidates are offered.
pub const MAX_CANDIDATES: usize = 3;

/// A correction menu waiting for the user's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCorrection {
    typo: String,
    candidates: Vec<String>,
    args: Vec<String>,
}

impl PendingCorrection {
    pub fn typo(&self) -> &str {
        &self.typo
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Arguments of the failed invocation.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The numbered menu shown to the user.
    pub fn menu(&self) -> String {
        let mut text = format!("Command not found: '{}'. Did you mean:\n", self.typo);
        for (i, candidate) in self.candidates.iter().enumerate() {
            let _ = writeln!(text, "  {}) {}", i + 1, candidate);
        }
        let _ = write!(
            text,
            "Enter a number (1-{}) or 'n' to cancel: ",
            self.candidates.len()
        );
        text
    }
}

/// Levenshtein distance over chars: the fewest single-character insertions,
/// deletions and substitutions turning `a` into `b`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        row[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            row[j] = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// Closest names to `typo`, nearest first.
///
/// Only names closer than [`MAX_DISTANCE`] qualify. Ties keep the order of
/// `universe`.
pub fn rank(typo: &str, universe: &[String]) -> Vec<String> {
    let mut scored: Vec<(usize, &String)> = universe
        .iter()
        .map(|candidate| (edit_distance(typo, candidate), candidate))
        .filter(|(distance, _)| *distance < MAX_DISTANCE)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

/// Build the correction menu for a command that failed to resolve, or `None`
/// when nothing in `universe` is close enough.
pub fn suggest(typo: &str, args: &[String], universe: &[String]) -> Option<PendingCorrection> {
    let candidates = rank(typo, universe);
    tracing::debug!(typo, ?candidates, "ranked corrections");
    if candidates.is_empty() {
        return None;
    }
    Some(PendingCorrection {
        typo: typo.to_string(),
        candidates,
        args: args.to_vec(),
    })
}

/// Interpret the reply to a correction menu.
///
/// A valid 1-based choice yields the text to place in the input buffer: the
/// chosen name and a trailing space. The chosen command is not run.
pub fn resolve(pending: PendingCorrection, response: &str) -> Result<String, ShellError> {
    let reply = response.trim();
    let max = pending.candidates.len();
    let invalid = || ShellError::InvalidChoice {
        choice: reply.to_string(),
        max,
    };
    let choice: i64 = match reply.parse() {
        Ok(choice) => choice,
        // still a number, just not one any menu has
        Err(err) if is_overflow(&err) => return Err(invalid()),
        Err(_) => return Err(ShellError::CorrectionAborted),
    };
    let chosen = usize::try_from(choice)
        .ok()
        .filter(|i| (1..=max).contains(i))
        .ok_or_else(invalid)?;
    Ok(format!("{} ", pending.candidates[chosen - 1]))
}

fn is_overflow(err: &ParseIntError) -> bool {
    matches!(
        err.kind(),
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn universe(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn distance_basics() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("gti", "git"), 2);
        assert_eq!(edit_distance("ehco", "echo"), 2);
        assert_eq!(edit_distance("pdw", "pwd"), 2);
    }

    #[test]
    fn rank_orders_by_distance_then_universe_order() {
        let all = universe(&["gist", "git", "grep", "gi", "ls"]);
        // gist: 1, git: 0, grep: 3, gi: 1, ls: 3
        assert_eq!(rank("git", &all), vec!["git", "gist", "gi"]);
    }

    #[test]
    fn rank_caps_at_three() {
        let all = universe(&["ab", "ac", "ad", "ae"]);
        assert_eq!(rank("aa", &all), vec!["ab", "ac", "ad"]);
    }

    #[test]
    fn suggest_returns_none_when_nothing_close() {
        let all = universe(&["echo", "exit"]);
        assert_eq!(suggest("kubectl", &[], &all), None);
    }

    #[test]
    fn menu_lists_numbered_candidates() {
        let all = universe(&["echo", "exit"]);
        let pending = suggest("ecoh", &["hi".to_string()], &all).unwrap();
        assert_eq!(pending.args(), &["hi".to_string()]);
        assert_eq!(
            pending.menu(),
            "Command not found: 'ecoh'. Did you mean:\n  1) echo\n\
             Enter a number (1-1) or 'n' to cancel: "
        );
    }

    #[test]
    fn resolve_valid_choice_fills_buffer() {
        let all = universe(&["git", "gist"]);
        let pending = suggest("gis", &[], &all).unwrap();
        assert_eq!(resolve(pending.clone(), "1").unwrap(), "git ");
        assert_eq!(resolve(pending, " 2 ").unwrap(), "gist ");
    }

    #[test]
    fn resolve_rejects_bad_replies() {
        let all = universe(&["git"]);
        let pending = suggest("gti", &[], &all).unwrap();
        assert!(matches!(
            resolve(pending.clone(), "n"),
            Err(ShellError::CorrectionAborted)
        ));
        assert!(matches!(
            resolve(pending.clone(), ""),
            Err(ShellError::CorrectionAborted)
        ));
        assert!(matches!(
            resolve(pending.clone(), "0"),
            Err(ShellError::InvalidChoice { ref choice, max: 1 }) if choice == "0"
        ));
        assert!(matches!(
            resolve(pending, "-4"),
            Err(ShellError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn numbers_too_large_for_any_menu_are_invalid_choices() {
        let all = universe(&["git"]);
        let pending = suggest("gti", &[], &all).unwrap();
        for reply in ["99999999999999999999", "-99999999999999999999"] {
            let err = resolve(pending.clone(), reply).unwrap_err();
            assert!(matches!(err, ShellError::InvalidChoice { .. }), "{}", reply);
            assert_eq!(err.to_string(), "--- Invalid choice. Aborted. ---");
        }
    }

    proptest! {
        #[test]
        fn offered_iff_closer_than_three(typo in "[a-d]{0,5}", candidate in "[a-d]{0,5}") {
            let all = vec![candidate.clone()];
            let offered = rank(&typo, &all);
            let d = edit_distance(&typo, &candidate);
            prop_assert_eq!(!offered.is_empty(), d < MAX_DISTANCE);
        }

        #[test]
        fn ranking_is_ascending_and_bounded(
            typo in "[a-c]{1,4}",
            names in proptest::collection::vec("[a-c]{1,4}", 0..12),
        ) {
            let offered = rank(&typo, &names);
            prop_assert!(offered.len() <= MAX_CANDIDATES);
            let distances: Vec<usize> = offered
                .iter()
                .map(|c| edit_distance(&typo, c))
                .collect();
            prop_assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn distance_is_symmetric(a in "\\PC{0,6}", b in "\\PC{0,6}") {
            prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
        }
    }
}
