//! Athlete name reconciliation
//!
//! The extraction tasks run independently and the oracle is inconsistent
//! about naming: one task answers "Player 1", another "ITA fighter",
//! another the real name. Trusting each task's own labels would let the
//! tasks disagree about who index 0 is. Instead, a canonical pair is
//! derived once (from the narrative) and every collection is rewritten
//! against it: slot order always follows the canonical pair, and
//! placeholder labels are replaced by the canonical name for that slot.

use crate::models::{AdviceRecord, PlayerSeries};
use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder labels the oracle falls back to when it cannot identify
/// an athlete. Matched case-insensitively after stripping a parenthetical
/// suffix such as a country code.
static GENERIC_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(?:
            (?:[a-z]{2,3}\s+)?(?:player|fighter|athlete|competitor)(?:\s*(?:\d+|[a-d]))?
          | (?:the\s+)?(?:blue|red)(?:\s+(?:corner|team|player|fighter))?
          | okay | ok | taekwondo
        )$",
    )
    .expect("generic name pattern is valid")
});

/// Name-shaped tokens in narrative text: capitalized word sequences,
/// optionally suffixed by a 2-3 letter parenthetical country code.
static CANDIDATE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][A-Za-z'’\-]+(?:\s+[A-Z][A-Za-z'’\-]+)+(?:\s*\([A-Z]{2,3}\))?")
        .expect("candidate name pattern is valid")
});

/// Collapse internal whitespace and trim
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True for placeholder labels that should never be shown to a user
pub fn is_generic_name(name: &str) -> bool {
    let base = match name.find('(') {
        Some(i) => &name[..i],
        None => name,
    };
    let base = base.trim();
    base.is_empty() || GENERIC_NAME_RE.is_match(base)
}

/// Derive the two canonical athlete names from candidate mentions
///
/// Candidates are normalized, deduplicated case-insensitively in
/// first-seen order, and padded with synthesized placeholders so the
/// result always holds exactly two non-empty names.
pub fn canonical_pair(candidates: &[String]) -> [String; 2] {
    let mut seen: Vec<String> = Vec::with_capacity(2);
    for raw in candidates {
        let name = normalize_name(raw);
        if name.is_empty() {
            continue;
        }
        if seen.iter().any(|s| s.to_lowercase() == name.to_lowercase()) {
            continue;
        }
        seen.push(name);
        if seen.len() == 2 {
            break;
        }
    }

    let mut names = seen.into_iter();
    [
        names.next().unwrap_or_else(|| "Player 1".to_string()),
        names.next().unwrap_or_else(|| "Player 2".to_string()),
    ]
}

/// Scan narrative text for athlete name mentions
///
/// Returns distinct, non-generic matches in order of first appearance;
/// the caller feeds the first two into [`canonical_pair`].
pub fn extract_candidate_names(narrative: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in CANDIDATE_NAME_RE.find_iter(narrative) {
        let name = normalize_name(m.as_str());
        if is_generic_name(&name) {
            continue;
        }
        if found.iter().any(|s| s.to_lowercase() == name.to_lowercase()) {
            continue;
        }
        found.push(name);
    }
    found
}

/// Decide whether a task-reported name must yield to the canonical one
pub fn should_replace(reported: &str, _canonical: &str) -> bool {
    let normalized = normalize_name(reported);
    normalized.is_empty() || is_generic_name(&normalized)
}

/// The authoritative name for one slot given what a task reported
fn resolve_name(reported: &str, canonical: &str) -> String {
    if should_replace(reported, canonical) {
        canonical.to_string()
    } else {
        normalize_name(reported)
    }
}

/// Rewrite a series collection against the canonical pair
///
/// Guarantees exactly two entries, index-aligned with the pair; excess
/// entries are dropped, missing ones padded with zeroed series.
pub fn align_series(players: &mut Vec<PlayerSeries>, pair: &[String; 2]) {
    players.truncate(2);
    while players.len() < 2 {
        let slot = players.len();
        players.push(PlayerSeries::empty(&pair[slot]));
    }
    for (slot, player) in players.iter_mut().enumerate() {
        player.name = resolve_name(&player.name, &pair[slot]);
    }
}

/// Rewrite an advice collection against the canonical pair
pub fn align_advice(players: &mut Vec<AdviceRecord>, pair: &[String; 2]) {
    players.truncate(2);
    while players.len() < 2 {
        let slot = players.len();
        players.push(AdviceRecord::empty(&pair[slot]));
    }
    for (slot, player) in players.iter_mut().enumerate() {
        player.name = resolve_name(&player.name, &pair[slot]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> [String; 2] {
        [a.to_string(), b.to_string()]
    }

    #[test]
    fn canonical_pair_always_has_two_names() {
        assert_eq!(canonical_pair(&[]), pair("Player 1", "Player 2"));
        assert_eq!(
            canonical_pair(&["Seif Eissa (EGY)".to_string()]),
            pair("Seif Eissa (EGY)", "Player 2")
        );
        assert_eq!(
            canonical_pair(&["  ".to_string(), "".to_string()]),
            pair("Player 1", "Player 2")
        );
    }

    #[test]
    fn canonical_pair_dedupes_case_insensitively() {
        let candidates = vec![
            "Seif  Eissa".to_string(),
            "seif eissa".to_string(),
            "Vito Dell'Aquila".to_string(),
            "Third Person".to_string(),
        ];
        assert_eq!(
            canonical_pair(&candidates),
            pair("Seif Eissa", "Vito Dell'Aquila")
        );
    }

    #[test]
    fn generic_name_detection() {
        for generic in [
            "Player 1",
            "player 2",
            "PLAYER A",
            "Fighter 2",
            "athlete1",
            "Competitor B",
            "ITA fighter",
            "Blue",
            "red",
            "Blue Corner",
            "Red corner (EGY)",
            "blue player",
            "ok",
            "Okay",
            "Taekwondo",
            "",
            "   ",
        ] {
            assert!(is_generic_name(generic), "expected generic: {generic:?}");
        }

        for real in ["Amani Hassan", "Seif Eissa (EGY)", "Vito Dell'Aquila", "Jade Jones (GBR)"] {
            assert!(!is_generic_name(real), "expected real name: {real:?}");
        }
    }

    #[test]
    fn should_replace_matches_generic_detector() {
        assert!(should_replace("Player 2", "Amani Hassan"));
        assert!(!should_replace("Amani Hassan", "Seif Eissa"));
        assert!(should_replace("Blue Corner (EGY)", "X"));
    }

    #[test]
    fn extracts_names_from_narrative() {
        let narrative = "An intense final. Seif Eissa (EGY) opened aggressively while \
                         Vito Dell'Aquila (ITA) countered with fast lead-leg kicks. \
                         Seif Eissa (EGY) took the first round.";
        let names = extract_candidate_names(narrative);
        assert_eq!(names[0], "Seif Eissa (EGY)");
        assert_eq!(names[1], "Vito Dell'Aquila (ITA)");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn narrative_placeholders_are_not_candidates() {
        let narrative = "The Blue Corner started strong against Red Corner in round one.";
        let names = extract_candidate_names(narrative);
        assert!(names.is_empty(), "got {names:?}");
    }

    #[test]
    fn align_series_replaces_generic_names_and_keeps_real_ones() {
        let canon = pair("Seif Eissa (EGY)", "Vito Dell'Aquila (ITA)");
        let mut players = vec![
            PlayerSeries {
                name: "Player 1".to_string(),
                total: 5,
                events: vec![],
            },
            PlayerSeries {
                name: "ITA fighter".to_string(),
                total: 3,
                events: vec![],
            },
        ];
        align_series(&mut players, &canon);
        assert_eq!(players[0].name, "Seif Eissa (EGY)");
        assert_eq!(players[1].name, "Vito Dell'Aquila (ITA)");
        assert_eq!(players[0].total, 5);
        assert_eq!(players[1].total, 3);
    }

    #[test]
    fn align_series_keeps_non_generic_reported_names() {
        let canon = pair("Player 1", "Player 2");
        let mut players = vec![
            PlayerSeries {
                name: "Amani  Hassan".to_string(),
                total: 2,
                events: vec![],
            },
            PlayerSeries {
                name: "".to_string(),
                total: 0,
                events: vec![],
            },
        ];
        align_series(&mut players, &canon);
        assert_eq!(players[0].name, "Amani Hassan");
        assert_eq!(players[1].name, "Player 2");
    }

    #[test]
    fn align_series_pads_and_truncates_to_two() {
        let canon = pair("A B", "C D");

        let mut short: Vec<PlayerSeries> = vec![];
        align_series(&mut short, &canon);
        assert_eq!(short.len(), 2);
        assert_eq!(short[0].name, "A B");
        assert_eq!(short[1].name, "C D");

        let mut long = vec![
            PlayerSeries::empty("A B"),
            PlayerSeries::empty("C D"),
            PlayerSeries::empty("E F"),
        ];
        align_series(&mut long, &canon);
        assert_eq!(long.len(), 2);
    }

    #[test]
    fn align_advice_matches_series_behavior() {
        let canon = pair("Seif Eissa (EGY)", "Vito Dell'Aquila (ITA)");
        let mut players = vec![AdviceRecord::empty("red corner")];
        align_advice(&mut players, &canon);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Seif Eissa (EGY)");
        assert_eq!(players[1].name, "Vito Dell'Aquila (ITA)");
    }
}
