//! Exact-then-partial matching of user input against Open5e records.

use serde_json::Value;

use super::entity::{normalize, Entity, UnknownEntityKind};

/// A record that matched the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub entity: Entity,
    /// `true` when the query is only a substring of the label.
    pub partial: bool,
}

/// Output of a single matching pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    /// Exact matches first (latest found leads), then partial matches in
    /// input order.
    pub matches: Vec<Match>,
    /// Records that could not be matched because they have no label.
    pub unknown: Vec<UnknownEntityKind>,
}

/// Match `candidates` against an already normalized query.
///
/// An exact match is inserted at the front of the result, so when several
/// labels equal the query the last one discovered comes first. Partial
/// matches keep their relative input order behind every exact match.
pub fn search_response<I>(candidates: I, normalized_query: &str) -> MatchReport
where
    I: IntoIterator<Item = Value>,
{
    let mut report = MatchReport::default();

    for candidate in candidates {
        let entity = match Entity::try_from(candidate) {
            Ok(entity) => entity,
            Err(unknown) => {
                report.unknown.push(unknown);
                continue;
            }
        };

        let label = normalize(entity.label());
        if label == normalized_query {
            report.matches.insert(0, Match { entity, partial: false });
        } else if label.contains(normalized_query) {
            report.matches.push(Match { entity, partial: true });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(report: &MatchReport) -> Vec<(&str, bool)> {
        report
            .matches
            .iter()
            .map(|m| (m.entity.label(), m.partial))
            .collect()
    }

    #[test]
    fn test_exact_match_excludes_non_substrings() {
        let candidates = vec![json!({"name": "Fireball"}), json!({"name": "Fire Bolt"})];
        let report = search_response(candidates, "fireball");

        assert_eq!(labels(&report), vec![("Fireball", false)]);
        assert!(report.unknown.is_empty());
    }

    #[test]
    fn test_partial_matches_keep_input_order() {
        let candidates = vec![
            json!({"name": "Young Blue Dragon"}),
            json!({"name": "Adult Blue Dragon"}),
        ];
        let report = search_response(candidates, "bluedragon");

        assert_eq!(
            labels(&report),
            vec![("Young Blue Dragon", true), ("Adult Blue Dragon", true)]
        );
    }

    #[test]
    fn test_exact_match_promoted_ahead_of_earlier_partials() {
        let candidates = vec![
            json!({"name": "Ancient Red Dragon"}),
            json!({"name": "Red Dragon Wyrmling"}),
            json!({"name": "Red Dragon"}),
            json!({"name": "Young Red Dragon"}),
        ];
        let report = search_response(candidates, "reddragon");

        assert_eq!(
            labels(&report),
            vec![
                ("Red Dragon", false),
                ("Ancient Red Dragon", true),
                ("Red Dragon Wyrmling", true),
                ("Young Red Dragon", true),
            ]
        );
    }

    #[test]
    fn test_exact_ties_come_out_in_reverse_discovery_order() {
        let candidates = vec![
            json!({"name": "Light", "slug": "light-a"}),
            json!({"name": "Lightning Bolt"}),
            json!({"name": "LIGHT", "slug": "light-b"}),
        ];
        let report = search_response(candidates, "light");

        let slugs: Vec<_> = report
            .matches
            .iter()
            .map(|m| m.entity.str_field("slug"))
            .collect();
        assert_eq!(slugs, vec![Some("light-b"), Some("light-a"), None]);
        assert!(!report.matches[0].partial);
        assert!(!report.matches[1].partial);
        assert!(report.matches[2].partial);
    }

    #[test]
    fn test_documents_match_on_title() {
        let candidates = vec![
            json!({"title": "Tome of Heroes", "slug": "toh"}),
            json!({"name": "Heroism"}),
        ];
        let report = search_response(candidates, "tomeofheroes");
        assert_eq!(labels(&report), vec![("Tome of Heroes", false)]);
    }

    #[test]
    fn test_label_is_normalized_before_comparison() {
        let candidates = vec![json!({"name": "  Magic   Missile "})];
        let report = search_response(candidates, "magicmissile");
        assert_eq!(labels(&report), vec![("  Magic   Missile ", false)]);
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let report = search_response(Vec::new(), "anything");
        assert!(report.matches.is_empty());
        assert!(report.unknown.is_empty());
    }

    #[test]
    fn test_no_match_yields_empty_list() {
        let candidates = vec![json!({"name": "Shield"}), json!({"title": "Basic Rules"})];
        let report = search_response(candidates, "fireball");
        assert!(report.matches.is_empty());
    }

    #[test]
    fn test_malformed_entities_are_reported_and_skipped() {
        let candidates = vec![
            json!({"slug": "nameless"}),
            json!({"name": "Fireball"}),
            json!({"desc": "also nameless"}),
        ];
        let report = search_response(candidates, "fireball");

        assert_eq!(labels(&report), vec![("Fireball", false)]);
        assert_eq!(report.unknown.len(), 2);
        assert_eq!(report.unknown[0].raw, json!({"slug": "nameless"}));
        assert_eq!(report.unknown[1].raw, json!({"desc": "also nameless"}));
    }

    #[test]
    fn test_exact_always_before_partial() {
        let names = [
            "Fire", "Fire Giant", "Wall of Fire", "fire", "Fireball", "Fire Shield", "F I R E",
        ];
        let candidates: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
        let report = search_response(candidates, "fire");

        let first_partial = report
            .matches
            .iter()
            .position(|m| m.partial)
            .unwrap_or(report.matches.len());
        assert!(report.matches[..first_partial].iter().all(|m| !m.partial));
        assert!(report.matches[first_partial..].iter().all(|m| m.partial));
        assert_eq!(first_partial, 3);

        // Nothing whose label normalizes to the query is ever partial
        for m in &report.matches {
            if normalize(m.entity.label()) == "fire" {
                assert!(!m.partial);
            }
        }
    }

    #[test]
    fn test_empty_iff_nothing_equals_or_contains_query() {
        let sets: Vec<Vec<&str>> = vec![
            vec![],
            vec!["Shield"],
            vec!["Shield", "Shield of Faith"],
            vec!["Mage Armor", "Mage Hand"],
        ];
        for names in sets {
            for query in ["shield", "mage", "zzz", "faith"] {
                let candidates: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
                let report = search_response(candidates, query);
                let expected = names.iter().any(|n| normalize(n).contains(query));
                assert_eq!(!report.matches.is_empty(), expected, "{:?} / {}", names, query);
            }
        }
    }
}
