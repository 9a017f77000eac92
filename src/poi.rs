//! POI discovery and ranking: groups geodata features by name, scores each
//! name by the total tag count across its occurrences (metadata richness as
//! a proxy for significance), keeps the names that stand out from the rest
//! and returns a bounded candidate list for route re-optimization.

use std::collections::HashMap;

use crate::models::{Coordinate, OsmElement, RankedWaypoint};

/// Maximum waypoint count the optimization provider accepts per request.
pub const MAX_OPTIMIZATION_WAYPOINTS: usize = 12;

/// All occurrences of one named feature, aggregated.
#[derive(Debug, Clone)]
struct NamedGroup {
    name: String,
    /// (center, tag count) per occurrence, in encounter order.
    occurrences: Vec<(Coordinate, u32)>,
}

impl NamedGroup {
    fn quality(&self) -> u32 {
        self.occurrences.iter().map(|(_, tags)| tags).sum()
    }

    /// The occurrence with the highest individual tag count; ties go to the
    /// first one encountered.
    fn representative(&self) -> Coordinate {
        let mut best = self.occurrences[0];
        for &occurrence in &self.occurrences[1..] {
            if occurrence.1 > best.1 {
                best = occurrence;
            }
        }
        best.0
    }
}

/// Rank named features and keep the above-average ones, at most `limit`.
///
/// Elements without a `name` tag or without a `center` cannot be used as
/// waypoints and are skipped. The mean-quality cutoff is strict, so a
/// uniform-quality candidate set yields no waypoints at all; low-signal
/// corridors produce nothing rather than noise.
pub fn rank_waypoints(elements: &[OsmElement], limit: usize) -> Vec<RankedWaypoint> {
    let mut groups: Vec<NamedGroup> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for element in elements {
        let Some(name) = element.tags.get("name") else {
            continue;
        };
        let Some(center) = element.center else {
            continue;
        };
        let occurrence = (Coordinate::from(center), element.tags.len() as u32);

        match index_by_name.get(name) {
            Some(&idx) => groups[idx].occurrences.push(occurrence),
            None => {
                index_by_name.insert(name.clone(), groups.len());
                groups.push(NamedGroup {
                    name: name.clone(),
                    occurrences: vec![occurrence],
                });
            }
        }
    }

    if groups.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<RankedWaypoint> = groups
        .iter()
        .map(|group| RankedWaypoint {
            name: group.name.clone(),
            coordinate: group.representative(),
            quality: group.quality(),
        })
        .collect();

    // Stable sort keeps encounter order among equal qualities.
    candidates.sort_by(|a, b| b.quality.cmp(&a.quality));

    let mean_quality =
        candidates.iter().map(|c| f64::from(c.quality)).sum::<f64>() / candidates.len() as f64;

    candidates.retain(|c| f64::from(c.quality) > mean_quality);
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OsmPoint;

    fn feature(name: &str, lat: f64, lon: f64, extra_tags: u32) -> OsmElement {
        let mut element = OsmElement {
            center: Some(OsmPoint { lat, lon }),
            ..Default::default()
        };
        element.tags.insert("name".into(), name.into());
        for i in 0..extra_tags.saturating_sub(1) {
            element.tags.insert(format!("tag_{i}"), "value".into());
        }
        element
    }

    #[test]
    fn riverside_park_outranks_old_mill_trail() {
        // Three occurrences of "Riverside Park" with tag counts [2, 5, 1] and
        // one "Old Mill Trail" with 4: qualities 8 and 4, mean 6, and only
        // the park passes the strict above-mean filter.
        let elements = vec![
            feature("Riverside Park", 45.0, 5.0, 2),
            feature("Old Mill Trail", 45.1, 5.1, 4),
            feature("Riverside Park", 45.01, 5.01, 5),
            feature("Riverside Park", 45.02, 5.02, 1),
        ];

        let ranked = rank_waypoints(&elements, 12);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Riverside Park");
        assert_eq!(ranked[0].quality, 8);
        // Representative is the 5-tag occurrence.
        assert_eq!(ranked[0].coordinate, Coordinate { lat: 45.01, lon: 5.01 });
    }

    #[test]
    fn every_returned_quality_strictly_exceeds_unfiltered_mean() {
        let elements = vec![
            feature("A", 45.0, 5.0, 9),
            feature("B", 45.1, 5.0, 3),
            feature("C", 45.2, 5.0, 2),
            feature("D", 45.3, 5.0, 7),
            feature("B", 45.1, 5.01, 4),
        ];
        let qualities: Vec<u32> = vec![9, 7, 2, 7]; // A, B(3+4), C, D
        let mean = qualities.iter().sum::<u32>() as f64 / qualities.len() as f64;

        let ranked = rank_waypoints(&elements, 12);
        assert!(!ranked.is_empty());
        for waypoint in &ranked {
            assert!(f64::from(waypoint.quality) > mean);
        }
    }

    #[test]
    fn uniform_quality_yields_no_waypoints() {
        let elements = vec![
            feature("A", 45.0, 5.0, 3),
            feature("B", 45.1, 5.0, 3),
            feature("C", 45.2, 5.0, 3),
        ];
        assert!(rank_waypoints(&elements, 12).is_empty());
    }

    #[test]
    fn representative_tie_goes_to_first_occurrence() {
        let elements = vec![
            feature("Canal Path", 45.0, 5.0, 4),
            feature("Canal Path", 45.5, 5.5, 4),
            feature("Filler", 45.9, 5.9, 1),
        ];
        let ranked = rank_waypoints(&elements, 12);
        assert_eq!(ranked[0].name, "Canal Path");
        assert_eq!(ranked[0].coordinate, Coordinate { lat: 45.0, lon: 5.0 });
    }

    #[test]
    fn limit_caps_the_result() {
        let elements = vec![
            feature("A", 45.0, 5.0, 10),
            feature("B", 45.1, 5.0, 9),
            feature("C", 45.2, 5.0, 8),
            feature("D", 45.3, 5.0, 1),
            feature("E", 45.4, 5.0, 1),
        ];
        let ranked = rank_waypoints(&elements, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "A");
        assert_eq!(ranked[1].name, "B");
    }

    #[test]
    fn unnamed_or_centerless_features_are_skipped() {
        let mut unnamed = OsmElement {
            center: Some(OsmPoint { lat: 45.0, lon: 5.0 }),
            ..Default::default()
        };
        unnamed.tags.insert("leisure".into(), "park".into());

        let mut centerless = OsmElement::default();
        centerless.tags.insert("name".into(), "Ghost Park".into());

        assert!(rank_waypoints(&[unnamed, centerless], 12).is_empty());
    }

    #[test]
    fn no_features_is_an_empty_list_not_an_error() {
        assert_eq!(rank_waypoints(&[], 12), Vec::new());
    }
}
