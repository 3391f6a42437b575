//! Boundary ranking.
//!
//! For a boundary kind, every item whose boundary instant has already been
//! reached is a candidate. Candidates are scored with the proximity ratio
//! `now / boundary` (both in epoch seconds): it is exactly `1.0` at the
//! boundary second and grows as the boundary recedes into the past. The
//! candidate whose ratio is closest to `1.0` (the most recently reached
//! boundary) wins; ties keep the earliest item.
//!
//! Items whose boundary lies in the future are never candidates.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feed::Item;

/// Which lifecycle boundary is being tracked. Also the dedup key kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    Starting,
    Expiring,
    StartingSoon,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Transition::Starting => "starting",
            Transition::Expiring => "expiring",
            Transition::StartingSoon => "starting-soon",
        };
        f.write_str(label)
    }
}

/// A boundary selector over an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// The item's start instant.
    Start,
    /// The item's expiry instant.
    Expiry,
    /// `lead` before the item's start instant.
    HeadsUp(Duration),
}

impl BoundaryKind {
    pub fn transition(&self) -> Transition {
        match self {
            BoundaryKind::Start => Transition::Starting,
            BoundaryKind::Expiry => Transition::Expiring,
            BoundaryKind::HeadsUp(_) => Transition::StartingSoon,
        }
    }

    /// The instant this boundary falls on for `item`, if the item tracks it.
    pub fn instant(&self, item: &Item) -> Option<DateTime<Utc>> {
        match self {
            BoundaryKind::Start => item.starts_at,
            BoundaryKind::Expiry => item.ends_at,
            BoundaryKind::HeadsUp(lead) => item.starts_at.and_then(|s| s.checked_sub_signed(*lead)),
        }
    }
}

/// The winning item for one boundary kind.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Position in the snapshot.
    pub index: usize,
    pub item: &'a Item,
    pub boundary: DateTime<Utc>,
    pub ratio: f64,
}

impl Candidate<'_> {
    /// True only when the evaluation instant lands on the boundary second.
    #[allow(clippy::float_cmp)]
    pub fn reached(&self) -> bool {
        self.ratio == 1.0
    }
}

/// `now / boundary` in epoch seconds. `None` for non-positive boundaries,
/// where the ratio is meaningless.
pub fn proximity_ratio(now: DateTime<Utc>, boundary: DateTime<Utc>) -> Option<f64> {
    let boundary_secs = boundary.timestamp();
    if boundary_secs <= 0 {
        return None;
    }
    Some(now.timestamp() as f64 / boundary_secs as f64)
}

/// Pick the item whose `kind` boundary is the most recently reached one.
///
/// Returns `None` when no item has reached its boundary yet.
pub fn select_boundary_candidate(
    items: &[Item],
    kind: BoundaryKind,
    now: DateTime<Utc>,
) -> Option<Candidate<'_>> {
    let now_secs = now.timestamp();
    let mut best: Option<Candidate<'_>> = None;

    for (index, item) in items.iter().enumerate() {
        let Some(boundary) = kind.instant(item) else {
            continue;
        };
        if now_secs < boundary.timestamp() {
            continue;
        }
        let Some(ratio) = proximity_ratio(now, boundary) else {
            continue;
        };
        if best.map_or(true, |b| ratio < b.ratio) {
            best = Some(Candidate {
                index,
                item,
                boundary,
                ratio,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 18, 30, 0).unwrap()
    }

    #[test]
    fn prefers_most_recent_reached_boundary() {
        let now = now();
        let items = vec![
            Item::new("older", "Older").with_start(now - Duration::seconds(10)),
            Item::new("newer", "Newer").with_start(now - Duration::seconds(1)),
        ];

        let c = select_boundary_candidate(&items, BoundaryKind::Start, now).unwrap();
        assert_eq!(c.item.guid, "newer");
        assert!(!c.reached());
    }

    #[test]
    fn future_boundaries_are_not_candidates() {
        let now = now();
        let items = vec![Item::new("later", "Later").with_start(now + Duration::seconds(1))];
        assert!(select_boundary_candidate(&items, BoundaryKind::Start, now).is_none());
    }

    #[test]
    fn reached_only_on_the_boundary_second() {
        let now = now();
        let items = vec![
            Item::new("a", "A").with_end(now - Duration::minutes(5)),
            Item::new("b", "B").with_end(now),
        ];

        let c = select_boundary_candidate(&items, BoundaryKind::Expiry, now).unwrap();
        assert_eq!(c.item.guid, "b");
        assert!(c.reached());

        let later = now + Duration::seconds(1);
        let c = select_boundary_candidate(&items, BoundaryKind::Expiry, later).unwrap();
        assert_eq!(c.item.guid, "b");
        assert!(!c.reached());
    }

    #[test]
    fn items_without_expiry_are_skipped_for_expiry_only() {
        let now = now();
        let items = vec![Item::new("open", "Open").with_start(now)];

        assert!(select_boundary_candidate(&items, BoundaryKind::Expiry, now).is_none());
        let c = select_boundary_candidate(&items, BoundaryKind::Start, now).unwrap();
        assert_eq!(c.item.guid, "open");
    }

    #[test]
    fn ties_keep_first_occurrence() {
        let now = now();
        let at = now - Duration::seconds(30);
        let items = vec![
            Item::new("first", "First").with_start(at),
            Item::new("second", "Second").with_start(at),
        ];

        let c = select_boundary_candidate(&items, BoundaryKind::Start, now).unwrap();
        assert_eq!(c.index, 0);
    }

    #[test]
    fn heads_up_boundary_is_lead_before_start() {
        let now = now();
        let items = vec![Item::new("soon", "Soon").with_start(now + Duration::minutes(10))];
        let kind = BoundaryKind::HeadsUp(Duration::minutes(10));

        let c = select_boundary_candidate(&items, kind, now).unwrap();
        assert!(c.reached());
        assert_eq!(c.boundary, now);
        assert_eq!(kind.transition(), Transition::StartingSoon);

        let early = now - Duration::seconds(1);
        assert!(select_boundary_candidate(&items, kind, early).is_none());
    }

    #[test]
    fn empty_snapshot_has_no_candidate() {
        assert!(select_boundary_candidate(&[], BoundaryKind::Start, now()).is_none());
    }
}
