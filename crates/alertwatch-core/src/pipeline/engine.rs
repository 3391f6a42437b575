//! Evaluation engine.
//!
//! One evaluation cycle ranks the snapshot for every tracked boundary kind,
//! claims newly reached transitions in the ledger and dispatches one alert
//! per claim. The engine owns the ledger; cycles must run one at a time
//! (`evaluate` takes `&mut self`), which keeps the check-and-mark race out.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = Evaluator::new(notifier, selected);
//! // In a loop:
//! let report = engine.evaluate(&snapshot, clock.now()).await;
//! ```

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info};

use crate::exchange::SelectedItem;
use crate::feed::Snapshot;
use crate::ledger::AnnouncementLedger;
use crate::notify::{AlertFormatter, Notifier};
use crate::ranker::{select_boundary_candidate, BoundaryKind, Transition};

/// One dispatch attempt made during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub guid: String,
    pub transition: Transition,
    pub delivered: bool,
}

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    pub announcements: Vec<Announcement>,
    /// Identity of the item now exposed as the current one.
    pub selected: Option<String>,
}

pub struct Evaluator {
    ledger: AnnouncementLedger,
    notifier: Arc<dyn Notifier>,
    formatter: AlertFormatter,
    heads_up: Duration,
    selected: SelectedItem,
}

impl Evaluator {
    pub fn new(notifier: Arc<dyn Notifier>, selected: SelectedItem) -> Self {
        Self {
            ledger: AnnouncementLedger::new(),
            notifier,
            formatter: AlertFormatter::default(),
            heads_up: Duration::minutes(10),
            selected,
        }
    }

    pub fn with_formatter(mut self, formatter: AlertFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Lead time of the starting-soon transition.
    pub fn with_heads_up(mut self, lead: Duration) -> Self {
        self.heads_up = lead;
        self
    }

    pub fn ledger(&self) -> &AnnouncementLedger {
        &self.ledger
    }

    /// Boundary kinds in evaluation order.
    pub fn boundary_kinds(&self) -> [BoundaryKind; 3] {
        [
            BoundaryKind::Expiry,
            BoundaryKind::HeadsUp(self.heads_up),
            BoundaryKind::Start,
        ]
    }

    /// Run one cycle against `snapshot` at instant `now`.
    pub async fn evaluate(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> EvaluationReport {
        let mut report = EvaluationReport::default();

        for kind in self.boundary_kinds() {
            let candidate = select_boundary_candidate(snapshot, kind, now);

            if kind == BoundaryKind::Start {
                match candidate {
                    Some(c) => {
                        self.selected.publish(c.item.clone());
                        report.selected = Some(c.item.guid.clone());
                    }
                    None => self.selected.clear(),
                }
            }

            let Some(c) = candidate.filter(|c| c.reached()) else {
                continue;
            };
            let transition = kind.transition();
            if !self.ledger.claim(&c.item.guid, transition) {
                continue;
            }

            let message = self.formatter.format_notification(transition, now, c.item);
            let delivered = match self.notifier.dispatch(&message).await {
                Ok(()) => {
                    info!(
                        guid = %c.item.guid,
                        %transition,
                        notifier = self.notifier.name(),
                        "alert dispatched"
                    );
                    true
                }
                Err(e) => {
                    error!(guid = %c.item.guid, %transition, "alert delivery failed: {e}");
                    false
                }
            };

            report.announcements.push(Announcement {
                guid: c.item.guid.clone(),
                transition,
                delivered,
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use crate::feed::Item;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn dispatch(&self, message: &str) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(message.to_string());
            if self.fail {
                Err(DeliveryError::NotConfigured)
            } else {
                Ok(())
            }
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 18, 30, 0).unwrap()
    }

    fn snapshot(items: Vec<Item>) -> Snapshot {
        Snapshot::new(items, now())
    }

    #[tokio::test]
    async fn start_boundary_is_announced_once() {
        let recorder = Arc::new(Recorder::default());
        let mut engine = Evaluator::new(recorder.clone(), SelectedItem::new());
        let snap = snapshot(vec![Item::new("a", "Alpha").with_start(now())]);

        let first = engine.evaluate(&snap, now()).await;
        let second = engine.evaluate(&snap, now()).await;

        assert_eq!(
            first.announcements,
            vec![Announcement {
                guid: "a".into(),
                transition: Transition::Starting,
                delivered: true,
            }]
        );
        assert!(second.announcements.is_empty());
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expiry_and_heads_up_get_banners() {
        let recorder = Arc::new(Recorder::default());
        let mut engine = Evaluator::new(recorder.clone(), SelectedItem::new());
        let snap = snapshot(vec![
            Item::new("gone", "Gone").with_start(now() - Duration::hours(1)).with_end(now()),
            Item::new("soon", "Soon").with_start(now() + Duration::minutes(10)),
        ]);

        let report = engine.evaluate(&snap, now()).await;
        let kinds: Vec<_> = report.announcements.iter().map(|a| a.transition).collect();
        assert_eq!(kinds, vec![Transition::Expiring, Transition::StartingSoon]);

        let sent = recorder.sent.lock().unwrap();
        assert!(sent[0].starts_with("**EXPIRED!**"));
        assert!(sent[1].starts_with("**HEADS UP!**"));
    }

    #[tokio::test]
    async fn failed_delivery_still_marks_the_ledger() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let mut engine = Evaluator::new(recorder.clone(), SelectedItem::new());
        let snap = snapshot(vec![Item::new("a", "Alpha").with_start(now())]);

        let report = engine.evaluate(&snap, now()).await;
        assert!(!report.announcements[0].delivered);
        assert!(!engine.ledger().should_announce("a", Transition::Starting));

        engine.evaluate(&snap, now()).await;
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn selected_item_tracks_start_candidate() {
        let selected = SelectedItem::new();
        let mut engine = Evaluator::new(Arc::new(Recorder::default()), selected.clone());

        let snap = snapshot(vec![
            Item::new("old", "Old").with_start(now() - Duration::minutes(30)),
            Item::new("new", "New").with_start(now() - Duration::minutes(2)),
        ]);
        let report = engine.evaluate(&snap, now()).await;
        assert_eq!(report.selected.as_deref(), Some("new"));
        assert_eq!(selected.latest().unwrap().guid, "new");

        let future_only = snapshot(vec![Item::new("later", "Later").with_start(now() + Duration::hours(2))]);
        engine.evaluate(&future_only, now()).await;
        assert!(selected.latest().is_none());
    }

    #[tokio::test]
    async fn nothing_is_sent_between_boundaries() {
        let recorder = Arc::new(Recorder::default());
        let mut engine = Evaluator::new(recorder.clone(), SelectedItem::new());
        let snap = snapshot(vec![Item::new("a", "Alpha")
            .with_start(now() - Duration::seconds(5))
            .with_end(now() + Duration::minutes(30))]);

        let report = engine.evaluate(&snap, now()).await;
        assert!(report.announcements.is_empty());
        assert!(recorder.sent.lock().unwrap().is_empty());
    }
}
