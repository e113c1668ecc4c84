//! Abuse reports and their moderation status.

use serde::Serialize;
use tracing::info;

use crate::backend::{Delay, MockClient, Query, Table};
use crate::error::{BackendError, BackendResult};
use crate::models::{ListingRef, Report, ReportStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewReport {
    pub reported_user_id: Option<String>,
    pub listing: Option<ListingRef>,
    pub reason: String,
    pub description: String,
}

/// Statuses a reviewer can move a report to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Reviewed,
    Resolved,
    Dismissed,
}

impl From<ReviewOutcome> for ReportStatus {
    fn from(outcome: ReviewOutcome) -> Self {
        match outcome {
            ReviewOutcome::Reviewed => ReportStatus::Reviewed,
            ReviewOutcome::Resolved => ReportStatus::Resolved,
            ReviewOutcome::Dismissed => ReportStatus::Dismissed,
        }
    }
}

#[derive(Serialize)]
struct ReviewPatch<'a> {
    status: ReportStatus,
    reviewed_by: &'a str,
    reviewed_at: chrono::DateTime<chrono::Utc>,
}

pub struct Reports {
    client: MockClient,
    reports: Vec<Report>,
}

impl Reports {
    pub fn new(client: MockClient) -> Self {
        Self {
            client,
            reports: Vec::new(),
        }
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn pending(&self) -> Vec<&Report> {
        self.reports
            .iter()
            .filter(|r| r.status == ReportStatus::Pending)
            .collect()
    }

    pub async fn load(&mut self) -> BackendResult<&[Report]> {
        self.client.latency().pause(Delay::Load).await;
        self.reports = self
            .client
            .select(&Query::table(Table::Reports))
            .await
            .into_result()?;
        Ok(self.reports.as_slice())
    }

    pub async fn create(&mut self, new: NewReport) -> BackendResult<Report> {
        if new.reason.trim().is_empty() {
            return Err(BackendError::Validation(
                "Debes indicar el motivo del reporte".to_string(),
            ));
        }
        let reporter_id = self.client.session_user_id()?;
        let draft = Report {
            id: String::new(),
            reporter_id,
            reported_user_id: new.reported_user_id,
            listing: new.listing,
            reason: new.reason.trim().to_string(),
            description: new.description,
            status: ReportStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: self.client.now(),
        };
        let report = self
            .client
            .insert(Table::Reports, draft)
            .await
            .into_result()?;
        info!("Report {} filed ({})", report.id, report.reason);
        self.reports.insert(0, report.clone());
        Ok(report)
    }

    /// Record the signed-in user as reviewer.
    pub async fn update_status(
        &mut self,
        id: &str,
        outcome: ReviewOutcome,
    ) -> BackendResult<Report> {
        let reviewer = self.client.session_user_id()?;
        let patch = ReviewPatch {
            status: outcome.into(),
            reviewed_by: &reviewer,
            reviewed_at: self.client.now(),
        };
        let report: Report = self
            .client
            .update(&Query::by_id(Table::Reports, id), &patch)
            .await
            .into_result()?;
        match self.reports.iter_mut().find(|r| r.id == report.id) {
            Some(cached) => *cached = report.clone(),
            None => self.reports.insert(0, report.clone()),
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ManualClock;
    use crate::config::MockConfig;
    use crate::models::seed::DEMO_EMAIL;
    use chrono::Duration;
    use std::sync::Arc;

    async fn signed_in() -> (MockClient, ManualClock) {
        let clock = ManualClock::default();
        let client = MockClient::with_clock(&MockConfig::for_tests(), Arc::new(clock.clone()));
        client.auth().sign_in_with_password(DEMO_EMAIL, "x").await;
        (client, clock)
    }

    fn spam() -> NewReport {
        NewReport {
            listing: Some(ListingRef::product("2")),
            reason: "spam".to_string(),
            description: "Publicación repetida".to_string(),
            ..NewReport::default()
        }
    }

    #[tokio::test]
    async fn test_new_reports_are_pending() {
        let (client, _) = signed_in().await;
        let mut reports = Reports::new(client);
        let report = reports.create(spam()).await.unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.reporter_id, "1");
        assert_eq!(reports.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_reports_are_kept() {
        let (client, _) = signed_in().await;
        let mut reports = Reports::new(client.clone());
        reports.create(spam()).await.unwrap();
        reports.create(spam()).await.unwrap();
        assert_eq!(client.snapshot().await.len(Table::Reports), 2);
    }

    #[tokio::test]
    async fn test_review_stamps_reviewer_and_time() {
        let (client, clock) = signed_in().await;
        let mut reports = Reports::new(client);
        let report = reports.create(spam()).await.unwrap();
        clock.advance(Duration::minutes(10));

        let reviewed = reports
            .update_status(&report.id, ReviewOutcome::Dismissed)
            .await
            .unwrap();
        assert_eq!(reviewed.status, ReportStatus::Dismissed);
        assert_eq!(reviewed.reviewed_by.as_deref(), Some("1"));
        assert_eq!(reviewed.reviewed_at, Some(report.created_at + Duration::minutes(10)));
        assert!(reports.pending().is_empty());
    }

    #[tokio::test]
    async fn test_review_of_missing_report() {
        let (client, _) = signed_in().await;
        let mut reports = Reports::new(client);
        let result = reports.update_status("404", ReviewOutcome::Resolved).await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reason_is_required() {
        let (client, _) = signed_in().await;
        let mut reports = Reports::new(client);
        let result = reports
            .create(NewReport {
                reason: "  ".to_string(),
                ..spam()
            })
            .await;
        assert!(matches!(result, Err(BackendError::Validation(_))));
    }
}
