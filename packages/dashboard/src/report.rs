//! Test report form.
//!
//! The form holds raw text exactly as typed. Values are converted to
//! integers only at submission; the form is cleared only after the
//! service confirms the report, so a failed submission can be retried by
//! submitting again.

use rural_health_client::{AnalyticsService, ClientError};
use rural_health_surveillance_models::TestReport;
use strum_macros::{AsRefStr, Display};

/// A field of the report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FormField {
    /// Selected village.
    VillageId,
    /// Selected disease.
    DiseaseId,
    /// Tests conducted.
    TestsDone,
    /// Positive results.
    PositiveCases,
}

impl FormField {
    /// All fields in form order.
    pub const ALL: &[Self] = &[
        Self::VillageId,
        Self::DiseaseId,
        Self::TestsDone,
        Self::PositiveCases,
    ];

    /// Field label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VillageId => "Village",
            Self::DiseaseId => "Disease",
            Self::TestsDone => "Tests Conducted",
            Self::PositiveCases => "Positive Cases",
        }
    }
}

/// Errors converting the form into a report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// A required field was left empty.
    #[error("{} is required", .field.label())]
    Missing {
        /// The empty field.
        field: FormField,
    },

    /// A field does not hold a whole number.
    #[error("{} must be a whole number, got {value:?}", .field.label())]
    NotANumber {
        /// The offending field.
        field: FormField,
        /// What was typed.
        value: String,
    },
}

/// Errors submitting the form.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The form could not be converted.
    #[error(transparent)]
    Form(#[from] FormError),

    /// The service did not accept the report.
    #[error("Submission failed: {0}")]
    Client(#[from] ClientError),
}

/// Raw contents of the report form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    village_id: String,
    disease_id: String,
    tests_done: String,
    positive_cases: String,
}

impl ReportForm {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field's raw text.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    /// A field's raw text.
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::VillageId => &self.village_id,
            FormField::DiseaseId => &self.disease_id,
            FormField::TestsDone => &self.tests_done,
            FormField::PositiveCases => &self.positive_cases,
        }
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resets every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::VillageId => &mut self.village_id,
            FormField::DiseaseId => &mut self.disease_id,
            FormField::TestsDone => &mut self.tests_done,
            FormField::PositiveCases => &mut self.positive_cases,
        }
    }

    fn parse(&self, field: FormField) -> Result<i64, FormError> {
        let raw = self.get(field).trim();
        if raw.is_empty() {
            return Err(FormError::Missing { field });
        }
        raw.parse().map_err(|_| FormError::NotANumber {
            field,
            value: raw.to_string(),
        })
    }

    /// Converts the form into a report.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] for the first empty or non-numeric field.
    pub fn to_report(&self) -> Result<TestReport, FormError> {
        Ok(TestReport {
            village_id: self.parse(FormField::VillageId)?,
            disease_id: self.parse(FormField::DiseaseId)?,
            tests_done: self.parse(FormField::TestsDone)?,
            positive_cases: self.parse(FormField::PositiveCases)?,
        })
    }

    /// Submits the form as a single report.
    ///
    /// On success the form is cleared and the submitted report returned.
    /// On failure the form is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Form`] if the form is incomplete, or
    /// [`SubmitError::Client`] if the service rejects the submission.
    pub async fn submit(
        &mut self,
        service: &dyn AnalyticsService,
    ) -> Result<TestReport, SubmitError> {
        let report = self.to_report()?;

        if let Err(e) = service.submit_reports(&[report]).await {
            log::warn!("Report for village {} not accepted: {e}", report.village_id);
            return Err(e.into());
        }

        log::info!(
            "Submitted report for village {} ({} tests, {} positive)",
            report.village_id,
            report.tests_done,
            report.positive_cases
        );
        self.clear();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rural_health_session::{Authorization, MemoryBackend, Role, SessionStore, authorize};

    use super::*;
    use crate::testing::MockService;

    fn filled() -> ReportForm {
        let mut form = ReportForm::new();
        form.set(FormField::VillageId, "3");
        form.set(FormField::DiseaseId, "1");
        form.set(FormField::TestsDone, "50");
        form.set(FormField::PositiveCases, "12");
        form
    }

    #[test]
    fn converts_fields_to_integers() {
        let report = filled().to_report().unwrap();
        assert_eq!(
            report,
            TestReport {
                village_id: 3,
                disease_id: 1,
                tests_done: 50,
                positive_cases: 12,
            }
        );
    }

    #[test]
    fn reports_first_bad_field() {
        let mut form = filled();
        form.set(FormField::DiseaseId, "");
        assert_eq!(
            form.to_report(),
            Err(FormError::Missing {
                field: FormField::DiseaseId
            })
        );

        form.set(FormField::DiseaseId, "1");
        form.set(FormField::TestsDone, "fifty");
        assert!(matches!(
            form.to_report(),
            Err(FormError::NotANumber { field: FormField::TestsDone, .. })
        ));
    }

    #[tokio::test]
    async fn officer_submission_clears_form_and_keeps_session() {
        let store = SessionStore::open(MemoryBackend::default());
        store.login(Role::Officer, "MED-3").unwrap();
        let service = Arc::new(MockService::default());

        let mut form = filled();
        let report = form.submit(service.as_ref()).await.unwrap();

        assert_eq!(report.tests_done, 50);
        assert!(form.is_empty());
        for field in FormField::ALL {
            assert_eq!(form.get(*field), "");
        }
        assert_eq!(*service.submitted.lock().unwrap(), vec![report]);
        assert_eq!(
            authorize(store.current().as_ref(), Role::Officer),
            Authorization::Allow
        );
    }

    #[tokio::test]
    async fn failed_submission_keeps_form() {
        let service = MockService::default().failing("ingest");
        let mut form = filled();

        let err = form.submit(&service).await.unwrap_err();
        assert!(matches!(err, SubmitError::Client(_)));
        assert_eq!(form, filled());
        assert!(service.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn incomplete_form_is_not_sent() {
        let service = MockService::default();
        let mut form = ReportForm::new();
        form.set(FormField::VillageId, "3");

        let err = form.submit(&service).await.unwrap_err();
        assert!(matches!(err, SubmitError::Form(FormError::Missing { .. })));
        assert_eq!(service.call_count("ingest"), 0);
        assert_eq!(form.get(FormField::VillageId), "3");
    }
}
