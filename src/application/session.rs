//! Questionnaire session: explicit, host-owned wizard state.
//!
//! The host keeps one `AssessmentSession` per clinician session and passes it
//! by reference to whatever renders the form. The risk engine never sees it;
//! each calculation takes a fresh profile and therapy selection built from
//! the session's current answers.

use serde::{Deserialize, Serialize};

use crate::domain::{PatientProfile, Therapy, TherapyError, TherapySelection};

/// Wizard pages in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    #[default]
    Profile,
    Labs,
    Therapies,
    Results,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Profile,
        WizardStep::Labs,
        WizardStep::Therapies,
        WizardStep::Results,
    ];

    /// Zero-based position in the wizard.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Labs => "Labs",
            Self::Therapies => "Therapies",
            Self::Results => "Results",
        }
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.index() + 1, self.label())
    }
}

/// One oral regimen as the form captures it: a statin selector plus two checkboxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimenForm {
    statin: Option<Therapy>,
    pub ezetimibe: bool,
    pub bempedoic_acid: bool,
}

impl RegimenForm {
    #[must_use]
    pub fn statin(&self) -> Option<Therapy> {
        self.statin
    }

    /// Select a statin, or `None` for the "None" option.
    ///
    /// # Errors
    /// Returns `TherapyError::NotAStatin` for non-statin therapies.
    pub fn set_statin(&mut self, statin: Option<Therapy>) -> Result<(), TherapyError> {
        if let Some(t) = statin.filter(|t| !t.is_statin()) {
            return Err(TherapyError::NotAStatin(t));
        }
        self.statin = statin;
        Ok(())
    }

    fn therapies(&self) -> Vec<Therapy> {
        let mut out: Vec<Therapy> = self.statin.into_iter().collect();
        if self.ezetimibe {
            out.push(Therapy::Ezetimibe10);
        }
        if self.bempedoic_acid {
            out.push(Therapy::BempedoicAcid);
        }
        out
    }
}

/// Current page plus every answer entered so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentSession {
    step: WizardStep,
    pub profile: PatientProfile,
    pub pre_admission: RegimenForm,
    pub intensified: RegimenForm,
    pub pcsk9_inhibitor: bool,
    pub inclisiran: bool,
}

impl AssessmentSession {
    /// Start a session on the first page with the form's default answers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Advance one page; stays on Results when already there.
    pub fn go_next(&mut self) -> WizardStep {
        if let Some(next) = self.step.next() {
            self.move_to(next);
        }
        self.step
    }

    /// Go back one page; stays on Profile when already there.
    pub fn go_back(&mut self) -> WizardStep {
        if let Some(prev) = self.step.prev() {
            self.move_to(prev);
        }
        self.step
    }

    /// Jump directly to a page from the progress indicator.
    pub fn go_to(&mut self, step: WizardStep) {
        if step != self.step {
            self.move_to(step);
        }
    }

    fn move_to(&mut self, step: WizardStep) {
        self.step = step;
        tracing::info!("Moved to step {}", step.index());
    }

    /// Whether the add-on agents may be offered for the current oral regimens.
    #[must_use]
    pub fn add_on_available(&self) -> bool {
        self.oral_selection()
            .add_on_eligible(self.profile.baseline_ldl)
    }

    fn oral_selection(&self) -> TherapySelection {
        TherapySelection::new(self.pre_admission.therapies(), self.intensified.therapies())
    }

    /// Therapy selection for the current answers.
    ///
    /// Add-on boxes ticked while the add-ons are unavailable are ignored,
    /// matching the disabled checkboxes on the therapies page.
    #[must_use]
    pub fn selection(&self) -> TherapySelection {
        let mut selection = self.oral_selection();
        if selection.add_on_eligible(self.profile.baseline_ldl) {
            if self.pcsk9_inhibitor {
                selection.intensified.push(Therapy::Pcsk9Inhibitor);
            }
            if self.inclisiran {
                selection.intensified.push(Therapy::Inclisiran);
            }
        } else if self.pcsk9_inhibitor || self.inclisiran {
            tracing::debug!("Add-on therapy ignored: projected LDL at or below threshold");
        }
        selection
    }

    /// Projected LDL for the current answers, shown on the therapies page.
    #[must_use]
    pub fn projected_ldl(&self) -> f64 {
        self.selection().projected_ldl(self.profile.baseline_ldl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_is_bounded() {
        let mut session = AssessmentSession::new();
        assert_eq!(session.step(), WizardStep::Profile);

        assert_eq!(session.go_back(), WizardStep::Profile);
        assert_eq!(session.go_next(), WizardStep::Labs);
        assert_eq!(session.go_next(), WizardStep::Therapies);
        assert_eq!(session.go_next(), WizardStep::Results);
        assert_eq!(session.go_next(), WizardStep::Results);
        assert_eq!(session.go_back(), WizardStep::Therapies);

        session.go_to(WizardStep::Profile);
        assert_eq!(session.step().index(), 0);
    }

    #[test]
    fn test_step_display() {
        assert_eq!(WizardStep::Labs.to_string(), "2. Labs");
        assert_eq!(WizardStep::Results.next(), None);
        assert_eq!(WizardStep::Profile.prev(), None);
    }

    #[test]
    fn test_statin_selector_rejects_non_statins() {
        let mut regimen = RegimenForm::default();
        assert!(regimen.set_statin(Some(Therapy::Rosuvastatin20)).is_ok());
        assert_eq!(
            regimen.set_statin(Some(Therapy::Ezetimibe10)),
            Err(TherapyError::NotAStatin(Therapy::Ezetimibe10))
        );
        assert_eq!(regimen.statin(), Some(Therapy::Rosuvastatin20));
        assert!(regimen.set_statin(None).is_ok());
        assert_eq!(regimen.statin(), None);
    }

    #[test]
    fn test_selection_from_form() {
        let mut session = AssessmentSession::new();
        session
            .pre_admission
            .set_statin(Some(Therapy::Atorvastatin80))
            .expect("Should set");
        session.intensified.ezetimibe = true;

        let selection = session.selection();
        assert_eq!(selection.pre_admission, vec![Therapy::Atorvastatin80]);
        assert_eq!(selection.intensified, vec![Therapy::Ezetimibe10]);
        assert_eq!(selection.prior_therapy_count(), 1);
        assert!((session.projected_ldl() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_add_on_gated_by_projected_ldl() {
        let mut session = AssessmentSession::new();
        session.profile.baseline_ldl = 5.0;
        session
            .intensified
            .set_statin(Some(Therapy::Atorvastatin80))
            .expect("Should set");
        session.pcsk9_inhibitor = true;

        // 5.0 * 0.5 = 2.5 > 1.8
        assert!(session.add_on_available());
        assert!(session
            .selection()
            .intensified
            .contains(&Therapy::Pcsk9Inhibitor));

        // 3.0 * 0.5 = 1.5
        session.profile.baseline_ldl = 3.0;
        assert!(!session.add_on_available());
        assert!(!session
            .selection()
            .intensified
            .contains(&Therapy::Pcsk9Inhibitor));
    }
}
