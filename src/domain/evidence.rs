//! Outcome-trial citations used to annotate recommended therapies.

use serde::Serialize;

use super::Therapy;

/// Landmark trial backing a therapy recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub trial: &'static str,
    pub url: &'static str,
}

/// Read-only therapy → trial mapping, one entry per catalogued therapy in
/// [`Therapy::ALL`] order.
pub static EVIDENCE_TABLE: [(Therapy, Evidence); 8] = [
    (
        Therapy::Atorvastatin80,
        Evidence {
            trial: "CTT meta-analysis",
            url: "https://pubmed.ncbi.nlm.nih.gov/20167315/",
        },
    ),
    (
        Therapy::Rosuvastatin20,
        Evidence {
            trial: "CTT meta-analysis",
            url: "https://pubmed.ncbi.nlm.nih.gov/20167315/",
        },
    ),
    (
        Therapy::Ezetimibe10,
        Evidence {
            trial: "IMPROVE-IT",
            url: "https://pubmed.ncbi.nlm.nih.gov/26405142/",
        },
    ),
    (
        Therapy::BempedoicAcid,
        Evidence {
            trial: "CLEAR Outcomes",
            url: "https://pubmed.ncbi.nlm.nih.gov/35338941/",
        },
    ),
    (
        Therapy::Pcsk9Inhibitor,
        Evidence {
            trial: "FOURIER",
            url: "https://pubmed.ncbi.nlm.nih.gov/28436927/",
        },
    ),
    (
        Therapy::Inclisiran,
        Evidence {
            trial: "ORION-10",
            url: "https://pubmed.ncbi.nlm.nih.gov/32302303/",
        },
    ),
    (
        Therapy::IcosapentEthyl,
        Evidence {
            trial: "REDUCE-IT",
            url: "https://pubmed.ncbi.nlm.nih.gov/31141850/",
        },
    ),
    (
        Therapy::Semaglutide,
        Evidence {
            trial: "STEP",
            url: "https://pubmed.ncbi.nlm.nih.gov/34499685/",
        },
    ),
];

/// Look up the citation for a therapy.
#[must_use]
pub fn evidence_for(therapy: Therapy) -> &'static Evidence {
    &EVIDENCE_TABLE[therapy as usize].1
}

/// Look up the citation for a display identifier such as `"Inclisiran"`.
#[must_use]
pub fn evidence_for_identifier(id: &str) -> Option<&'static Evidence> {
    id.parse::<Therapy>().ok().map(evidence_for)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_follows_catalogue_order() {
        for (therapy, (entry, _)) in Therapy::ALL.into_iter().zip(EVIDENCE_TABLE.iter()) {
            assert_eq!(therapy, *entry);
        }
        assert_eq!(evidence_for(Therapy::Pcsk9Inhibitor).trial, "FOURIER");
        assert_eq!(evidence_for(Therapy::Semaglutide).trial, "STEP");
    }

    #[test]
    fn test_lookup_by_identifier() {
        let evidence = evidence_for_identifier("Ezetimibe 10 mg").expect("Should exist");
        assert_eq!(evidence.trial, "IMPROVE-IT");
        assert!(evidence_for_identifier("None").is_none());
    }

    #[test]
    fn test_statins_share_ctt() {
        assert_eq!(
            evidence_for(Therapy::Atorvastatin80),
            evidence_for(Therapy::Rosuvastatin20)
        );
    }
}
