use thiserror::Error;

use crate::term::Term;

/// A report that could not be produced. The cause is kept as text so one
/// failed extract can be reported against every report that needed it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReportError {
    #[error("{report} report for term {term} failed: {cause}")]
    Term {
        report: String,
        term: Term,
        cause: String,
    },
    #[error("{report} report failed: {cause}")]
    Run { report: String, cause: String },
}

impl ReportError {
    pub fn for_term(report: &str, term: Term, cause: impl ToString) -> Self {
        ReportError::Term {
            report: report.to_string(),
            term,
            cause: cause.to_string(),
        }
    }

    pub fn for_run(report: &str, cause: impl ToString) -> Self {
        ReportError::Run {
            report: report.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn report(&self) -> &str {
        match self {
            ReportError::Term { report, .. } | ReportError::Run { report, .. } => report,
        }
    }

    pub fn term(&self) -> Option<Term> {
        match self {
            ReportError::Term { term, .. } => Some(*term),
            ReportError::Run { .. } => None,
        }
    }

    /// Same failure attributed to another report.
    pub fn renamed(&self, report: &str) -> Self {
        let mut error = self.clone();
        match &mut error {
            ReportError::Term { report: name, .. } | ReportError::Run { report: name, .. } => {
                *name = report.to_string();
            }
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_report_term_and_cause() {
        let term: Term = "2023F".parse().expect("valid term");
        let error = ReportError::for_term("Offers", term, "connection reset");
        assert_eq!(
            error.to_string(),
            "Offers report for term 2023F failed: connection reset"
        );
        assert_eq!(error.renamed("Holds").report(), "Holds");
        assert_eq!(error.renamed("Holds").term(), Some(term));
        assert_eq!(
            ReportError::for_run("order", "missing file").to_string(),
            "order report failed: missing file"
        );
    }
}
