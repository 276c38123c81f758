//! Real processing step for the upload batch: read a statement's extracted
//! text from disk and turn it into a [`StatementReport`].

use desglose_core::{FileRef, ProcessError, Processor, ProgressHandle};
use tracing::debug;

use crate::category_rules::CategoryRules;
use crate::report::{StatementReport, process_statement_text};

pub struct StatementProcessor {
    rules: CategoryRules,
}

impl StatementProcessor {
    pub fn new(rules: CategoryRules) -> Self {
        Self { rules }
    }
}

impl Default for StatementProcessor {
    fn default() -> Self {
        Self::new(CategoryRules::default())
    }
}

impl Processor for StatementProcessor {
    type Output = StatementReport;

    async fn process(
        &self,
        file: &FileRef,
        progress: ProgressHandle,
    ) -> Result<StatementReport, ProcessError> {
        let path = file
            .path
            .as_ref()
            .ok_or_else(|| ProcessError::new(format!("{}: no local path to read", file.name)))?;

        progress.report(0);
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ProcessError::new(format!("reading {}: {e}", path.display())))?;
        progress.report(25);

        if bytes.starts_with(b"%PDF") {
            return Err(ProcessError::new(format!(
                "{}: PDF text extraction is not supported; provide the extracted text",
                file.name
            )));
        }
        let text = String::from_utf8(bytes)
            .map_err(|_| ProcessError::new(format!("{}: not a UTF-8 text file", file.name)))?;
        progress.report(50);

        let report = process_statement_text(&text, &self.rules)
            .map_err(|e| ProcessError::new(format!("{}: {e:#}", file.name)))?;
        progress.report(75);

        debug!(
            upload = %progress.id(),
            file = %file.name,
            expenses = report.expenses.len(),
            projection = report.projection.len(),
            "statement parsed"
        );
        progress.report(100);
        Ok(report)
    }
}
