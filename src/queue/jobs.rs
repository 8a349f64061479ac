use serde::de::Error as _;

/// One unit of work handed to the broker.
///
/// The wire format is the positional triple `[query, file_path, job_id]`
/// so the payload stays readable from redis-cli and independent of field
/// renames. The `job_id` doubles as the queue's task identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTask {
    pub query: String,
    pub file_path: String,
    pub job_id: String,
}

impl AnalysisTask {
    pub fn new(
        query: impl Into<String>,
        file_path: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            file_path: file_path.into(),
            job_id: job_id.into(),
        }
    }

    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&(&self.query, &self.file_path, &self.job_id))
    }

    pub fn from_wire(raw: &str) -> Result<Self, serde_json::Error> {
        let (query, file_path, job_id): (String, String, String) = serde_json::from_str(raw)?;
        if job_id.is_empty() {
            return Err(serde_json::Error::custom("task payload has an empty job_id"));
        }
        Ok(Self {
            query,
            file_path,
            job_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_the_positional_triple() {
        let task = AnalysisTask::new("Summarise my report", "data/report.pdf", "job-1");
        let raw = task.to_wire().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!(["Summarise my report", "data/report.pdf", "job-1"])
        );
    }

    #[test]
    fn from_wire_restores_all_fields() {
        let raw = r#"["What is my hemoglobin?","data/a.pdf","7f3b"]"#;
        let task = AnalysisTask::from_wire(raw).unwrap();
        assert_eq!(task.query, "What is my hemoglobin?");
        assert_eq!(task.file_path, "data/a.pdf");
        assert_eq!(task.job_id, "7f3b");
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(AnalysisTask::from_wire("not json").is_err());
        assert!(AnalysisTask::from_wire(r#"["only","two"]"#).is_err());
        assert!(AnalysisTask::from_wire(r#"["q","p",""]"#).is_err());
    }
}
