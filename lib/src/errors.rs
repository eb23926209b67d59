// Errors callers may want to downcast out of an anyhow::Error

use std::fmt;

#[derive(Debug)]
pub struct EndpointStatusError {
    pub endpoint: String,
    pub status: u16,
}

impl fmt::Display for EndpointStatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SPARQL endpoint {} answered with status {}",
            self.endpoint, self.status
        )
    }
}

impl std::error::Error for EndpointStatusError {}

#[derive(Debug)]
pub struct MalformedProblemError {
    pub id: String,
    pub missing: &'static str,
}

impl fmt::Display for MalformedProblemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Problem {} is missing its <{}> element", self.id, self.missing)
    }
}

impl std::error::Error for MalformedProblemError {}

#[derive(Debug)]
pub struct InvalidRecordError {
    pub document_id: String,
    pub reason: String,
}

impl fmt::Display for InvalidRecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Record {} cannot be converted: {}",
            self.document_id, self.reason
        )
    }
}

impl std::error::Error for InvalidRecordError {}
