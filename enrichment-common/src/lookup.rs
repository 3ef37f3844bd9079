use crate::lead::Lead;

const DEFAULT_COMPANY_WEBSITE: &str = "example.com";
const DEFAULT_JOB_TITLE: &str = "Unknown";

/// Normalized input to a phone-lookup provider, derived from a `Lead`.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupParams {
    pub full_name: String,
    pub company_website: String,
    pub job_title: String,
}

impl LookupParams {
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            full_name: lead.full_name(),
            company_website: lead
                .company_name
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPANY_WEBSITE.to_string()),
            job_title: lead
                .job_title
                .clone()
                .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string()),
        }
    }
}
