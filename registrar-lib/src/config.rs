use std::time::Duration;

use crate::course::CodeFormat;

pub const OPEN_DATA_URL: &str = "https://3scale-public-prod-open-data.apps.k8s.upenn.edu/api/v1/";
pub const TOKEN_URL: &str =
    "https://sso.apps.k8s.upenn.edu/auth/realms/master/protocol/openid-connect/token";

const USER_AGENT: &str = "registrar";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by the fetcher and the query builders.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto. Must end with `/`.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Format used when course codes are parsed on behalf of the caller.
    pub code_format: CodeFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: OPEN_DATA_URL.to_owned(),
            timeout: TIMEOUT,
            user_agent: USER_AGENT.to_owned(),
            code_format: CodeFormat::default(),
        }
    }
}

impl ClientConfig {
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
