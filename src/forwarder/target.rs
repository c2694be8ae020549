use std::fmt;

/// Upstream services a call can be forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamTarget {
    /// read-style calls, GET without body
    Application,
    /// write-style calls, POST with the caller's JSON body
    Other,
}

impl UpstreamTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamTarget::Application => "application",
            UpstreamTarget::Other => "other",
        }
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured URL of each upstream.
#[derive(Debug, Clone)]
pub struct UpstreamEndpoints {
    pub application_url: String,
    pub other_url: String,
}

impl UpstreamEndpoints {
    pub fn url(&self, target: UpstreamTarget) -> &str {
        match target {
            UpstreamTarget::Application => &self.application_url,
            UpstreamTarget::Other => &self.other_url,
        }
    }
}
