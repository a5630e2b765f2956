/// The algorithm a backend uses to pick an endpoint for a new connection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BalanceAlgorithm {
    #[default]
    RoundRobin,
    StaticRoundRobin,
    LeastConn,
    First,
    Source,
    Uri,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("invalid balance algorithm: {0:?}")]
pub struct InvalidBalanceAlgorithm(String);

// === impl BalanceAlgorithm ===

impl BalanceAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "roundrobin",
            Self::StaticRoundRobin => "static-rr",
            Self::LeastConn => "leastconn",
            Self::First => "first",
            Self::Source => "source",
            Self::Uri => "uri",
        }
    }
}

impl std::str::FromStr for BalanceAlgorithm {
    type Err = InvalidBalanceAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roundrobin" => Ok(Self::RoundRobin),
            "static-rr" => Ok(Self::StaticRoundRobin),
            "leastconn" => Ok(Self::LeastConn),
            "first" => Ok(Self::First),
            "source" => Ok(Self::Source),
            "uri" => Ok(Self::Uri),
            s => Err(InvalidBalanceAlgorithm(s.to_string())),
        }
    }
}

impl std::fmt::Display for BalanceAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}
