use envconfig::Envconfig;
use lazy_static::lazy_static;
use std::{collections::HashSet, str::FromStr, time::Duration};

lazy_static! {
    pub static ref ENV_VARS: EnvVars = EnvVars::from_env().unwrap();
}

#[derive(Clone, Debug)]
pub struct EnvVars {
    inner: Inner,
    log_query_timing: HashSet<String>,
}

impl EnvVars {
    pub fn from_env() -> Result<Self, envconfig::Error> {
        let inner = Inner::init_from_env()?;
        let log_query_timing = inner
            .log_query_timing
            .split(',')
            .map(ToOwned::to_owned)
            .collect();

        Ok(Self {
            inner,
            log_query_timing,
        })
    }

    /// Maximum depth of a query's selection sets.
    ///
    /// Set by the environment variable `GRAPH_GRAPHQL_MAX_DEPTH`. The
    /// default value is 255.
    pub fn graphql_max_depth(&self) -> u8 {
        self.inner.graphql_max_depth
    }

    /// How long a query may run before it is aborted. No limit by default.
    ///
    /// Set by the environment variable `GRAPH_GRAPHQL_QUERY_TIMEOUT`
    /// (expressed in seconds).
    pub fn graphql_query_timeout(&self) -> Option<Duration> {
        self.inner
            .graphql_query_timeout_in_secs
            .map(Duration::from_secs)
    }

    pub fn log_gql_timing(&self) -> bool {
        self.log_query_timing.contains("gql")
    }

    /// Log the outcome of scalar coercions at debug level.
    ///
    /// Set by the flag `GRAPH_LOG_SCALAR_COERCION`. Off by default.
    pub fn log_scalar_coercion(&self) -> bool {
        self.inner.log_scalar_coercion.0
    }
}

#[derive(Clone, Debug, Envconfig)]
struct Inner {
    #[envconfig(from = "GRAPH_GRAPHQL_MAX_DEPTH", default = "255")]
    graphql_max_depth: u8,
    #[envconfig(from = "GRAPH_GRAPHQL_QUERY_TIMEOUT")]
    graphql_query_timeout_in_secs: Option<u64>,
    #[envconfig(from = "GRAPH_LOG_QUERY_TIMING", default = "")]
    log_query_timing: String,
    #[envconfig(from = "GRAPH_LOG_SCALAR_COERCION", default = "false")]
    log_scalar_coercion: EnvVarBoolean,
}

#[derive(Copy, Clone, Debug)]
struct EnvVarBoolean(pub bool);

impl FromStr for EnvVarBoolean {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" | "1" => Ok(Self(true)),
            "false" | "0" => Ok(Self(false)),
            _ => Err("Invalid env. var. flag, expected true / false / 1 / 0".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_flags() {
        assert!(EnvVarBoolean::from_str("1").unwrap().0);
        assert!(!EnvVarBoolean::from_str("false").unwrap().0);
        assert!(EnvVarBoolean::from_str("yes").is_err());
    }
}
