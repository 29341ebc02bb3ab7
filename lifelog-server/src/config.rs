use std::{
    env,
    fmt::Display,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
};

use tracing::{info, warn};

/// Runtime settings of the HTTP service, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    /// Origin allowed to make credentialed cross-origin requests
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            cors_origin: "http://localhost:5173".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let default = Self::default();

        Self {
            address: try_load("LIFELOG_ADDRESS", default.address),
            port: try_load("LIFELOG_PORT", default.port),
            cors_origin: try_load("LIFELOG_CORS_ORIGIN", default.cors_origin),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(value) = env::var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    value.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value `{value}`: {e}, using default: {default}");
        default
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_variable_uses_default() {
        assert_eq!(try_load("LIFELOG_TEST_UNSET_VARIABLE", 8080u16), 8080);
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            port: 4000,
            ..Config::default()
        };

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:4000");
    }
}
