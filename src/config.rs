use clap::Parser;

/// Process configuration. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "qbroker", version, about = "In-memory FIFO message broker")]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "QBROKER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "QBROKER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log filter directive, e.g. `info` or `qbroker=debug`
    #[arg(long, env = "QBROKER_LOG", default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
