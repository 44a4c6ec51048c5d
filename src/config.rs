use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html` and any other static assets.
    pub static_dir: String,
    /// Request body cap for uploads. `None` leaves bodies unbounded.
    pub upload_limit_bytes: Option<usize>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let upload_limit_bytes = match var("UPLOAD_LIMIT_BYTES") {
            Some(raw) => Some(
                raw.parse::<usize>()
                    .context("UPLOAD_LIMIT_BYTES must be a positive integer")?,
            ),
            None => None,
        };

        Ok(Self {
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://inventory.db".to_string()),
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            static_dir: var("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
            upload_limit_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database_url, "sqlite://inventory.db");
        assert_eq!(config.static_dir, "public");
        assert_eq!(config.upload_limit_bytes, None);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("UPLOAD_LIMIT_BYTES", "1048576"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.upload_limit_bytes, Some(1_048_576));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
