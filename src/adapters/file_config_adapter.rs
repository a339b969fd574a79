//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[cache]
dir = /var/lib/trendeval/cache

[network]
offline = yes

[strategy]
benchmark = SPY
risk_free_rate = 0.02
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("cache", "dir"),
            Some("/var/lib/trendeval/cache".to_string())
        );
        assert_eq!(
            adapter.get_string("strategy", "benchmark"),
            Some("SPY".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("cache", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "dir"), None);
    }

    #[test]
    fn get_double_value_and_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("strategy", "risk_free_rate", 0.0), 0.02);
        assert_eq!(adapter.get_double("strategy", "missing", 0.05), 0.05);
    }

    #[test]
    fn get_double_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nrisk_free_rate = lots\n").unwrap();
        assert_eq!(adapter.get_double("strategy", "risk_free_rate", 0.02), 0.02);
    }

    #[test]
    fn get_bool_truthy_and_falsy_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[network]\na = true\nb = yes\nc = on\nd = 1\ne = false\nf = no\ng = off\nh = 0\n",
        )
        .unwrap();
        for key in ["a", "b", "c", "d"] {
            assert!(adapter.get_bool("network", key, false));
        }
        for key in ["e", "f", "g", "h"] {
            assert!(!adapter.get_bool("network", key, true));
        }
    }

    #[test]
    fn get_bool_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[network]\n").unwrap();
        assert!(adapter.get_bool("network", "offline", true));
        assert!(!adapter.get_bool("network", "offline", false));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert!(adapter.get_bool("network", "offline", false));
    }

    #[test]
    fn from_file_errors_for_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/trendeval.ini").is_err());
    }
}
