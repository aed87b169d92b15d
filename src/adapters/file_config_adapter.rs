//! INI file configuration adapter.

use crate::domain::error::TurtleError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TurtleError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| TurtleError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TurtleError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TurtleError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse<T>(&self, section: &str, key: &str, kind: &str) -> Result<Option<T>, TurtleError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.get_string(section, key) else {
            return Ok(None);
        };
        raw.parse().map(Some).map_err(|e| {
            TurtleError::invalid(key, format!("[{section}] {key} = '{raw}' is not {kind}: {e}"))
        })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TurtleError> {
        self.parse(section, key, "an integer")
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TurtleError> {
        self.parse(section, key, "a number")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn rejected_key(result: Result<impl std::fmt::Debug, TurtleError>) -> String {
        match result {
            Err(TurtleError::InvalidConfiguration { key, .. }) => key,
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[strategy]
donchian_period = 20
atr_distance = 2.0

[broker]
fill_policy = next_open

[data]
fromdate = 2000-01-01
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_int("strategy", "donchian_period").unwrap(), Some(20));
        assert_eq!(adapter.get_double("strategy", "atr_distance").unwrap(), Some(2.0));
        assert_eq!(
            adapter.get_string("broker", "fill_policy"),
            Some("next_open".to_string())
        );
        assert_eq!(
            adapter.get_string("data", "fromdate"),
            Some("2000-01-01".to_string())
        );
    }

    #[test]
    fn missing_or_blank_keys_are_absent() {
        let adapter =
            FileConfigAdapter::from_string("[broker]\nstarting_cash =\nfill_policy =\n").unwrap();
        assert_eq!(adapter.get_string("broker", "missing"), None);
        assert_eq!(adapter.get_string("broker", "fill_policy"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_double("broker", "starting_cash").unwrap(), None);
        assert_eq!(adapter.get_int("strategy", "atr_period").unwrap(), None);
    }

    #[test]
    fn get_int_rejects_non_integer() {
        let adapter = FileConfigAdapter::from_string(
            "[strategy]\natr_period = abc\nslow_ema_period = 35O\ndonchian_period = 2.5\n",
        )
        .unwrap();
        assert_eq!(rejected_key(adapter.get_int("strategy", "atr_period")), "atr_period");
        assert_eq!(
            rejected_key(adapter.get_int("strategy", "slow_ema_period")),
            "slow_ema_period"
        );
        assert_eq!(
            rejected_key(adapter.get_int("strategy", "donchian_period")),
            "donchian_period"
        );
    }

    #[test]
    fn get_double_rejects_non_number() {
        let adapter = FileConfigAdapter::from_string(
            "[broker]\nsizer_perc = lots\nstarting_cash = 1e5x\ncommission_rate = 2,5\n",
        )
        .unwrap();
        assert_eq!(rejected_key(adapter.get_double("broker", "sizer_perc")), "sizer_perc");
        assert_eq!(rejected_key(adapter.get_double("broker", "starting_cash")), "starting_cash");
        assert_eq!(
            rejected_key(adapter.get_double("broker", "commission_rate")),
            "commission_rate"
        );
    }

    #[test]
    fn error_message_names_section_and_value() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nslow_ema_period = 35O\n").unwrap();
        let msg = adapter
            .get_int("strategy", "slow_ema_period")
            .unwrap_err()
            .to_string();
        assert!(msg.contains("[strategy]"), "{msg}");
        assert!(msg.contains("35O"), "{msg}");
    }

    #[test]
    fn get_double_accepts_integers_and_exponents() {
        let adapter =
            FileConfigAdapter::from_string("[broker]\nstarting_cash = 500000\nmargin = 5e3\n")
                .unwrap();
        assert_eq!(adapter.get_double("broker", "starting_cash").unwrap(), Some(500_000.0));
        assert_eq!(adapter.get_double("broker", "margin").unwrap(), Some(5000.0));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[broker]\nmargin_per_unit = 5000\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_double("broker", "margin_per_unit").unwrap(), Some(5000.0));
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/turtle.ini");
        assert!(matches!(result, Err(TurtleError::ConfigParse { .. })));
    }
}
