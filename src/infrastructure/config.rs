use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub theme: ThemeSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Printer data endpoint, queried with the window as parameters.
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Pixel extent of the plot area, used to place marker lines.
#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    #[serde(default = "default_plot_left")]
    pub plot_left: f64,
    #[serde(default = "default_plot_right")]
    pub plot_right: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            plot_left: default_plot_left(),
            plot_right: default_plot_right(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ThemeSettings {
    #[serde(default)]
    pub dark: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_plot_left() -> f64 {
    50.0
}

fn default_plot_right() -> f64 {
    850.0
}

/// `config/dashboard.*` overlaid with `PRINTER_TELEMETRY__SECTION__KEY`
/// environment variables.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("PRINTER_TELEMETRY").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> anyhow::Result<AppConfig> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config = parse("[api]\nurl = \"http://printer.local/api/printer-data/\"\n").unwrap();

        assert_eq!(config.api.url, "http://printer.local/api/printer-data/");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!((config.chart.plot_left, config.chart.plot_right), (50.0, 850.0));
        assert!(!config.theme.dark);
    }

    #[test]
    fn test_overrides() {
        let config = parse(
            r#"
            [api]
            url = "http://localhost:8000/data"
            timeout_secs = 5

            [chart]
            plot_left = 10.0
            plot_right = 610.0

            [theme]
            dark = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.chart.plot_right, 610.0);
        assert!(config.theme.dark);
    }

    #[test]
    fn test_missing_api_url_is_an_error() {
        assert!(parse("[server]\nbind = \"127.0.0.1:9000\"\n").is_err());
    }
}
