use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) log_format: LogFormat,
    /// Warnings captured during config parsing so they can be logged after tracing is initialized.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(component: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let component = component.trim().to_string();
        let mut warnings = Vec::new();

        let service_name = lookup("SERVICE_NAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = lookup("STAGE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) if !raw.trim().is_empty() => match parse_log_format(&raw) {
                Some(format) => format,
                None => {
                    warnings.push(format!(
                        "LOG_FORMAT is invalid (value: {raw}); defaulting to text"
                    ));
                    LogFormat::Text
                }
            },
            _ => LogFormat::Text,
        };

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            log_format,
            warnings,
        }
    }
}

fn parse_log_format(input: &str) -> Option<LogFormat> {
    match input.trim().to_ascii_lowercase().as_str() {
        "text" | "pretty" | "plain" => Some(LogFormat::Text),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_name_falls_back_to_component() {
        let config = ObservabilityConfig::from_lookup(" subscription-tracker ", |_| None);

        assert_eq!(config.service_context.service_name, "subscription-tracker");
        assert_eq!(config.service_context.environment, "unknown");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn json_format_is_recognised() {
        let config = ObservabilityConfig::from_lookup("svc", |key| match key {
            "LOG_FORMAT" => Some("JSON".to_string()),
            "STAGE" => Some("production".to_string()),
            _ => None,
        });

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.service_context.environment, "production");
    }

    #[test]
    fn unknown_format_produces_a_warning() {
        let config = ObservabilityConfig::from_lookup("svc", |key| {
            (key == "LOG_FORMAT").then(|| "xml".to_string())
        });

        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.warnings.len(), 1);
    }
}
