use crate::dashboard::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "dashboardName")]
    pub dashboard_name: String,
    #[serde(rename = "period")]
    pub period: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub domain: String,
    #[serde(rename = "deliveryMode")]
    pub delivery_mode: Option<String>,
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

impl DataSource {
    pub fn domain(&self) -> DashResult<Domain> {
        parse_domain(&self.domain, self.delivery_mode.as_deref())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSources")]
    pub data_sources: Vec<DataSource>,
}

pub fn read_config(path: &str) -> DashResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {} top-level entries", js.as_object().map(|o| o.len()).unwrap_or(0));
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_configuration() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{
                "outputSettings": {
                    "dashboardName": "CPA",
                    "period": "2025/2",
                    "outputPath": "summary.json"
                },
                "dataSources": [
                    {"domain": "institutional", "provider": "xlsx",
                     "filePath": "institucional.xlsx", "worksheetName": "Respostas"},
                    {"domain": "discipline", "deliveryMode": "remote",
                     "provider": "csv", "filePath": "ead.csv"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.output_settings.period.as_deref(), Some("2025/2"));
        assert_eq!(config.data_sources.len(), 2);
        assert_eq!(
            config.data_sources[0].worksheet_name.as_deref(),
            Some("Respostas")
        );
        assert_eq!(
            config.data_sources[1].domain().unwrap(),
            Domain::Discipline(DeliveryMode::Remote)
        );
    }

    #[test]
    fn optional_settings_may_be_omitted() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{"outputSettings": {"dashboardName": "CPA"}, "dataSources": []}"#,
        )
        .unwrap();
        assert_eq!(config.output_settings.output_path, None);
        assert!(config.data_sources.is_empty());
    }

    #[test]
    fn discipline_source_without_mode_is_rejected() {
        let source = DataSource {
            domain: "discipline".to_string(),
            delivery_mode: None,
            provider: "csv".to_string(),
            file_path: "x.csv".to_string(),
            worksheet_name: None,
        };
        assert!(source.domain().is_err());
    }
}
