use crate::core::ConfigProvider;
use crate::utils::error::{CheckError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A TOML job file. The original deployment ran one near-identical script
/// per registry extract; a job file captures what actually varied between
/// them (registry URL, month, output file) so one binary covers all of them.
///
/// ```toml
/// [job]
/// name = "sa-frice"
///
/// [registry]
/// url = "https://raw.githubusercontent.com/.../sa.json"
///
/// [check]
/// commodity = "FRice"
///
/// [output]
/// path = "./output"
/// file = "sa-transactions.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub job: Option<JobSection>,
    pub registry: RegistrySection,
    #[serde(default)]
    pub portal: PortalSection,
    #[serde(default)]
    pub check: CheckSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSection {
    #[serde(default = "default_portal_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSection {
    pub month: Option<String>,
    #[serde(default = "default_commodity")]
    pub commodity: String,
    #[serde(default)]
    pub commodities: Vec<String>,
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_output_file")]
    pub file: String,
}

fn default_portal_url() -> String {
    "https://aepos.ap.gov.in/Qcodesearch.jsp".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_commodity() -> String {
    "FRice".to_string()
}

fn default_concurrent_requests() -> usize {
    10
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_output_file() -> String {
    "transactions.json".to_string()
}

impl Default for PortalSection {
    fn default() -> Self {
        Self {
            url: default_portal_url(),
            timeout_seconds: default_timeout_secs(),
        }
    }
}

impl Default for CheckSection {
    fn default() -> Self {
        Self {
            month: None,
            commodity: default_commodity(),
            commodities: Vec::new(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            file: default_output_file(),
        }
    }
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| CheckError::ConfigFileError {
            message: format!("Cannot read '{}': {}", path.as_ref().display(), e),
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CheckError::ConfigFileError {
            message: format!("Invalid TOML: {}", e),
        })
    }

    pub fn job_name(&self) -> &str {
        self.job.as_ref().map(|j| j.name.as_str()).unwrap_or("check")
    }
}

impl ConfigProvider for FileConfig {
    fn registry_url(&self) -> &str {
        &self.registry.url
    }

    fn portal_url(&self) -> &str {
        &self.portal.url
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_file(&self) -> &str {
        &self.output.file
    }

    fn concurrent_requests(&self) -> usize {
        self.check.concurrent_requests
    }

    fn month(&self) -> Option<&str> {
        self.check.month.as_deref()
    }

    fn commodity(&self) -> &str {
        &self.check.commodity
    }

    fn commodities(&self) -> &[String] {
        &self.check.commodities
    }

    fn timeout_secs(&self) -> u64 {
        self.portal.timeout_seconds
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("registry.url", &self.registry.url)?;
        validation::validate_url("portal.url", &self.portal.url)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_non_empty_string("output.file", &self.output.file)?;
        validation::validate_range(
            "check.concurrent_requests",
            self.check.concurrent_requests,
            1,
            20,
        )?;
        validation::validate_range("portal.timeout_seconds", self.portal.timeout_seconds, 1, 120)?;
        validation::validate_non_empty_string("check.commodity", &self.check.commodity)?;
        if let Some(month) = &self.check.month {
            validation::validate_month("check.month", month)?;
        }
        Ok(())
    }
}
