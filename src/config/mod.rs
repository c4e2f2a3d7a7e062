pub mod file;
pub mod storage;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "ration-check"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Checks a benefits registry against the ration portal for commodity distribution")
)]
pub struct CliConfig {
    /// URL of the registry JSON list (array of CARDNO entries)
    #[cfg_attr(
        feature = "cli",
        arg(
            long,
            default_value = "https://raw.githubusercontent.com/pothabattulavinod/rcklv/refs/heads/main/sa.json"
        )
    )]
    pub registry_url: String,

    /// Portal search endpoint; queried as <url>?rcno=<CARDNO>
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = "https://aepos.ap.gov.in/Qcodesearch.jsp")
    )]
    pub portal_url: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "transactions.json"))]
    pub output_file: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "10"))]
    pub concurrent_requests: usize,

    /// Month to match against transaction tables (defaults to the current month)
    #[cfg_attr(feature = "cli", arg(long))]
    pub month: Option<String>,

    /// Commodity whose distribution decides the transaction status
    #[cfg_attr(feature = "cli", arg(long, default_value = "FRice"))]
    pub commodity: String,

    /// Extra commodities to report presence for, comma-separated
    #[cfg_attr(feature = "cli", arg(long, value_delimiter = ','))]
    pub commodities: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "10"))]
    pub timeout_secs: u64,

    /// Load settings from a TOML job file instead of the flags above
    #[cfg_attr(feature = "cli", arg(long))]
    pub config: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log process memory stats"))]
    pub monitor: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn registry_url(&self) -> &str {
        &self.registry_url
    }

    fn portal_url(&self) -> &str {
        &self.portal_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    fn commodity(&self) -> &str {
        &self.commodity
    }

    fn commodities(&self) -> &[String] {
        &self.commodities
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("registry_url", &self.registry_url)?;
        validation::validate_url("portal_url", &self.portal_url)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("output_file", &self.output_file)?;
        validation::validate_range("concurrent_requests", self.concurrent_requests, 1, 20)?;
        validation::validate_range("timeout_secs", self.timeout_secs, 1, 120)?;
        validation::validate_non_empty_string("commodity", &self.commodity)?;
        if let Some(month) = &self.month {
            validation::validate_month("month", month)?;
        }
        Ok(())
    }
}
