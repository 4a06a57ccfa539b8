use rttdump_lib::utils::Utils;
use rttdump_lib::{ByteOrder, SnapshotFormat};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default configuration values
pub struct Defaults;

impl Defaults {
    pub const ENDIANNESS: &'static str = "little";
    pub const FORMAT: &'static str = "auto";
    pub const OUTPUT_DIR: &'static str = ".";
    pub const PREFIX: &'static str = rttdump_lib::emitter::DEFAULT_PREFIX;
}

/// Address string, decimal or prefixed as accepted by `Utils::str_to_u32`, e.g. "0x20000000"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressString(pub String);

impl AddressString {
    pub fn to_u32(&self) -> Result<u32, String> {
        Utils::str_to_u32(&self.0)
            .map_err(|e| format!("Failed to parse address '{}': {}", self.0, e))
    }
}

/// Root of the JSON configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RttDumpConfig {
    pub snapshot: Option<String>,
    pub base_addr: Option<AddressString>,
    pub elf: Option<String>,
    pub symbol: Option<String>,
    #[serde(default = "default_endianness")]
    pub endianness: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub search: bool,
}

fn default_endianness() -> String {
    Defaults::ENDIANNESS.to_string()
}
fn default_format() -> String {
    Defaults::FORMAT.to_string()
}
fn default_output_dir() -> String {
    Defaults::OUTPUT_DIR.to_string()
}
fn default_prefix() -> String {
    Defaults::PREFIX.to_string()
}

impl RttDumpConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: RttDumpConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// A configuration with every default applied
    pub fn with_defaults() -> Self {
        Self {
            snapshot: None,
            base_addr: None,
            elf: None,
            symbol: None,
            endianness: Defaults::ENDIANNESS.to_string(),
            format: Defaults::FORMAT.to_string(),
            output_dir: Defaults::OUTPUT_DIR.to_string(),
            prefix: Defaults::PREFIX.to_string(),
            search: false,
        }
    }

    pub fn parse_endianness(&self) -> Result<ByteOrder, String> {
        ByteOrder::from_str(&self.endianness)
            .map_err(|_| format!("Invalid endianness: {}", self.endianness))
    }

    pub fn parse_format(&self) -> Result<SnapshotFormat, String> {
        SnapshotFormat::from_str(&self.format)
            .map_err(|_| format!("Invalid snapshot format: {}", self.format))
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), String> {
        self.parse_endianness()?;
        self.parse_format()?;

        if let Some(ref addr) = self.base_addr {
            addr.to_u32()
                .map_err(|e| format!("Invalid base_addr: {}", e))?;
        }

        if self.base_addr.is_some() && self.elf.is_some() {
            return Err("Configuration must not set both base_addr and elf".to_string());
        }

        if self.symbol.is_some() && self.elf.is_none() {
            return Err("symbol requires elf".to_string());
        }

        Ok(())
    }
}
