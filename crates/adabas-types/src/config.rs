//! Codec configuration: architecture, charset, sign nibbles, LOB sizes.

use std::path::Path;

use adabas_encoding::{Charset, PackedSigns};
use serde::{Deserialize, Serialize};

use crate::dump;
use crate::platform::{Platform, ARCH_OPEN_HIGH};
use crate::value::BufferOption;
use crate::Result;

/// Top-level codec configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Architecture byte of the target nucleus.
    #[serde(default = "default_architecture")]
    pub architecture: u8,
    /// Charset alias for alpha conversion.
    #[serde(default)]
    pub charset: Option<String>,
    /// Packed sign override.
    #[serde(default)]
    pub packed_signs: Option<PackedSignConfig>,
    /// LOB transfer sizes.
    #[serde(default)]
    pub lob: LobConfig,
    /// Record buffer bytes reserved for each PE or MU field.
    #[serde(default = "default_multiple_size")]
    pub multiple_size: u32,
    /// Byte cap for debug dumps.
    #[serde(default = "default_dump_limit")]
    pub dump_limit: usize,
}

/// Packed sign nibbles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackedSignConfig {
    /// Nibble for positive values.
    pub positive: u8,
    /// Nibble for negative values.
    pub negative: u8,
}

/// LOB chunk sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobConfig {
    /// Bytes requested by the first read of a LOB.
    #[serde(default = "default_partial_read_size")]
    pub partial_read_size: u32,
    /// Bytes written per store call.
    #[serde(default = "default_store_chunk_size")]
    pub store_chunk_size: u32,
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(
        path: impl AsRef<Path>,
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Build the platform described by this configuration.
    ///
    /// # Errors
    /// Fails with code 108 if the charset alias is unknown.
    pub fn platform(&self) -> Result<Platform> {
        let mut platform = Platform::new(self.architecture);
        if let Some(signs) = self.packed_signs {
            platform = platform.with_packed_signs(PackedSigns {
                positive: signs.positive & 0x0F,
                negative: signs.negative & 0x0F,
            });
        }
        if let Some(name) = &self.charset {
            platform = platform.with_charset(Charset::by_name(name)?);
        }
        Ok(platform)
    }

    /// Buffer options seeded with the configured sizes.
    pub fn buffer_option(&self, store_call: bool) -> BufferOption {
        let mut option = BufferOption::new(store_call, 0);
        option.partial_lob_size = self.lob.partial_read_size;
        option.lob_chunk_size = self.lob.store_chunk_size;
        option.multiple_size = self.multiple_size;
        option.mainframe = Platform::new(self.architecture).is_mainframe();
        option
    }

    /// Hex dump capped at the configured limit.
    pub fn dump(&self, header: &str, data: &[u8]) -> String {
        dump::format_with_limit(header, data, self.dump_limit)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            architecture: default_architecture(),
            charset: None,
            packed_signs: None,
            lob: LobConfig::default(),
            multiple_size: default_multiple_size(),
            dump_limit: default_dump_limit(),
        }
    }
}

impl Default for LobConfig {
    fn default() -> Self {
        Self {
            partial_read_size: default_partial_read_size(),
            store_chunk_size: default_store_chunk_size(),
        }
    }
}

fn default_architecture() -> u8 {
    ARCH_OPEN_HIGH
}

fn default_partial_read_size() -> u32 {
    4096
}

fn default_store_chunk_size() -> u32 {
    40960
}

fn default_multiple_size() -> u32 {
    32768
}

fn default_dump_limit() -> usize {
    dump::MAXIMUM_FORMAT_LENGTH
}
