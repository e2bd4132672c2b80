pub mod codec_config;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec_config::CodecConfig;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
