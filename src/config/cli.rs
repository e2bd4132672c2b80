use crate::config::codec_config::CodecConfig;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "tweet-codec")]
#[command(about = "Normalize and validate tweet/user/place record dumps")]
pub struct CliConfig {
    /// JSON dump to read (array of {kind, key, record} envelopes)
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "records.json")]
    pub output_file: String,

    /// Optional TOML file with [formats], [serializer] and [deserializer] sections
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(skip)]
    pub codec: CodecConfig,
}

impl CliConfig {
    /// 若有指定 --config，載入 TOML 覆蓋預設轉換設定
    pub fn load_codec_config(&mut self) -> Result<()> {
        if let Some(path) = &self.config {
            self.codec = CodecConfig::from_file(path)?;
        }
        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn codec(&self) -> &CodecConfig {
        &self.codec
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_path("output_file", &self.output_file)?;
        self.codec.validate()
    }
}
