use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct ExchangeEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ExchangeEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting record exchange...");

        tracing::info!("📥 Extracting envelopes...");
        let envelopes = self.pipeline.extract().await?;
        tracing::info!("Extracted {} envelopes", envelopes.len());

        tracing::info!("🔄 Converting records...");
        let result = self.pipeline.transform(envelopes).await?;
        tracing::info!(
            "Converted {} records ({} places, {} users, {} tweets)",
            result.total(),
            result.places,
            result.users,
            result.tweets
        );

        tracing::info!("💾 Writing normalized dump...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
