//! `lmproxy models`: print the host's model descriptors.

use anyhow::Result;
use lmproxy_core::ModelDescriptor;

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let descriptors = list(ctx).await?;
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

/// Descriptors in host order.
pub async fn list(ctx: &CliContext) -> Result<Vec<ModelDescriptor>, CliError> {
    let models = ctx
        .host
        .select_chat_models()
        .await
        .map_err(|e| CliError::Host(e.to_string()))?;
    Ok(models.iter().map(|m| m.descriptor().clone()).collect())
}
