use crate::utils;
use clo_provider::{Attributes, CloProvider};

pub async fn handle(
    provider: &CloProvider,
    data_source: &str,
    args: Attributes,
    show_sensitive: bool,
) -> anyhow::Result<()> {
    let schema = provider.data_source(data_source)?.schema();
    let result = provider.read_data_source(data_source, args).await?;
    utils::print_attributes(&schema, &result, show_sensitive);
    Ok(())
}
