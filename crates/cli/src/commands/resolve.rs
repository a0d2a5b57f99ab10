use std::sync::Arc;

use anyhow::Result;
use rosterfeed_core::domain::ResolutionMethod;
use rosterfeed_core::resolver::PhotoResolver;
use rosterfeed_core::storage::http::HttpBackend;

pub async fn run(backend: Arc<HttpBackend>, path: &str, detail: bool) -> Result<()> {
    let resolver = if detail {
        PhotoResolver::for_detail(backend)
    } else {
        PhotoResolver::for_list(backend)
    };

    let resolution = resolver.resolve(Some(path)).await;
    match resolution.method {
        ResolutionMethod::Public => {
            println!("public URL passed the probe:");
        }
        ResolutionMethod::Signed => {
            println!("probe failed, issued a signed URL:");
        }
        ResolutionMethod::None => {
            println!("no strategy produced a URL; a placeholder would be rendered");
            return Ok(());
        }
    }
    if let Some(url) = resolution.url {
        println!("  {url}");
    }
    Ok(())
}
