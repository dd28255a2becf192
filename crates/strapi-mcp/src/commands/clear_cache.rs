//! Remove the cached API token.

use anyhow::Result;

use crate::config::ConnectionArgs;
use crate::output;

pub fn run(args: &ConnectionArgs) -> Result<()> {
    let cache = args.token_cache()?;

    if cache.clear()? {
        output::success("Token cache cleared");
        output::field("Path", &cache.path().display().to_string());
    } else {
        output::warning("No token cache to clear");
    }

    Ok(())
}
