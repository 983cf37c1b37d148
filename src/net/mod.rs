//! Outbound HTTP helpers shared by the chain gateway and the quote client.
//!
//! # Data Flow
//! ```text
//! configured base URL ("https://host/api")
//!     → normalize_base_url ("https://host/api/")
//!     → Url::join("quote/exact-output") keeps the "/api" prefix
//! ```

use url::Url;

/// Parse a base URL and make sure relative joins append to its path.
pub fn normalize_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
