//! HTTP downloads behind the [`Fetcher`] trait.
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FetchError;

/// Abstraction over fetching remote content.
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// Fetch `url` as text (installer scripts).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] if the request fails or the server
    /// answers with an error status.
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Stream the body of `url` into `out`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] if the request or the transfer fails.
    fn fetch_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError>;
}

/// Production [`Fetcher`] backed by a [`ureq::Agent`] with default timeouts.
#[derive(Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh agent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn request_error(url: &str, reason: impl std::fmt::Display) -> FetchError {
    FetchError::Request {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| request_error(url, e))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| request_error(url, e))
    }

    fn fetch_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, FetchError> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| request_error(url, e))?;
        let mut reader = response.body_mut().as_reader();
        std::io::copy(&mut reader, out)
            .map_err(|e| request_error(url, e))
    }
}

/// Path used for the temporary download next to `binary`.
#[must_use]
pub fn tmp_path(binary: &Path) -> PathBuf {
    let mut name = binary.file_name().map_or_else(
        || std::ffi::OsString::from("download"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".new");
    binary.with_file_name(name)
}

/// Download `url` to `binary`: write `<binary>.new`, rename it over
/// `binary`, and mark it executable. One attempt, no retries.
///
/// # Errors
///
/// Returns [`FetchError`] if the download fails or the file cannot be
/// written, renamed, or made executable. A partial `.new` file is removed.
pub fn install_binary(fetcher: &dyn Fetcher, url: &str, binary: &Path) -> Result<(), FetchError> {
    let tmp = tmp_path(binary);
    let result = download_and_swap(fetcher, url, &tmp, binary);
    if result.is_err() {
        std::fs::remove_file(&tmp).ok();
    }
    result
}

fn download_and_swap(
    fetcher: &dyn Fetcher,
    url: &str,
    tmp: &Path,
    binary: &Path,
) -> Result<(), FetchError> {
    use std::os::unix::fs::PermissionsExt as _;

    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| FetchError::Write { path, source }
    };

    let mut file = std::fs::File::create(tmp).map_err(write_err(tmp))?;
    fetcher.fetch_into(url, &mut file)?;
    file.flush().map_err(write_err(tmp))?;
    drop(file);
    std::fs::rename(tmp, binary).map_err(write_err(binary))?;
    std::fs::set_permissions(binary, std::fs::Permissions::from_mode(0o755))
        .map_err(write_err(binary))
}
