//! Retrieval of report tables from CodingBat

use crate::error::{Result, ScorediffError};
use crate::html;
use crate::snapshot::RawTable;
use crate::store::Series;
use reqwest::blocking::Client;
use std::time::Duration;

pub const LOGIN_URL: &str = "https://codingbat.com/login";
pub const REPORT_URL: &str = "https://codingbat.com/report";
pub const CUSTOM_REPORT_URL: &str = "https://codingbat.com/report?java=on&custom=on&homepath=&form=";

const USERNAME_FIELD: &str = "uname";
const PASSWORD_FIELD: &str = "pw";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can produce the current raw report table of a series.
pub trait ReportSource {
    fn fetch(&self, series: Series) -> Result<RawTable>;
}

/// Logged-in CodingBat session.
pub struct CodingBatClient {
    client: Client,
}

impl CodingBatClient {
    /// Create a session and log in with the teacher account.
    pub fn login(username: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("scorediff/", env!("CARGO_PKG_VERSION")))
            .build()?;

        log::debug!("Logging in to {} as {}", LOGIN_URL, username);
        let response = client
            .post(LOGIN_URL)
            .form(&[(USERNAME_FIELD, username), (PASSWORD_FIELD, password)])
            .send()?;

        if !response.status().is_success() {
            return Err(ScorediffError::fetch(format!(
                "login failed with HTTP status {}",
                response.status()
            )));
        }

        Ok(Self { client })
    }

    pub fn report_url(series: Series) -> &'static str {
        match series {
            Series::Standard => REPORT_URL,
            Series::Custom => CUSTOM_REPORT_URL,
        }
    }

    fn fetch_page(&self, url: &str) -> Result<String> {
        log::debug!("Fetching {}", url);
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScorediffError::fetch(format!("GET {} returned HTTP status {}", url, status)));
        }

        Ok(response.text()?)
    }
}

impl ReportSource for CodingBatClient {
    fn fetch(&self, series: Series) -> Result<RawTable> {
        let page = self.fetch_page(Self::report_url(series))?;
        html::extract_report_table(&page)
    }
}
