use std::time::Duration;

use reqwest::Client;

const DISABLE_SYSTEM_PROXY_ENV: &str = "OPSLENS_DISABLE_SYSTEM_PROXY";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_http_client() -> Client {
    let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() || cfg!(test) {
        builder = builder.no_proxy();
    }
    builder.build().expect("Failed to build reqwest client")
}
