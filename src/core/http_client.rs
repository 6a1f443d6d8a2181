use std::time::Duration;

use ytogg_core::models::settings::ProxySettings;

use crate::core::error::Result;

const USER_AGENT: &str = concat!("ytogg/", env!("CARGO_PKG_VERSION"));

pub fn apply_proxy(
    builder: reqwest::ClientBuilder,
    proxy: &ProxySettings,
) -> reqwest::ClientBuilder {
    let Some(proxy_url) = proxy.url() else {
        return builder;
    };
    match reqwest::Proxy::all(&proxy_url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("Invalid proxy URL: {}", e);
            builder
        }
    }
}

pub fn build_client(timeout: Duration, proxy: &ProxySettings) -> Result<reqwest::Client> {
    let builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .timeout(timeout);
    Ok(apply_proxy(builder, proxy).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_proxy() {
        assert!(build_client(Duration::from_secs(5), &ProxySettings::default()).is_ok());
    }

    #[test]
    fn builds_with_socks_proxy() {
        let proxy = ProxySettings {
            enabled: true,
            proxy_type: "socks5".into(),
            host: "127.0.0.1".into(),
            port: 1080,
            ..Default::default()
        };
        assert!(build_client(Duration::from_secs(5), &proxy).is_ok());
    }
}
