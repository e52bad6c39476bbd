use crate::config::ApiConfig;
use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;

/// One liveness request against the backend.
///
/// `Ok(true)` means the endpoint accepted the request, `Ok(false)` means it
/// answered with a non-success status, `Err` is a transport failure.
pub trait HealthProbe: Send + Sync + 'static {
    fn ping(&self) -> BoxFuture<'_, Result<bool>>;
}

/// Issues `GET <base_url><health_path>` and accepts any 2xx status.
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(cfg: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(HttpProbe {
            client: builder.build()?,
            url: cfg.health_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HealthProbe for HttpProbe {
    fn ping(&self) -> BoxFuture<'_, Result<bool>> {
        async move {
            match self.client.get(&self.url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    tracing::debug!("health probe {} -> {}", self.url, status);
                    Ok(status.is_success())
                }
                Err(e) => {
                    tracing::debug!("health probe {} failed: {}", self.url, e);
                    Err(e.into())
                }
            }
        }
        .boxed()
    }
}
