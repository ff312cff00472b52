use provider_service::config::{DefaultProvidersConfig, ProviderServiceConfig};
use provider_service::models::PolicyDescriptor;
use provider_service::startup::Application;
use service_core::config::Config as CoreConfig;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn with an SMS default of `default` and no policies.
    #[allow(dead_code)]
    pub async fn spawn() -> Self {
        Self::spawn_with(
            vec![],
            DefaultProvidersConfig {
                sms: Some("default".to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn spawn_with(
        policies: Vec<PolicyDescriptor>,
        default_providers: DefaultProvidersConfig,
    ) -> Self {
        // Use random port for testing (port 0)
        let config = ProviderServiceConfig {
            common: CoreConfig {
                port: 0,
                ..Default::default()
            },
            default_providers,
            policies,
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, client }
    }

    pub async fn resolve(&self, body: serde_json::Value) -> reqwest::Response {
        self.resolve_from(body, None).await
    }

    pub async fn resolve_from(
        &self,
        body: serde_json::Value,
        forwarded_for: Option<&str>,
    ) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}/providers/resolve", self.address))
            .json(&body);
        if let Some(client) = forwarded_for {
            request = request.header("x-forwarded-for", client);
        }
        request.send().await.expect("Failed to execute request")
    }
}
