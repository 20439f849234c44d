//! Marketer
//!
//! Personalized coupon copy for a targeted customer. This sits outside the uplift
//! core: it never fails, and every problem is reported as text in the returned copy.
use crate::dataset::CustomerRecord;
use crate::errors::UpliftError;
use log::warn;

/// Returned when no completion client is configured.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Please enter a valid API key to generate personalized emails.";

/// Prefix of the copy returned when the completion service fails.
pub const SERVICE_ERROR_PREFIX: &str = "Error connecting to the copywriting service: ";

/// The part of a customer record the copywriter sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerProfile {
    pub age: u32,
    pub amount: f64,
    pub recency: u32,
}

impl From<&CustomerRecord> for CustomerProfile {
    fn from(record: &CustomerRecord) -> Self {
        CustomerProfile {
            age: record.age,
            amount: record.amount,
            recency: record.recency,
        }
    }
}

impl CustomerProfile {
    pub fn prompt(&self) -> String {
        format!(
            "Act as a senior marketing copywriter. Write a 1-sentence subject line and a 3-sentence email body.\n\
             \n\
             Target Customer Profile:\n\
             - Age: {}\n\
             - Spending Habit: ${} avg spend\n\
             - Status: Hasn't visited in {} days.\n\
             \n\
             Goal: Persuade them to buy using a 'Secret 20% Off' coupon.\n\
             Tone: Exclusive and warm.",
            self.age,
            self.amount.trunc() as i64,
            self.recency,
        )
    }
}

/// A text completion backend.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, UpliftError>;
}

/// Writes coupon emails through an optional completion client.
pub struct EmailAgent {
    client: Option<Box<dyn CompletionClient>>,
}

impl EmailAgent {
    /// Build an agent from an optional API key.
    ///
    /// A missing or blank key, a client that cannot be constructed, or a build without
    /// the `remote` feature all leave the agent without a client.
    pub fn from_credential(api_key: Option<&str>) -> Self {
        let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
        #[cfg(feature = "remote")]
        {
            let client = api_key.and_then(|key| match remote::GroqClient::new(key) {
                Ok(c) => Some(Box::new(c) as Box<dyn CompletionClient>),
                Err(e) => {
                    warn!("Unable to create completion client: {e}");
                    None
                }
            });
            EmailAgent { client }
        }
        #[cfg(not(feature = "remote"))]
        {
            if api_key.is_some() {
                warn!("Ignoring API key, built without the `remote` feature.");
            }
            EmailAgent { client: None }
        }
    }

    pub fn with_client<C: CompletionClient + 'static>(client: C) -> Self {
        EmailAgent {
            client: Some(Box::new(client)),
        }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Subject line and body for one customer.
    pub fn write_email(&self, profile: &CustomerProfile) -> String {
        let Some(client) = &self.client else {
            return MISSING_CREDENTIAL_MESSAGE.to_string();
        };
        match client.complete(&profile.prompt()) {
            Ok(text) => text,
            Err(e) => {
                warn!("Completion request failed: {e}");
                format!("{SERVICE_ERROR_PREFIX}{e}")
            }
        }
    }
}

#[cfg(feature = "remote")]
pub mod remote {
    //! Hosted chat completions over HTTPS.
    use super::CompletionClient;
    use crate::errors::UpliftError;
    use std::time::Duration;

    pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
    pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

    pub struct GroqClient {
        http: reqwest::blocking::Client,
        api_key: String,
        base_url: String,
        model: String,
    }

    impl GroqClient {
        pub fn new(api_key: &str) -> Result<Self, UpliftError> {
            let http = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(|e| UpliftError::ExternalService(e.to_string()))?;
            Ok(GroqClient {
                http,
                api_key: api_key.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
            })
        }

        pub fn with_model(mut self, model: &str) -> Self {
            self.model = model.to_string();
            self
        }

        pub fn with_base_url(mut self, base_url: &str) -> Self {
            self.base_url = base_url.trim_end_matches('/').to_string();
            self
        }
    }

    impl CompletionClient for GroqClient {
        fn complete(&self, prompt: &str) -> Result<String, UpliftError> {
            let body = serde_json::json!({
                "model": &self.model,
                "messages": [{"role": "user", "content": prompt}],
            });
            let response = self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .map_err(|e| UpliftError::ExternalService(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().unwrap_or_default();
                return Err(UpliftError::ExternalService(format!("status {}: {}", status.as_u16(), message)));
            }

            let json: serde_json::Value = response
                .json()
                .map_err(|e| UpliftError::ExternalService(e.to_string()))?;
            json["choices"][0]["message"]["content"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| UpliftError::ExternalService("response has no message content".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        prompts: Mutex<Vec<String>>,
    }

    impl CompletionClient for &'static Recorder {
        fn complete(&self, prompt: &str) -> Result<String, UpliftError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("Subject: A secret for you".to_string())
        }
    }

    struct Unreachable;

    impl CompletionClient for Unreachable {
        fn complete(&self, _prompt: &str) -> Result<String, UpliftError> {
            Err(UpliftError::ExternalService("connection refused".to_string()))
        }
    }

    fn profile() -> CustomerProfile {
        let record = CustomerRecord::new(42, 3, 87.9, 27, 31000.0, false, false);
        CustomerProfile::from(&record)
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = profile().prompt();
        assert!(prompt.contains("- Age: 27\n"));
        assert!(prompt.contains("$87 avg spend"));
        assert!(prompt.contains("Hasn't visited in 42 days."));
    }

    #[test]
    fn test_missing_credential_placeholder() {
        for key in [None, Some(""), Some("   ")] {
            let agent = EmailAgent::from_credential(key);
            assert!(!agent.has_client());
            assert_eq!(agent.write_email(&profile()), MISSING_CREDENTIAL_MESSAGE);
        }
    }

    #[test]
    fn test_completion_is_returned() {
        let recorder: &'static Recorder = Box::leak(Box::new(Recorder {
            prompts: Mutex::new(Vec::new()),
        }));
        let agent = EmailAgent::with_client(recorder);
        assert_eq!(agent.write_email(&profile()), "Subject: A secret for you");
        assert_eq!(recorder.prompts.lock().unwrap().as_slice(), &[profile().prompt()]);
    }

    #[test]
    fn test_service_failure_is_in_band() {
        let agent = EmailAgent::with_client(Unreachable);
        let copy = agent.write_email(&profile());
        assert!(copy.starts_with(SERVICE_ERROR_PREFIX));
        assert!(copy.contains("connection refused"));
    }
}
