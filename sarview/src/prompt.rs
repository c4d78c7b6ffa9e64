//! Text descriptions of the selected imagery parameters.

use std::sync::Arc;

use crate::client::TextGenerator;
use crate::criteria::{Mode, Polarization};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Result of a description request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    /// Text returned by the model, unmodified.
    Generated(String),
    /// User-facing failure message.
    Failed(String),
}

impl Description {
    /// The string shown to the user in either case.
    pub fn text(&self) -> &str {
        match self {
            Description::Generated(text) | Description::Failed(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Description::Generated(text) | Description::Failed(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Description::Generated(_))
    }
}

/// Formats the description prompt and submits it to a [`TextGenerator`].
pub struct PromptBuilder {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl PromptBuilder {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Model name passed to the generator.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The prompt sent for a mode/polarization pair.
    pub fn prompt(&self, mode: Mode, polarization: Polarization) -> String {
        format!(
            "Describe a Sentinel-1 SAR image acquired in {} mode with {} polarization. \
             Explain what this acquisition mode and polarization reveal about the surface \
             and what features a viewer should look for.",
            mode, polarization
        )
    }

    /// Ask the model to describe imagery with these parameters.
    ///
    /// A generator error is logged with its upstream detail and turned into
    /// [`Description::Failed`], whose message embeds the error's display text
    /// but never the upstream response body.
    pub fn describe(&self, mode: Mode, polarization: Polarization) -> Description {
        let prompt = self.prompt(mode, polarization);

        match self.generator.generate(&self.model, &prompt) {
            Ok(text) => {
                tracing::info!(
                    mode = %mode,
                    polarization = %polarization,
                    model = %self.model,
                    chars = text.len(),
                    "Description generated"
                );
                Description::Generated(text)
            }
            Err(e) => {
                tracing::error!(
                    mode = %mode,
                    polarization = %polarization,
                    model = %self.model,
                    error = %e,
                    detail = e.detail(),
                    source = ?std::error::Error::source(&e),
                    "Description generation failed"
                );
                Description::Failed(format!("Unable to generate a description: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SarviewError};
    use std::sync::Mutex;

    struct FakeGenerator {
        reply: std::result::Result<&'static str, u16>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeGenerator {
        fn new(reply: std::result::Result<&'static str, u16>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl TextGenerator for FakeGenerator {
        fn generate(&self, model: &str, prompt: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(SarviewError::Status {
                    service: "text-generation service",
                    status,
                    detail: "quota exhausted for project 1234".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_prompt_contains_parameters() {
        let builder = PromptBuilder::new(FakeGenerator::new(Ok("")), DEFAULT_MODEL);
        let prompt = builder.prompt(Mode::Ew, Polarization::Hv);
        assert!(prompt.contains("EW mode"));
        assert!(prompt.contains("HV polarization"));
        assert!(prompt.starts_with("Describe a Sentinel-1 SAR image"));
    }

    #[test]
    fn test_describe_returns_text_verbatim() {
        let fake = FakeGenerator::new(Ok("A SAR image of the Mississippi delta.\n"));
        let builder = PromptBuilder::new(fake.clone(), "test-model");

        let description = builder.describe(Mode::Iw, Polarization::Vv);
        assert_eq!(
            description,
            Description::Generated("A SAR image of the Mississippi delta.\n".to_string())
        );
        assert!(description.is_generated());

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "test-model");
        assert_eq!(calls[0].1, builder.prompt(Mode::Iw, Polarization::Vv));
    }

    #[test]
    fn test_describe_failure_contains_error_message() {
        let builder = PromptBuilder::new(FakeGenerator::new(Err(429)), DEFAULT_MODEL);

        let description = builder.describe(Mode::Iw, Polarization::Vv);
        assert!(!description.is_generated());

        let expected = SarviewError::Status {
            service: "text-generation service",
            status: 429,
            detail: String::new(),
        }
        .to_string();
        assert!(description.text().contains(&expected));
        // Upstream detail stays in the logs.
        assert!(!description.text().contains("quota exhausted"));
    }

    #[test]
    fn test_into_text() {
        assert_eq!(Description::Failed("x".to_string()).into_text(), "x");
        assert_eq!(Description::Generated("y".to_string()).text(), "y");
    }
}
