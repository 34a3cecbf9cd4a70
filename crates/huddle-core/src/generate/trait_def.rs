//! The `Generator` trait: the adapter interface for text generation services.
//!
//! Each concrete generator (a local CLI, an HTTP client, a canned fake in
//! tests) implements this trait. It is object-safe so callers can hold a
//! `Box<dyn Generator>` chosen at runtime from configuration.

use async_trait::async_trait;

use super::GenerateError;

/// A service that turns a system instruction and a prompt into text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable name for logs and error messages (e.g. `"claude"`).
    fn name(&self) -> &str;

    /// Produce a completion for `prompt` under the `system` instruction.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, GenerateError>;
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the prompt back, proving the trait works as `dyn Generator`.
    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, _system: &str, prompt: &str) -> Result<String, GenerateError> {
            Ok(prompt.to_owned())
        }
    }

    #[tokio::test]
    async fn generator_is_usable_as_trait_object() {
        let generator: Box<dyn Generator> = Box::new(EchoGenerator);
        assert_eq!(generator.name(), "echo");
        assert_eq!(generator.generate("sys", "hello").await.unwrap(), "hello");
    }
}
