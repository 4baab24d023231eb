use std::sync::Arc;

use async_trait::async_trait;
use storefront_core::notify::{ConfirmOptions, Notifier};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Dialogs on the controlling terminal. Prompts go to stderr; stdout is
/// reserved for command payloads. One reader serves every prompt so lines
/// typed ahead are kept for the next confirmation.
pub struct TerminalNotifier<R = BufReader<Stdin>> {
    auto_confirm: bool,
    input: Arc<Mutex<R>>,
}

impl<R> Clone for TerminalNotifier<R> {
    fn clone(&self) -> Self {
        Self { auto_confirm: self.auto_confirm, input: Arc::clone(&self.input) }
    }
}

impl TerminalNotifier {
    pub fn new(auto_confirm: bool) -> Self {
        Self::with_input(auto_confirm, BufReader::new(tokio::io::stdin()))
    }
}

impl<R> TerminalNotifier<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn with_input(auto_confirm: bool, input: R) -> Self {
        Self { auto_confirm, input: Arc::new(Mutex::new(input)) }
    }
}

#[async_trait]
impl<R> Notifier for TerminalNotifier<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn alert_with(&self, message: &str, options: ConfirmOptions) {
        let mut stderr = tokio::io::stderr();
        let line = format!("[{}] {message}\n", options.title.to_ascii_lowercase());
        let _ = stderr.write_all(line.as_bytes()).await;
        let _ = stderr.flush().await;
    }

    async fn confirm(&self, message: &str, options: ConfirmOptions) -> bool {
        if self.auto_confirm {
            return true;
        }

        let mut stderr = tokio::io::stderr();
        let prompt = format!(
            "[{}] {message} {} / {} [y/N]: ",
            options.title, options.ok_text, options.cancel_text
        );
        if stderr.write_all(prompt.as_bytes()).await.is_err() || stderr.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut answer).await {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
