use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::ImagePart;
use crate::services::AIService;

/// Scripted model service: hands out queued replies in order and records every prompt
pub struct MockAIService {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    saw_image: AtomicBool,
}

impl MockAIService {
    pub fn with_replies(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            saw_image: AtomicBool::new(false),
        }
    }

    pub fn replying<const N: usize>(texts: [&str; N]) -> Self {
        Self::with_replies(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn saw_image(&self) -> bool {
        self.saw_image.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AIService for MockAIService {
    async fn generate_content(&self, prompt: &str, image: Option<&ImagePart>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if image.is_some() {
            self.saw_image.store(true, Ordering::SeqCst);
        }

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("mock has no reply queued"),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
