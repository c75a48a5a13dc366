#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use transliteration_gateway::domain::model::Prompt;
use transliteration_gateway::{
    create_router, AppState, LanguagePair, LlmClient, Result, ServiceError, TransliterationPipeline,
};
use zip::write::SimpleFileOptions;

pub const BOUNDARY: &str = "gateway-test-boundary";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Scripted model double. Replies are consumed in order; the last one repeats.
pub struct FakeLlm {
    replies: Mutex<Vec<std::result::Result<String, fn() -> ServiceError>>>,
    prompts: Mutex<Vec<Prompt>>,
    calls: AtomicUsize,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(vec![Ok(reply.to_string())]),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: fn() -> ServiceError) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(vec![Err(error)]),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|p| p.user.clone())
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());

        let mut replies = self.replies.lock().unwrap();
        let next = if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies[0].clone()
        };
        next.map_err(|make| make())
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

pub fn router_with(llm: Arc<dyn LlmClient>, max_upload_bytes: usize) -> Router {
    let pipeline = TransliterationPipeline::new(llm, LanguagePair::new("English", "Assamese"));
    create_router(AppState::new(pipeline), max_upload_bytes)
}

/// Serves the router on an ephemeral port and returns its base URL.
pub async fn spawn_app(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}

pub fn multipart_text(name: &str, value: &str) -> Vec<u8> {
    let mut body = Vec::new();
    write!(
        body,
        "--{b}\r\nContent-Disposition: form-data; name=\"{n}\"\r\n\r\n{v}\r\n--{b}--\r\n",
        b = BOUNDARY,
        n = name,
        v = value
    )
    .unwrap();
    body
}

pub fn multipart_file(name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    write!(
        body,
        "--{b}\r\nContent-Disposition: form-data; name=\"{n}\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n",
        b = BOUNDARY,
        n = name,
        f = file_name,
        c = content_type
    )
    .unwrap();
    body.extend_from_slice(bytes);
    write!(body, "\r\n--{}--\r\n", BOUNDARY).unwrap();
    body
}

pub async fn post_multipart(base_url: &str, path: &str, body: Vec<u8>) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{}", base_url, path))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(body)
        .send()
        .await
        .unwrap()
}

/// Minimal DOCX package: one `w:p` per paragraph.
pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer
            .write_all(b"<?xml version=\"1.0\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>")
            .unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    cursor.into_inner()
}
