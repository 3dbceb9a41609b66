use axum::body::Bytes;
use std::path::Path;
use tracing::{info, warn};

/// Built-in block page served when no custom page is configured or it cannot be read.
pub const FALLBACK_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Site Blocked</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            color: white;
        }
        .container {
            text-align: center;
            animation: fadeIn 0.5s;
        }
        h1 { font-size: 3em; margin: 0; animation: bounce 1s; }
        p { font-size: 1.5em; }
        @keyframes fadeIn {
            from { opacity: 0; }
            to { opacity: 1; }
        }
        @keyframes bounce {
            0%, 100% { transform: translateY(0); }
            50% { transform: translateY(-20px); }
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>🚫 Site Blocked</h1>
        <p>This website is blocked. Stay focused on your work!</p>
    </div>
</body>
</html>"#;

/// The HTML document returned for every request. Loaded once, never mutated.
#[derive(Debug, Clone)]
pub struct BlockPage {
    body: Bytes,
}

impl BlockPage {
    pub fn fallback() -> Self {
        Self {
            body: Bytes::from_static(FALLBACK_PAGE.as_bytes()),
        }
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            body: Bytes::from(html.into()),
        }
    }

    /// Reads the page at `path`, or falls back to the built-in page when no path
    /// is given or the file cannot be read.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::fallback();
        };

        match std::fs::read_to_string(path) {
            Ok(html) => {
                info!(path = %path.display(), bytes = html.len(), "Loaded block page");
                Self::from_html(html)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Block page unreadable, using built-in page");
                Self::fallback()
            }
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl Default for BlockPage {
    fn default() -> Self {
        Self::fallback()
    }
}
