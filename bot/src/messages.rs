use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::Context;
use base64::Engine;
use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};
use shared::{DiffTotals, MARKER};
use tracing::error;

const DEFAULT_MESSAGES: &str = include_str!("../../Messages.toml");

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Messages {
    message: String,
    variables: HashSet<String>,
}

impl Messages {
    pub fn format(&self, values: HashMap<&'static str, String>) -> anyhow::Result<String> {
        let mut formatted_message = self.message.clone();
        for key in self.variables.iter() {
            if let Some(value) = values.get(key.as_str()) {
                formatted_message = formatted_message.replace(&format!("{{{}}}", key), value);
            } else {
                error!(
                    "The message expects a variable: {}, but it wasn't provided",
                    key
                );
            }
        }
        Ok(formatted_message)
    }

    fn partial_format(&mut self, values: &HashMap<&'static str, String>) {
        for (key, value) in values {
            self.message = self.message.replace(&format!("{{{key}}}"), value);
            self.variables.remove(key.to_owned());
        }
    }
}

/// Picture shown next to the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Image {
    /// Use `image_url` from the message file.
    #[default]
    FromTemplate,
    Url(String),
    /// Inlined as a base64 `data:` URI.
    Embedded { mime: &'static str, bytes: Vec<u8> },
    Hidden,
}

impl Image {
    pub fn load_embedded(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read image file {}", path.display()))?;
        Ok(Self::Embedded {
            mime: mime_from_extension(path),
            bytes,
        })
    }

    fn src(&self, template_url: &str) -> Option<String> {
        match self {
            Image::FromTemplate if template_url.is_empty() => None,
            Image::FromTemplate => Some(template_url.to_string()),
            Image::Url(url) => Some(url.clone()),
            Image::Embedded { mime, bytes } => Some(format!(
                "data:{mime};base64,{}",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            )),
            Image::Hidden => None,
        }
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageLoader {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_alt: String,

    pub image_cell: Messages,
    pub big_diff_messages: Messages,
}

impl MessageLoader {
    pub fn load_default(image: &Image) -> anyhow::Result<Self> {
        Self::from_toml(DEFAULT_MESSAGES, image).context("Failed to parse built-in messages")
    }

    pub fn load_from_file(file_path: &Path, image: &Image) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read message file {}", file_path.display()))?;
        Self::from_toml(&file_content, image)
            .with_context(|| format!("Failed to parse message file {}", file_path.display()))
    }

    fn from_toml(content: &str, image: &Image) -> anyhow::Result<Self> {
        let mut result: Self = toml::from_str(content)?;
        result.postprocess_messages_with_image(image)?;
        tracing::trace!("Loaded messages: {:#?}", result);
        Ok(result)
    }

    fn postprocess_messages_with_image(&mut self, image: &Image) -> anyhow::Result<()> {
        let image_cell = match image.src(&self.image_url) {
            Some(image_src) => self.image_cell.format(
                [
                    ("image_src", image_src),
                    ("image_alt", self.image_alt.clone()),
                ]
                .into_iter()
                .collect(),
            )?,
            None => String::new(),
        };

        let values = vec![("image_cell", image_cell)]
            .into_iter()
            .collect::<HashMap<_, _>>();
        self.big_diff_messages.partial_format(&values);
        Ok(())
    }

    /// Full comment body. The marker always comes first so the next run can find it.
    pub fn big_diff_message(&self, totals: &DiffTotals) -> anyhow::Result<String> {
        let text = self.big_diff_messages.format(
            [
                ("additions", totals.additions.to_formatted_string(&Locale::en)),
                ("deletions", totals.deletions.to_formatted_string(&Locale::en)),
            ]
            .into_iter()
            .collect(),
        )?;
        Ok(format!("{MARKER}\n{text}"))
    }
}
