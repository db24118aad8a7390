use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use shared::Threshold;
use tracing::{debug, info};

use crate::messages::{Image, MessageLoader};

/// Value of `image-url` that turns the picture off.
pub const NO_IMAGE: &str = "none";

/// Action inputs. The runner exposes them as `INPUT_<NAME>` variables.
#[derive(Deserialize)]
pub struct Inputs {
    #[serde(rename = "github-token", alias = "github_token")]
    pub github_token: String,
    #[serde(default)]
    pub threshold: Option<String>,
    #[serde(default, rename = "image-url", alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default, rename = "image-path", alias = "image_path")]
    pub image_path: Option<String>,
    #[serde(default, rename = "message-file", alias = "message_file")]
    pub message_file: Option<String>,
}

impl Inputs {
    pub fn from_env() -> anyhow::Result<Self> {
        envy::prefixed("INPUT_")
            .from_env::<Self>()
            .context("Failed to read action inputs")
    }

    pub fn threshold(&self) -> Threshold {
        parse_threshold(self.threshold.as_deref())
    }

    pub fn image(&self) -> anyhow::Result<Image> {
        if let Some(path) = non_empty(&self.image_path) {
            return Image::load_embedded(&PathBuf::from(path));
        }

        Ok(match non_empty(&self.image_url) {
            None => Image::FromTemplate,
            Some(url) if url.eq_ignore_ascii_case(NO_IMAGE) => Image::Hidden,
            Some(url) => Image::Url(url.to_string()),
        })
    }

    pub fn messages(&self) -> anyhow::Result<MessageLoader> {
        let image = self.image()?;
        match non_empty(&self.message_file) {
            Some(path) => MessageLoader::load_from_file(&PathBuf::from(path), &image),
            None => MessageLoader::load_default(&image),
        }
    }
}

/// Variables the Actions runner sets for every job.
#[derive(Deserialize, Debug, Default)]
pub struct RunnerEnv {
    pub github_event_name: Option<String>,
    pub github_event_path: Option<PathBuf>,
    pub github_repository: Option<String>,
    pub github_api_url: Option<String>,
}

impl RunnerEnv {
    pub fn from_env() -> anyhow::Result<Self> {
        envy::from_env::<Self>().context("Failed to read runner environment")
    }
}

pub fn parse_threshold(raw: Option<&str>) -> Threshold {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        debug!("No threshold provided, using {}", Threshold::DEFAULT);
        return Threshold::DEFAULT;
    };

    match raw.parse() {
        Ok(threshold) => threshold,
        Err(e) => {
            info!(
                "Invalid threshold {raw:?} ({e}), falling back to {}",
                Threshold::DEFAULT
            );
            Threshold::DEFAULT
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
