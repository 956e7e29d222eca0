use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::{AudioArtifact, SpeechProvider, SynthesisRequest};
use crate::error::AppError;

pub const DEFAULT_PROGRAM: &str = "gtts-cli";

/// Runs a gTTS-compatible command line tool against a scratch directory.
///
/// The tool is invoked as
/// `<program> [args..] --file <input> --lang <voice> --output <output> [--slow]`
/// and must be installed ahead of time.
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
    scratch_root: PathBuf,
}

impl CommandProvider {
    pub fn new(program: String, args: Vec<String>, scratch_root: PathBuf) -> Self {
        Self {
            program,
            args,
            scratch_root,
        }
    }

    async fn run(&self, request: &SynthesisRequest, scratch: &Path) -> Result<Vec<u8>, AppError> {
        let input_path = scratch.join("input.txt");
        let output_path = scratch.join(format!("output.{}", request.format));

        tokio::fs::write(&input_path, request.text.as_bytes()).await?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--file")
            .arg(&input_path)
            .arg("--lang")
            .arg(&request.voice)
            .arg("--output")
            .arg(&output_path)
            .kill_on_drop(true);
        if request.speed < 1.0 {
            command.arg("--slow");
        }

        let output = command.output().await.map_err(|e| {
            AppError::TtsError(format!(
                "Failed to run {} (is it installed?): {}",
                self.program, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::TtsError(format!(
                "{} failed ({}): {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        match tokio::fs::read(&output_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::TtsError(format!(
                "{} did not produce an output file",
                self.program
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SpeechProvider for CommandProvider {
    fn name(&self) -> &'static str {
        "command"
    }

    fn min_audio_bytes(&self) -> usize {
        1000
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioArtifact, AppError> {
        let scratch = tempfile::Builder::new()
            .prefix("tts-")
            .tempdir_in(&self.scratch_root)?;

        let result = self.run(request, scratch.path()).await;

        // A cancelled request still removes the directory when `scratch` drops
        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!(
                path = %scratch_path.display(),
                "Failed to remove scratch files: {}",
                e
            );
        }

        Ok(AudioArtifact {
            bytes: result?,
            format: request.format.clone(),
        })
    }
}
