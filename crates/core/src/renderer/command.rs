//! Renderer that shells out to per-template scripts and a PDF command.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::RendererConfig;

use super::error::RenderError;
use super::traits::Renderer;

/// Script-driven renderer.
///
/// Each template names a script under `scripts_dir`; the script receives
/// the resolved parameters as `name=value` arguments and writes HTML to
/// stdout. The PDF stage pipes HTML through `pdf_command` and collects
/// the PDF bytes from its stdout.
pub struct CommandRenderer {
    config: RendererConfig,
}

impl CommandRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RendererConfig::default())
    }

    fn script_path(&self, script: &str) -> PathBuf {
        self.config.scripts_dir.join(script)
    }

    async fn run_with_deadline(
        &self,
        mut child: tokio::process::Child,
        stdin_bytes: Option<&[u8]>,
        what: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let stdin = match (stdin_bytes, child.stdin.take()) {
            (Some(_), None) => return Err(RenderError::invalid_output("stdin not captured")),
            (Some(_), stdin) => stdin,
            (None, _) => None,
        };

        // The stdin write runs alongside output collection; feeding input
        // sequentially would deadlock once the child fills its stdout pipe
        // while the parent is still writing.
        let io = async {
            let write = async {
                if let (Some(mut stdin), Some(bytes)) = (stdin, stdin_bytes) {
                    stdin.write_all(bytes).await?;
                    // stdin drops here, closing the child's input
                }
                Ok::<_, std::io::Error>(())
            };
            let (written, output) = tokio::join!(write, child.wait_with_output());
            let output = output?;
            // A child that died mid-write closed the pipe; its exit status
            // and stderr are the better diagnostic than the broken pipe.
            if output.status.success() {
                written?;
            }
            Ok::<_, std::io::Error>(output)
        };

        let deadline = Duration::from_secs(self.config.script_timeout_secs);
        let output = match timeout(deadline, io).await {
            Ok(result) => result?,
            // kill_on_drop reaps the child when the future is dropped
            Err(_) => {
                return Err(RenderError::Timeout {
                    timeout_secs: self.config.script_timeout_secs,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RenderError::render_failed(
                format!("{} exited with code: {:?}", what, output.status.code()),
                if stderr.is_empty() {
                    None
                } else {
                    Some(stderr)
                },
            ));
        }

        if output.stdout.is_empty() {
            return Err(RenderError::invalid_output(format!(
                "{} produced no output",
                what
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    fn name(&self) -> &str {
        "command"
    }

    async fn render_html(
        &self,
        script: &str,
        params: &[(String, String)],
    ) -> Result<String, RenderError> {
        let path = self.script_path(script);
        if !path.exists() {
            return Err(RenderError::ScriptNotFound { path });
        }

        let args: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        let child = Command::new(&path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RenderError::ScriptNotFound { path: path.clone() }
                } else {
                    RenderError::Io(e)
                }
            })?;

        let stdout = self.run_with_deadline(child, None, "render script").await?;
        String::from_utf8(stdout)
            .map_err(|_| RenderError::invalid_output("render script emitted non-UTF-8 HTML"))
    }

    async fn generate_pdf(&self, template: &str, html: &str) -> Result<Vec<u8>, RenderError> {
        let child = Command::new(&self.config.pdf_command)
            .args(&self.config.pdf_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RenderError::PdfCommandNotFound {
                        path: self.config.pdf_command.clone(),
                    }
                } else {
                    RenderError::Io(e)
                }
            })?;

        let what = format!("PDF command for template '{}'", template);
        self.run_with_deadline(child, Some(html.as_bytes()), &what)
            .await
    }

    async fn validate(&self) -> Result<(), RenderError> {
        if !self.config.scripts_dir.is_dir() {
            return Err(RenderError::invalid_output(format!(
                "scripts directory does not exist: {}",
                self.config.scripts_dir.display()
            )));
        }

        let result = Command::new(&self.config.pdf_command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if let Err(e) = result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(RenderError::PdfCommandNotFound {
                    path: self.config.pdf_command.clone(),
                });
            }
            return Err(RenderError::Io(e));
        }

        Ok(())
    }
}
