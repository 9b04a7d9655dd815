//! Command-backed implementations of the external collaborator traits.
//!
//! The platform client, the DM client, and the caption generator are all
//! reached through user-configured external commands (`[commands]` in
//! `picflow.toml`), argv form, with the operation's arguments appended:
//!
//! ```text
//! upload  <argv...> <file> <caption>    stdout line 1 = post id or URL
//! notify  <argv...> <recipient> <message>
//! caption <argv...> <prompt>            stdout = caption text
//! ```
//!
//! A non-zero exit is the failure signal; stderr becomes the error message.
//! Spawn failures (program missing) surface the same way; callers already
//! treat every external-call failure as "caught, logged, try again later".
//!
//! [`StemCaptioner`] is the zero-dependency default when no caption command
//! is configured: the caption is the filename stem read as words.

use crate::caption::{CaptionError, CaptionRequest, CaptionSource};
use crate::notify::{Notifier, NotifyError};
use crate::publish::{PostId, UploadClient, UploadError};
use std::path::Path;
use std::process::{Command, Output};

fn run(argv: &[String], extra: &[&str]) -> std::io::Result<Output> {
    Command::new(&argv[0]).args(&argv[1..]).args(extra).output()
}

fn stderr_line(output: &Output) -> String {
    let text = String::from_utf8_lossy(&output.stderr);
    let line = text.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        format!("exit status {}", output.status)
    } else {
        line.to_string()
    }
}

fn stdout_trimmed(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Upload client that shells out to the configured command.
///
/// The command prints the new post's id (or URL) on stdout; the last
/// successful value doubles as [`UploadClient::latest_post_url`] for the DM
/// message.
pub struct CommandUploader {
    argv: Vec<String>,
    last_post: Option<String>,
}

impl CommandUploader {
    /// `None` when no upload command is configured.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv: argv.to_vec(),
            last_post: None,
        })
    }
}

impl UploadClient for CommandUploader {
    fn upload_photo(&mut self, path: &Path, caption: &str) -> Result<PostId, UploadError> {
        let path_str = path.display().to_string();
        let output = run(&self.argv, &[&path_str, caption])
            .map_err(|e| UploadError::Transport(format!("failed to spawn {}: {e}", self.argv[0])))?;
        if !output.status.success() {
            return Err(UploadError::Rejected(stderr_line(&output)));
        }
        let id = stdout_trimmed(&output)
            .lines()
            .next()
            .unwrap_or("")
            .to_string();
        if id.is_empty() {
            return Err(UploadError::Rejected(
                "upload command printed no post id".into(),
            ));
        }
        self.last_post = Some(id.clone());
        Ok(PostId(id))
    }

    fn latest_post_url(&mut self) -> Result<Option<String>, UploadError> {
        Ok(self.last_post.clone())
    }
}

/// DM client that shells out to the configured command.
pub struct CommandNotifier {
    argv: Vec<String>,
}

impl CommandNotifier {
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv: argv.to_vec(),
        })
    }
}

impl Notifier for CommandNotifier {
    fn send_direct(&mut self, recipient: &str, message: &str) -> Result<(), NotifyError> {
        let output = run(&self.argv, &[recipient, message])
            .map_err(|e| NotifyError::Send(format!("failed to spawn {}: {e}", self.argv[0])))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(NotifyError::Send(stderr_line(&output)))
        }
    }
}

/// Caption generator that shells out to the configured command.
pub struct CommandCaptioner {
    argv: Vec<String>,
}

impl CommandCaptioner {
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv: argv.to_vec(),
        })
    }
}

impl CaptionSource for CommandCaptioner {
    fn caption(&self, request: &CaptionRequest) -> Result<String, CaptionError> {
        let output = run(&self.argv, &[&request.prompt])
            .map_err(|e| CaptionError::Generation(format!("failed to spawn {}: {e}", self.argv[0])))?;
        if !output.status.success() {
            return Err(CaptionError::Generation(stderr_line(&output)));
        }
        let text = stdout_trimmed(&output);
        if text.is_empty() {
            return Err(CaptionError::Empty);
        }
        Ok(text)
    }
}

/// Caption source of last resort: the filename stem read as words.
///
/// `Golden_Gate-bridge` captions as "Golden Gate bridge".
#[derive(Default)]
pub struct StemCaptioner;

impl CaptionSource for StemCaptioner {
    fn caption(&self, request: &CaptionRequest) -> Result<String, CaptionError> {
        let text = request.stem.replace(['_', '-'], " ").trim().to_string();
        if text.is_empty() {
            Err(CaptionError::Empty)
        } else {
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_argv_means_unconfigured() {
        assert!(CommandUploader::from_argv(&[]).is_none());
        assert!(CommandNotifier::from_argv(&[]).is_none());
        assert!(CommandCaptioner::from_argv(&[]).is_none());
    }

    #[test]
    fn stem_captioner_reads_stem_as_words() {
        let request = CaptionRequest::for_stem("Golden_Gate-bridge");
        assert_eq!(
            StemCaptioner.caption(&request).unwrap(),
            "Golden Gate bridge"
        );
    }

    #[test]
    fn stem_captioner_rejects_empty_stem() {
        let request = CaptionRequest::for_stem("");
        assert!(matches!(
            StemCaptioner.caption(&request),
            Err(CaptionError::Empty)
        ));
    }

    #[cfg(unix)]
    mod commands {
        use super::*;

        #[test]
        fn uploader_returns_first_stdout_line_as_post_id() {
            let mut uploader =
                CommandUploader::from_argv(&argv(&["sh", "-c", "echo post-777"])).unwrap();
            let id = uploader
                .upload_photo(Path::new("pics/a.jpg"), "caption")
                .unwrap();
            assert_eq!(id, PostId("post-777".into()));
            assert_eq!(uploader.latest_post_url().unwrap(), Some("post-777".into()));
        }

        #[test]
        fn uploader_failure_carries_stderr() {
            let mut uploader =
                CommandUploader::from_argv(&argv(&["sh", "-c", "echo rate limited >&2; exit 3"]))
                    .unwrap();
            let err = uploader
                .upload_photo(Path::new("pics/a.jpg"), "caption")
                .unwrap_err();
            assert!(err.to_string().contains("rate limited"));
        }

        #[test]
        fn uploader_rejects_silent_success() {
            let mut uploader = CommandUploader::from_argv(&argv(&["true"])).unwrap();
            assert!(
                uploader
                    .upload_photo(Path::new("pics/a.jpg"), "caption")
                    .is_err()
            );
            assert_eq!(uploader.latest_post_url().unwrap(), None);
        }

        #[test]
        fn uploader_missing_program_is_transport_error() {
            let mut uploader =
                CommandUploader::from_argv(&argv(&["/no/such/program-xyz"])).unwrap();
            assert!(matches!(
                uploader.upload_photo(Path::new("a.jpg"), "c"),
                Err(UploadError::Transport(_))
            ));
        }

        #[test]
        fn notifier_success_and_failure() {
            let mut ok = CommandNotifier::from_argv(&argv(&["true"])).unwrap();
            assert!(ok.send_direct("ana", "hi").is_ok());

            let mut bad = CommandNotifier::from_argv(&argv(&["false"])).unwrap();
            assert!(bad.send_direct("ana", "hi").is_err());
        }

        #[test]
        fn captioner_returns_trimmed_stdout() {
            let captioner =
                CommandCaptioner::from_argv(&argv(&["sh", "-c", "echo '  a lovely caption  '"]))
                    .unwrap();
            let request = CaptionRequest::for_stem("x");
            assert_eq!(captioner.caption(&request).unwrap(), "a lovely caption");
        }

        #[test]
        fn captioner_empty_output_is_empty_error() {
            let captioner = CommandCaptioner::from_argv(&argv(&["true"])).unwrap();
            let request = CaptionRequest::for_stem("x");
            assert!(matches!(
                captioner.caption(&request),
                Err(CaptionError::Empty)
            ));
        }
    }
}
