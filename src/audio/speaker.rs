use crate::error::SpeechError;
use std::process::{Command, Stdio};

pub const DEFAULT_SPEECH_PROGRAM: &str = "espeak";

/// A text-to-speech engine. Calls block until the text has been spoken.
pub trait Speaker: Send + 'static {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Speaks by running an external TTS program with the text as its last argument,
/// e.g. `espeak "<text>"` or `say "<text>"`.
#[derive(Clone, Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpeaker {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for CommandSpeaker {
    fn default() -> Self {
        CommandSpeaker::new(DEFAULT_SPEECH_PROGRAM)
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| SpeechError::Launch {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::ExitStatus {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_a_launch_error() {
        let speaker = CommandSpeaker::new("ppe-inspector-no-such-tts-program");
        assert!(matches!(
            speaker.speak("hello"),
            Err(SpeechError::Launch { .. })
        ));
    }
}
