//! Prompt playback port.
//!
//! The session worker only needs "speak this text and return when playback
//! completes". The default implementation shells out to the platform TTS
//! binary; tests and `--mute` runs use the silent implementation.

use crate::config::default_tts_command;
use crate::log_debug;
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech command is empty")]
    EmptyCommand,

    #[error("speech command is not parseable: {0}")]
    Unparseable(#[from] shell_words::ParseError),

    #[error("failed to launch speech command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("speech command '{program}' exited with {status}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Blocking speech synthesis: returns once playback has finished.
pub trait SpeechSynth {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;

    fn name(&self) -> &'static str {
        "speech_synth"
    }
}

/// Shells out to a TTS binary; the prompt text is passed as the final
/// argument, never through a shell.
pub struct CommandSynth {
    program: String,
    args: Vec<String>,
}

impl CommandSynth {
    /// Parse a user-supplied command line such as `espeak -s 150`.
    pub fn from_command_line(command: &str) -> Result<Self, SpeechError> {
        let mut words = shell_words::split(command)?;
        if words.is_empty() {
            return Err(SpeechError::EmptyCommand);
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    /// Platform default (`say` on macOS, `espeak` elsewhere).
    pub fn platform_default() -> Self {
        Self {
            program: default_tts_command().to_string(),
            args: Vec::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechSynth for CommandSynth {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .status()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(SpeechError::CommandFailed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command_synth"
    }
}

/// No-op playback for muted runs and tests.
pub struct NullSynth;

impl SpeechSynth for NullSynth {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        log_debug(&format!("muted prompt playback ({} chars)", text.len()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null_synth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines_are_split_shell_style() {
        let synth = CommandSynth::from_command_line("espeak -s 150 -v 'en-us'")
            .expect("parseable command");
        assert_eq!(synth.program(), "espeak");
        assert_eq!(synth.args, vec!["-s", "150", "-v", "en-us"]);
    }

    #[test]
    fn empty_command_lines_are_rejected() {
        assert!(matches!(
            CommandSynth::from_command_line("   "),
            Err(SpeechError::EmptyCommand)
        ));
    }

    #[test]
    fn unterminated_quotes_are_rejected() {
        assert!(matches!(
            CommandSynth::from_command_line("say 'oops"),
            Err(SpeechError::Unparseable(_))
        ));
    }

    #[test]
    fn platform_default_names_a_binary() {
        assert!(!CommandSynth::platform_default().program().is_empty());
    }

    #[test]
    fn null_synth_always_succeeds() {
        let mut synth = NullSynth;
        assert!(synth.speak("Tell me about yourself.").is_ok());
        assert_eq!(synth.name(), "null_synth");
    }
}
