//! Command-line switch parsing.
//!
//! The grammar is deliberately permissive: switches may appear anywhere,
//! any unrecognized token is taken as a session path with the last one
//! winning, and `/NewProject` forces an empty initial path no matter where
//! it sits relative to the paths.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    #[error("Switch {0} expects a value")]
    MissingValue(String),
}

/// Parsed startup parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioArgs {
    /// Session to open initially; `None` shows the project picker.
    pub initial_session: Option<Utf8PathBuf>,

    /// Start with an empty project regardless of any session path.
    pub new_project: bool,

    /// Enable graphics debugging for the embedded preview.
    pub debug_graphics: bool,

    /// Disable preview rendering and install graphics capture hooks.
    pub capture: bool,

    /// Where to record compiled effect logs.
    pub effect_log: Option<Utf8PathBuf>,
}

impl StudioArgs {
    /// Parse raw arguments (without the program name).
    ///
    /// `seed_session` is the path restored from settings before the
    /// arguments are considered; a path on the command line replaces it.
    pub fn parse<I, S>(args: I, seed_session: Option<Utf8PathBuf>) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self {
            initial_session: seed_session,
            ..Self::default()
        };

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let arg = arg.as_ref();
            match arg {
                "/NewProject" => parsed.new_project = true,
                "/DebugEditorGraphics" => parsed.debug_graphics = true,
                "/RenderDoc" => parsed.capture = true,
                "/RecordEffects" => {
                    // Consumes the following token unconditionally.
                    let value = iter
                        .next()
                        .ok_or_else(|| ArgsError::MissingValue(arg.to_string()))?;
                    parsed.effect_log = Some(Utf8PathBuf::from(value.as_ref()));
                }
                _ => parsed.initial_session = Some(Utf8PathBuf::from(arg)),
            }
        }

        // An explicit new-project request wins over every session path,
        // wherever it appeared.
        if parsed.new_project {
            parsed.initial_session = None;
        }

        Ok(parsed)
    }
}
