use std::fmt;

use crate::gfx::ShaderStage;

/// Compile or link failure reported by the backend.
///
/// These never abort rendering: they are logged and the failed handle is used
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderDiagnostic {
    Compile {
        stage: ShaderStage,
        label: String,
        log: String,
    },
    Link {
        label: String,
        log: String,
    },
}

impl ShaderDiagnostic {
    pub fn log(&self) -> &str {
        match self {
            ShaderDiagnostic::Compile { log, .. } | ShaderDiagnostic::Link { log, .. } => log,
        }
    }

    /// Writes the diagnostic to the `error` log.
    pub fn report(&self) {
        log::error!("{self}");
    }
}

impl fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderDiagnostic::Compile { stage, label, log } => {
                write!(f, "failed to compile {stage} shader {label}:\n{log}")
            }
            ShaderDiagnostic::Link { label, log } => {
                write!(f, "failed to link program {label}:\n{log}")
            }
        }
    }
}

impl std::error::Error for ShaderDiagnostic {}
