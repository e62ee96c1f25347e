//! Drawing-program host: owns the one compiled program of an engine.

#[cfg(test)]
#[path = "program_test.rs"]
mod program_test;

use crate::hit::InteractiveShape;
use crate::script::{self, CompileError, FrameParams, Program, RuntimeError};
use crate::surface::Surface;

/// Holds at most one compiled program.
///
/// A successful [`compile`](Self::compile) replaces the current program; a
/// failed one leaves it in place.
#[derive(Debug, Default)]
pub struct ProgramHost {
    program: Option<Program>,
    source: Option<String>,
}

impl ProgramHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `source` and make it the current program.
    ///
    /// # Errors
    ///
    /// Returns the [`CompileError`]; the previous program is kept.
    pub fn compile(&mut self, source: &str) -> Result<(), CompileError> {
        let program = script::compile(source)?;
        self.program = Some(program);
        self.source = Some(source.to_owned());
        Ok(())
    }

    /// Drop the current program.
    pub fn clear(&mut self) {
        self.program = None;
        self.source = None;
    }

    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    /// Source text of the current program.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Run the current program for one frame. Returns `Ok(false)` when no
    /// program is compiled.
    ///
    /// # Errors
    ///
    /// Propagates the program's [`RuntimeError`].
    pub fn invoke(
        &self,
        surface: &mut dyn Surface,
        params: &FrameParams,
        register: &mut dyn FnMut(InteractiveShape),
    ) -> Result<bool, RuntimeError> {
        match &self.program {
            Some(program) => program.run(surface, params, register).map(|()| true),
            None => Ok(false),
        }
    }
}
