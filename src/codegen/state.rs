// Basalt - A small typed scripting language with a verifying IR backend
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Per-function emission states.
//!
//! ```text
//! Entry -> EmittingBody -> Terminated      -> Verified
//!              ^    |    \-> FallThroughExit -> Verified
//!              \----/
//! ```

use crate::error::{CompileError, ErrorCode, Span};

/// Where the emission of one function stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitState {
    /// Block created, parameters and locals not yet bound.
    Entry,
    /// Statements are being emitted.
    EmittingBody,
    /// An explicit `return` ended the body.
    Terminated,
    /// The body ended without `return`; a default was returned.
    FallThroughExit,
    /// The backend accepted the function.
    Verified,
}

impl EmitState {
    /// Check if moving from `self` to `next` is legal.
    pub fn can_transition(self, next: EmitState) -> bool {
        use EmitState::*;
        matches!(
            (self, next),
            (Entry, EmittingBody)
                | (EmittingBody, EmittingBody)
                | (EmittingBody, Terminated)
                | (EmittingBody, FallThroughExit)
                | (Terminated, Verified)
                | (FallThroughExit, Verified)
        )
    }

    /// Move to `next`, or fail.
    pub fn transition(self, next: EmitState) -> Result<EmitState, CompileError> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(CompileError::new(
                ErrorCode::InvalidEmissionState,
                format!("Invalid emission state change {:?} -> {:?}", self, next),
                Span::default(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(EmitState::Entry, EmitState::EmittingBody ; "entry starts body")]
    #[test_case(EmitState::EmittingBody, EmitState::EmittingBody ; "body self loop")]
    #[test_case(EmitState::EmittingBody, EmitState::Terminated ; "return terminates")]
    #[test_case(EmitState::EmittingBody, EmitState::FallThroughExit ; "fall through")]
    #[test_case(EmitState::Terminated, EmitState::Verified ; "terminated verifies")]
    #[test_case(EmitState::FallThroughExit, EmitState::Verified ; "fall through verifies")]
    fn test_legal_transitions(from: EmitState, to: EmitState) {
        assert_eq!(from.transition(to), Ok(to));
    }

    #[test_case(EmitState::Terminated, EmitState::EmittingBody ; "no way back from terminated")]
    #[test_case(EmitState::Entry, EmitState::Terminated ; "entry cannot terminate")]
    #[test_case(EmitState::Verified, EmitState::EmittingBody ; "verified is final")]
    #[test_case(EmitState::FallThroughExit, EmitState::Terminated ; "single exit")]
    fn test_illegal_transitions(from: EmitState, to: EmitState) {
        let error = from.transition(to).unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidEmissionState);
    }
}
