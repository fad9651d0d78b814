// Program Repository Port (Interface)

use crate::domain::{Program, ProgramId, Term, TermId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Program and Term persistence (authoring path)
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Insert a new program
    async fn insert(&self, program: &Program) -> Result<()>;

    /// Find program by ID
    async fn find_by_id(&self, id: &ProgramId) -> Result<Option<Program>>;

    /// Update program (full record, last-writer-wins)
    async fn update(&self, program: &Program) -> Result<()>;

    /// Insert a new term; (program_id, term_number) must be unique
    async fn insert_term(&self, term: &Term) -> Result<()>;

    /// Find term by ID
    async fn find_term_by_id(&self, id: &TermId) -> Result<Option<Term>>;

    /// All terms of a program, ordered by term number
    async fn list_terms(&self, program_id: &ProgramId) -> Result<Vec<Term>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory ProgramRepository for unit tests
    pub struct InMemoryProgramRepository {
        programs: Mutex<HashMap<ProgramId, Program>>,
        terms: Mutex<HashMap<TermId, Term>>,
    }

    impl InMemoryProgramRepository {
        pub fn new() -> Self {
            Self {
                programs: Mutex::new(HashMap::new()),
                terms: Mutex::new(HashMap::new()),
            }
        }
    }

    impl Default for InMemoryProgramRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ProgramRepository for InMemoryProgramRepository {
        async fn insert(&self, program: &Program) -> Result<()> {
            let mut programs = self.programs.lock().unwrap();
            if programs.contains_key(&program.id) {
                return Err(AppError::Conflict(format!(
                    "Program {} already exists",
                    program.id
                )));
            }
            programs.insert(program.id.clone(), program.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &ProgramId) -> Result<Option<Program>> {
            Ok(self.programs.lock().unwrap().get(id).cloned())
        }

        async fn update(&self, program: &Program) -> Result<()> {
            let mut programs = self.programs.lock().unwrap();
            if !programs.contains_key(&program.id) {
                return Err(AppError::NotFound(format!(
                    "Program {} not found",
                    program.id
                )));
            }
            programs.insert(program.id.clone(), program.clone());
            Ok(())
        }

        async fn insert_term(&self, term: &Term) -> Result<()> {
            let mut terms = self.terms.lock().unwrap();
            if terms
                .values()
                .any(|t| t.program_id == term.program_id && t.term_number == term.term_number)
            {
                return Err(AppError::Conflict(format!(
                    "Term number {} already used in program {}",
                    term.term_number, term.program_id
                )));
            }
            terms.insert(term.id.clone(), term.clone());
            Ok(())
        }

        async fn find_term_by_id(&self, id: &TermId) -> Result<Option<Term>> {
            Ok(self.terms.lock().unwrap().get(id).cloned())
        }

        async fn list_terms(&self, program_id: &ProgramId) -> Result<Vec<Term>> {
            let mut found: Vec<Term> = self
                .terms
                .lock()
                .unwrap()
                .values()
                .filter(|t| &t.program_id == program_id)
                .cloned()
                .collect();
            found.sort_by_key(|t| t.term_number);
            Ok(found)
        }
    }
}
