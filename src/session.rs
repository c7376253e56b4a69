use _model::ResultSet;

use crate::{
    error::ExportError,
    export::{export, Export, ExportFormat},
};

/// Holds the result set of the latest successful search. Each search
/// replaces it wholesale; a failed search leaves it as it was.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<ResultSet>,
}

impl Session {
    pub fn current(&self) -> Option<&ResultSet> {
        self.current.as_ref()
    }

    pub fn replace(&mut self, set: ResultSet) -> &ResultSet {
        self.current.insert(set)
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn export(&self, format: ExportFormat) -> Result<Export, ExportError> {
        match &self.current {
            Some(set) => export(format, &set.params, &set.results),
            None => Err(ExportError::EmptyResultSet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::params;

    #[test]
    fn export_needs_results() {
        let mut session = Session::default();
        assert!(matches!(
            session.export(ExportFormat::Json),
            Err(ExportError::EmptyResultSet)
        ));

        session.replace(ResultSet {
            params: params("bar", "Porto", 5),
            results: Vec::new(),
        });
        assert!(matches!(
            session.export(ExportFormat::Csv),
            Err(ExportError::EmptyResultSet)
        ));
    }

    #[test]
    fn reset_clears() {
        let mut session = Session::default();
        session.replace(ResultSet {
            params: params("bar", "Porto", 5),
            results: Vec::new(),
        });
        assert!(session.current().is_some());

        session.reset();
        assert!(session.current().is_none());
    }
}
