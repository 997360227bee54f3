use crate::error::LimitError;

/// Cap on how many of a followed author's recipes are embedded in the
/// subscription view. `None` means "all of them".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipesLimit(Option<usize>);

impl RecipesLimit {
    pub fn parse(raw: Option<&str>) -> Result<Self, LimitError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self(None)),
            Some(value) => value
                .parse::<usize>()
                .map(|n| Self(Some(n)))
                .map_err(|_| LimitError::Invalid(value.to_string())),
        }
    }

    pub fn get(self) -> Option<usize> {
        self.0
    }

    /// Truncates `recipes`; a cap larger than the list returns it whole.
    pub fn apply<T>(self, mut recipes: Vec<T>) -> Vec<T> {
        if let Some(n) = self.0 {
            recipes.truncate(n);
        }
        recipes
    }
}
