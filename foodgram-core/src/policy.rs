//! Who may change what.
//!
//! Reads always pass. Catalog entries (ingredients, tags) are staff-only for
//! writes; a recipe can only be changed by its author.

use crate::error::PolicyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub is_staff: bool,
}

pub fn check_catalog(access: Access, principal: Option<&Principal>) -> Result<(), PolicyError> {
    if access == Access::Read {
        return Ok(());
    }
    match principal {
        None => Err(PolicyError::Unauthenticated),
        Some(p) if p.is_staff => Ok(()),
        Some(_) => Err(PolicyError::Forbidden),
    }
}

/// Staff get no special treatment here: only the author may edit.
pub fn check_recipe(
    access: Access,
    principal: Option<&Principal>,
    author_id: i32,
) -> Result<(), PolicyError> {
    if access == Access::Read {
        return Ok(());
    }
    match principal {
        None => Err(PolicyError::Unauthenticated),
        Some(p) if p.user_id == author_id => Ok(()),
        Some(_) => Err(PolicyError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAFF: Principal = Principal {
        user_id: 1,
        is_staff: true,
    };
    const COOK: Principal = Principal {
        user_id: 2,
        is_staff: false,
    };

    #[test]
    fn test_reads_bypass_everything() {
        assert!(check_catalog(Access::Read, None).is_ok());
        assert!(check_recipe(Access::Read, None, 99).is_ok());
        assert!(check_recipe(Access::Read, Some(&COOK), 99).is_ok());
    }

    #[test]
    fn test_catalog_writes() {
        assert_eq!(
            check_catalog(Access::Write, None),
            Err(PolicyError::Unauthenticated)
        );
        assert_eq!(
            check_catalog(Access::Write, Some(&COOK)),
            Err(PolicyError::Forbidden)
        );
        assert!(check_catalog(Access::Write, Some(&STAFF)).is_ok());
    }

    #[test]
    fn test_recipe_writes() {
        assert!(check_recipe(Access::Write, Some(&COOK), COOK.user_id).is_ok());
        assert_eq!(
            check_recipe(Access::Write, Some(&STAFF), COOK.user_id),
            Err(PolicyError::Forbidden)
        );
        assert_eq!(
            check_recipe(Access::Write, None, COOK.user_id),
            Err(PolicyError::Unauthenticated)
        );
    }
}
