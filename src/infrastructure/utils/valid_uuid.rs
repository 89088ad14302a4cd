use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path segment as a user id.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hyphenated_ids() {
        let id = Uuid::new_v4();
        assert_eq!(valid_uuid(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(valid_uuid("csv_12"), Err(AppError::BadRequest(_))));
    }
}
