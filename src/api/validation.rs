use super::ApiError;

pub const MAX_QUERY_LENGTH: usize = 200;

pub fn validate_id(resource: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            resource, id
        )));
    }
    Ok(id)
}

pub fn validate_business_id(id: i32) -> Result<i32, ApiError> {
    validate_id("business", id)
}

pub fn validate_user_id(id: i32) -> Result<i32, ApiError> {
    validate_id("user", id)
}

pub fn validate_review_id(id: i32) -> Result<i32, ApiError> {
    validate_id("review", id)
}

/// Search text may be empty; it only has a length ceiling.
pub fn validate_search_text(text: &str) -> Result<&str, ApiError> {
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_QUERY_LENGTH {
        return Err(ApiError::validation(format!(
            "Search query must be {} characters or less",
            MAX_QUERY_LENGTH
        )));
    }
    Ok(trimmed)
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> Result<f64, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{name} is required")))?;
    raw.parse::<f64>()
        .map_err(|_| ApiError::validation(format!("{name} must be a number, got '{raw}'")))
}

/// Reads `lat`/`lng` query values. Range checks happen in the search service.
pub fn validate_origin(lat: Option<&str>, lng: Option<&str>) -> Result<(f64, f64), ApiError> {
    Ok((parse_coordinate("lat", lat)?, parse_coordinate("lng", lng)?))
}

pub fn validate_suggestion_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = validate_search_text(query)?;
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_business_id(1).is_ok());
        assert!(validate_user_id(12345).is_ok());
        assert!(validate_review_id(0).is_err());
        assert!(validate_business_id(-1).is_err());
    }

    #[test]
    fn test_validate_search_text() {
        assert_eq!(validate_search_text("  pizza  ").unwrap(), "pizza");
        assert_eq!(validate_search_text("").unwrap(), "");
        assert!(validate_search_text(&"a".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_origin() {
        assert_eq!(
            validate_origin(Some("40.5"), Some(" -74 ")).unwrap(),
            (40.5, -74.0)
        );
        assert!(validate_origin(None, Some("-74")).is_err());
        assert!(validate_origin(Some(""), Some("-74")).is_err());
        assert!(validate_origin(Some("north"), Some("-74")).is_err());
    }

    #[test]
    fn test_validate_suggestion_query() {
        assert!(validate_suggestion_query("caf").is_ok());
        assert!(validate_suggestion_query("   ").is_err());
    }
}
