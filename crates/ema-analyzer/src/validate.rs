use ema_core::{PostRecord, ProfileRecord};

use crate::error::AnalyzerError;

/// Fewest posts an audit is attempted on.
pub const MIN_POSTS_FOR_AUDIT: usize = 5;

/// Checks that `profile` and `posts` are complete enough to analyze.
///
/// # Errors
///
/// Returns [`AnalyzerError::InvalidRequest`] when there are fewer than
/// [`MIN_POSTS_FOR_AUDIT`] posts, the profile lacks a handle or display name,
/// or any post has blank text.
pub fn validate_request(profile: &ProfileRecord, posts: &[PostRecord]) -> Result<(), AnalyzerError> {
    if posts.len() < MIN_POSTS_FOR_AUDIT {
        return Err(AnalyzerError::InvalidRequest(format!(
            "need at least {MIN_POSTS_FOR_AUDIT} posts for analysis, got {}",
            posts.len()
        )));
    }
    if profile.handle.trim().is_empty() || profile.display_name.trim().is_empty() {
        return Err(AnalyzerError::InvalidRequest(
            "profile must include handle and display name".to_string(),
        ));
    }
    if let Some(post) = posts.iter().find(|p| p.text.trim().is_empty()) {
        return Err(AnalyzerError::InvalidRequest(format!(
            "post {} has no text",
            post.id
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::{posts, profile};
    use super::*;

    #[test]
    fn accepts_complete_request() {
        assert!(validate_request(&profile(), &posts(5)).is_ok());
    }

    #[test]
    fn rejects_too_few_posts() {
        let err = validate_request(&profile(), &posts(4)).unwrap_err();
        assert!(err.to_string().contains("at least 5 posts"));
    }

    #[test]
    fn rejects_profile_without_name() {
        let mut profile = profile();
        profile.display_name = " ".to_string();
        assert!(matches!(
            validate_request(&profile, &posts(6)),
            Err(AnalyzerError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_blank_post_text() {
        let mut posts = posts(6);
        posts[2].text = "   ".to_string();
        let err = validate_request(&profile(), &posts).unwrap_err();
        assert!(err.to_string().contains("post 3 has no text"));
    }
}
