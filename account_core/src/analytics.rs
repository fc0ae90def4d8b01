use serde_json::json;
use url::Url;

/// Extra context sent along with a login so the server can attribute it in
/// analytics events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analytics {
    /// The course the user was trying to enroll in when they were asked to
    /// log in.
    pub enroll_course_id: String,
}

impl Analytics {
    /// Context for a specific course.
    pub fn for_course(course_id: impl Into<String>) -> Self {
        Self {
            enroll_course_id: course_id.into(),
        }
    }

    /// Pull context out of the `course_id` query parameter of the page the
    /// user came from. Missing or empty parameters mean there's nothing to
    /// report.
    pub fn from_page_url(url: &Url) -> Option<Self> {
        url.query_pairs()
            .find(|(key, _)| key == "course_id")
            .map(|(_, value)| value.into_owned())
            .filter(|course_id| !course_id.is_empty())
            .map(Self::for_course)
    }

    /// Serialize for the `analytics` form field.
    pub fn to_json(&self) -> String {
        json!({ "enroll_course_id": self.enroll_course_id }).to_string()
    }
}
