//! CLI output formatting tests.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::json::StatusOutput;
    use super::super::text::{TextFormatter, format_remaining};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use smarthire_core::Session;
    use smarthire_store::Settings;

    fn session(expires_in: Duration) -> Session {
        Session {
            access_token: Some("not-a-jwt".to_string()),
            refresh_token: Some("R1".to_string()),
            expires_at: Some(Utc::now() + expires_in),
        }
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(42), "in 42s");
        assert_eq!(format_remaining(12 * 60), "in 12m");
        assert_eq!(format_remaining(2 * 3600), "in 2h");
        assert_eq!(format_remaining(3600 + 5 * 60), "in 1h 5m");
    }

    #[test]
    fn test_status_logged_in() {
        let status = StatusOutput::new(
            &session(Duration::hours(1)),
            &Settings::default(),
            Utc::now(),
        );
        let text = TextFormatter::new(false).format_status(&status);

        assert!(text.contains("✓ Logged in"));
        assert!(text.contains("Refresh:  available"));
        assert!(!text.contains("R1"));
    }

    #[test]
    fn test_status_expired() {
        let status = StatusOutput::new(
            &session(Duration::seconds(-5)),
            &Settings::default(),
            Utc::now(),
        );
        let text = TextFormatter::new(false).format_status(&status);

        assert!(text.contains("Access token expired"));
        assert!(text.contains("Expires:  expired"));
    }

    #[test]
    fn test_status_logged_out() {
        let status = StatusOutput::new(&Session::default(), &Settings::default(), Utc::now());
        let text = TextFormatter::new(false).format_status(&status);

        assert!(text.contains("✗ Not logged in"));
        assert!(text.contains("Refresh:  none"));
    }

    #[test]
    fn test_colors_toggle() {
        let status = StatusOutput::new(&Session::default(), &Settings::default(), Utc::now());
        assert!(TextFormatter::new(true).format_status(&status).contains("\x1b["));
        assert!(!TextFormatter::new(false).format_status(&status).contains("\x1b["));
    }

    #[test]
    fn test_format_value() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_value(&json!("ok")), "ok");
        assert_eq!(formatter.format_value(&json!(null)), "(no data)");
        assert!(formatter.format_value(&json!({"a": 1})).contains("\"a\": 1"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::{JsonFormatter, StatusOutput};
    use chrono::{Duration, Utc};
    use smarthire_core::{AppFlavor, Session};
    use smarthire_store::Settings;

    // Payload: {"claims":{"id":42,"username":"alice","userType":2}}
    const JWT: &str = "h.eyJjbGFpbXMiOnsiaWQiOjQyLCJ1c2VybmFtZSI6ImFsaWNlIiwidXNlclR5cGUiOjJ9fQ.s";

    #[test]
    fn test_status_json_never_contains_tokens() {
        let session = Session {
            access_token: Some(JWT.to_string()),
            refresh_token: Some("R1-secret".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        let settings = Settings {
            app: AppFlavor::Hr,
            ..Settings::default()
        };

        let status = StatusOutput::new(&session, &settings, Utc::now());
        let json = JsonFormatter::new(false).format(&status).unwrap();

        assert!(json.contains("\"authenticated\":true"));
        assert!(json.contains("\"username\":\"alice\""));
        assert!(json.contains("\"userId\":42"));
        assert!(json.contains("\"app\":\"hr\""));
        assert!(!json.contains("R1-secret"));
        assert!(!json.contains(JWT));
    }

    #[test]
    fn test_logged_out_omits_optional_fields() {
        let status = StatusOutput::new(&Session::default(), &Settings::default(), Utc::now());
        let json = JsonFormatter::new(false).format(&status).unwrap();

        assert!(json.contains("\"authenticated\":false"));
        assert!(!json.contains("expiresAt"));
        assert!(!json.contains("username"));
    }
}
