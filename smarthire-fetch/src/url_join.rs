//! URL joining for base URLs that may already carry an `/api` prefix.

/// Segment that is collapsed when both sides carry it.
pub const API_SEGMENT: &str = "api";

/// Joins `base` and `path`, collapsing a duplicated `/api` boundary once.
///
/// ```
/// use smarthire_fetch::join_url;
///
/// assert_eq!(
///     join_url("https://api.x.com/api", "/api/seeker/info"),
///     "https://api.x.com/api/seeker/info"
/// );
/// assert_eq!(join_url("https://api.x.com", "seeker/info"), "https://api.x.com/seeker/info");
/// ```
pub fn join_url(base: &str, path: &str) -> String {
    join_url_with_prefix(base, path, API_SEGMENT)
}

/// Joins `base` and `path`, dropping `segment` from the front of `path` once
/// when `base` already ends with it.
///
/// Absolute `http(s)://` paths are returned unchanged.
pub fn join_url_with_prefix(base: &str, path: &str, segment: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }

    let base = base.strip_suffix('/').unwrap_or(base);
    let mut path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    if base.is_empty() {
        return path;
    }

    if !segment.is_empty() && last_segment(base) == segment && first_segment(&path) == segment {
        path.replace_range(..=segment.len(), "");
        if !path.is_empty() && !path.starts_with(['/', '?', '#']) {
            path.insert(0, '/');
        }
    }

    format!("{base}{path}")
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

fn last_segment(base: &str) -> &str {
    let without_query = base.split(['?', '#']).next().unwrap_or(base);
    without_query.rsplit('/').next().unwrap_or("")
}

/// First segment of a path that starts with `/`.
fn first_segment(path: &str) -> &str {
    path[1..].split(['/', '?', '#']).next().unwrap_or("")
}
