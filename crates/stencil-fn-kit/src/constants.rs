/// Layouts accepted for date-time text, tried in order after RFC 3339.
pub const DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%m/%d/%Y %H:%M:%S"];

/// Date-only layouts, resolved to midnight.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Layout used when a date-time is rendered as text.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub const BOOL_TRUE_TOKEN: &str = "true";
pub const BOOL_FALSE_TOKEN: &str = "false";
