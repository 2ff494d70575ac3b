use std::path::PathBuf;

/// Directory with uploaded media (course covers, lesson videos).
pub fn get_uploads_dir() -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(cwd.join("uploads"))
}

/// Public URL of an uploaded file given its path relative to the uploads dir.
pub fn upload_url(relative: &str) -> String {
    format!("{}{}", crate::web::routes::STATIC_PREFIX, relative.trim_start_matches('/'))
}
