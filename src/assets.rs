use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::errors::{Error, Result};

/// Content type of a static file, guessed from its extension
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Resolve `asset` inside `root`, refusing anything that could escape it
pub fn resolve(root: &Path, asset: &str) -> Result<PathBuf> {
    let relative = Path::new(asset);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if asset.is_empty() || escapes {
        return Err(Error::NotFound(format!("asset '{}'", asset)));
    }
    Ok(root.join(relative))
}

/// Read a static file, returning its content type and bytes
pub fn load(root: &Path, asset: &str) -> Result<(&'static str, Vec<u8>)> {
    let path = resolve(root, asset)?;
    if !path.is_file() {
        return Err(Error::NotFound(format!("asset '{}'", asset)));
    }
    let bytes = fs::read(&path)?;
    Ok((content_type(&path), bytes))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("app/script.JS")), "text/javascript; charset=utf-8");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/www");
        assert_eq!(resolve(root, "style.css").unwrap(), PathBuf::from("/srv/www/style.css"));
        assert_eq!(resolve(root, "css/a.css").unwrap(), PathBuf::from("/srv/www/css/a.css"));
        assert!(resolve(root, "../etc/passwd").is_err());
        assert!(resolve(root, "css/../../secret").is_err());
        assert!(resolve(root, "/etc/passwd").is_err());
        assert!(resolve(root, "").is_err());
    }

    #[test]
    fn test_load() {
        let root = std::env::temp_dir().join(format!("fastfood-assets-{}", std::process::id()));
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("style.css"), "body {}").unwrap();

        let (content_type, bytes) = load(&root, "style.css").unwrap();
        assert_eq!(content_type, "text/css; charset=utf-8");
        assert_eq!(bytes, b"body {}");

        assert!(matches!(load(&root, "missing.css"), Err(Error::NotFound(_))));

        fs::remove_dir_all(&root).unwrap();
    }
}
