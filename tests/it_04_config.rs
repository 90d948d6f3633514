use media_models::Config;
use std::path::Path;

#[test]
fn shipped_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/default.toml");
    let config: Config = Config::figment(Some(&path)).extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn shipped_frontend_exists() {
    let index = Path::new(env!("CARGO_MANIFEST_DIR")).join("frontend_sessions/index.html");
    let html = std::fs::read_to_string(index).unwrap();
    assert!(html.contains("X-Session-ID"));
}

#[test]
fn builder_image_matches_rust_version() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let dockerfile = std::fs::read_to_string(root.join("Dockerfile")).unwrap();
    let builder = dockerfile
        .lines()
        .find(|l| l.starts_with("FROM rust:"))
        .expect("builder stage");
    let tag = builder.trim_start_matches("FROM rust:");
    assert!(tag.starts_with(&format!("{}-", env!("CARGO_PKG_RUST_VERSION"))));
}

#[test]
fn python_tools_are_pinned() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let requirements = std::fs::read_to_string(root.join("requirements.txt")).unwrap();
    let packages: Vec<&str> = requirements
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    assert!(packages.iter().any(|p| p.starts_with("yt-dlp")));
    assert!(packages.iter().any(|p| p.starts_with("bgutil-ytdlp-pot-provider")));
    assert!(packages.iter().all(|p| p.contains("==")));
}
