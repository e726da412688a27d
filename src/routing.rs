use crate::page::normalize_path;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug)]
pub enum RouteDecision {
    Serve(Box<RouteContent>),
    NotFound,
}

#[derive(Debug)]
pub struct RouteContent {
    pub html: String,
    pub path: String,
    pub html_path: PathBuf,
}

pub async fn resolve_route(page_root: &Path, path: &str) -> anyhow::Result<RouteDecision> {
    let path = normalize_path(path);
    let Some(candidates) = candidate_files(page_root, &path) else {
        return Ok(RouteDecision::NotFound);
    };
    for html_path in candidates {
        if fs::metadata(&html_path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            let html = load_html(&html_path).await?;
            return Ok(RouteDecision::Serve(Box::new(RouteContent {
                html,
                path,
                html_path,
            })));
        }
    }
    Ok(RouteDecision::NotFound)
}

fn candidate_files(page_root: &Path, path: &str) -> Option<Vec<PathBuf>> {
    let relative = path.trim_matches('/');
    if relative.is_empty() {
        return Some(vec![page_root.join("index.html")]);
    }
    if relative
        .split('/')
        .any(|segment| segment == ".." || segment == "." || segment.contains('\\'))
    {
        return None;
    }
    let relative = relative.trim_end_matches(".html");
    Some(vec![
        page_root.join(format!("{relative}.html")),
        page_root.join(relative).join("index.html"),
    ])
}

async fn load_html(html_path: &Path) -> anyhow::Result<String> {
    let contents = fs::read_to_string(html_path)
        .await
        .with_context(|| format!("reading html {:?}", html_path))?;
    Ok(contents)
}
