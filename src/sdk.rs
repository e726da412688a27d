use crate::page::PageConfig;

/// Inline script defining `window.disqus_config`, the callback the embed
/// runtime consults once `embed.js` has loaded.
pub fn bootstrap_script(config: &PageConfig) -> anyhow::Result<String> {
    // `</script` and `<!--` change how the HTML parser reads an inline script.
    let payload = serde_json::to_string(config)?.replace('<', "\\u003c");
    Ok(format!(
        r#"// Greentic comments bootstrap
(function(global) {{
  const page = {payload};
  global.disqus_config = function() {{
    this.page.url = page.url;
    this.page.identifier = page.identifier;
    if (page.title) {{
      this.page.title = page.title;
    }}
    if (page.language) {{
      this.language = page.language;
    }}
  }};
}})(window);
"#
    ))
}
