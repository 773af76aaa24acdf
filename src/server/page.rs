//! HTML pages served by the front-end

use crate::renderer::{BG_COLOR, HEIGHT, SCALE, WIDTH};
use crate::Preview;

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
.preview {{ border: 1px solid #555; background: {bg}; max-width: 100%; }}
.error {{ color: #a00; }}
label {{ display: inline-block; min-width: 6em; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        bg = BG_COLOR,
        body = body,
    )
}

fn upload_form() -> String {
    r#"<form method="post" action="/upload" enctype="multipart/form-data">
<p><label for="file">SVG file</label> <input type="file" id="file" name="file" accept=".svg,image/svg+xml"></p>
<p><label for="scale">Scale</label> <input type="text" id="scale" name="scale" placeholder="1.0"></p>
<p><label for="offset_x">Offset x</label> <input type="text" id="offset_x" name="offset_x" placeholder="0"></p>
<p><label for="offset_y">Offset y</label> <input type="text" id="offset_y" name="offset_y" placeholder="0"></p>
<p><label for="fit">Fit</label> <input type="checkbox" id="fit" name="fit" value="on"></p>
<p><input type="submit" value="Upload"></p>
</form>"#
        .to_string()
}

/// The landing page with the upload form
pub fn index() -> String {
    let body = format!(
        "<p>Upload an SVG drawing to preview it on a {}x{} canvas.</p>\n{}",
        WIDTH,
        HEIGHT,
        upload_form()
    );
    layout("Polyline Preview", &body)
}

/// The preview page for a successful upload
pub fn result(filename: &str, preview: &Preview) -> String {
    let body = format!(
        r#"<p>Preview of <code>{filename}</code></p>
<img class="preview" src="{src}" width="{width}" height="{height}" alt="Preview of {filename}">
<ul class="stats">
<li>Polylines: {polylines}</li>
<li>Segments: {segments}</li>
</ul>
<h2>Upload another</h2>
{form}"#,
        filename = escape_html(filename),
        src = preview.data_url(),
        width = WIDTH * SCALE,
        height = HEIGHT * SCALE,
        polylines = preview.polylines.len(),
        segments = preview.segments,
        form = upload_form(),
    );
    layout("Polyline Preview", &body)
}

/// A page reporting a failed request
pub fn error(message: &str) -> String {
    let body = format!(
        "<p class=\"error\">{}</p>\n<p><a href=\"/\">Back</a></p>",
        escape_html(message)
    );
    layout("Preview failed", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_index_has_form() {
        let html = index();
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="file""#));
        assert!(html.contains(r#"name="fit""#));
    }

    #[test]
    fn test_result_embeds_image() {
        let preview = Preview {
            polylines: vec![vec![(0., 0.).into(), (1., 1.).into()]],
            segments: 1,
            png: vec![0x89, b'P', b'N', b'G'],
        };
        let html = result("<evil>.svg", &preview);
        assert!(html.contains("src=\"data:image/png;base64,iVBORw==\""));
        assert!(html.contains("&lt;evil&gt;.svg"));
        assert!(!html.contains("<evil>"));
        assert!(html.contains("Polylines: 1"));
        assert!(html.contains("Segments: 1"));
    }

    #[test]
    fn test_error_page_escapes() {
        let html = error("bad <svg>");
        assert!(html.contains("bad &lt;svg&gt;"));
    }
}
