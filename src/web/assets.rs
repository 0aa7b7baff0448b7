//! Browser front end, embedded at compile time.

macro_rules! embedded {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/web/assets/", $file))
    };
}

pub struct Asset {
    pub content_type: &'static str,
    pub body: &'static str,
}

pub fn lookup(path: &str) -> Option<Asset> {
    let (content_type, body) = match path {
        "/" | "/index.html" => ("text/html; charset=utf-8", embedded!("index.html")),
        "/styles.css" => ("text/css; charset=utf-8", embedded!("styles.css")),
        "/app.js" => ("application/javascript; charset=utf-8", embedded!("app.js")),
        _ => return None,
    };
    Some(Asset { content_type, body })
}
