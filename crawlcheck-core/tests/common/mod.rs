// In-process fixture sites shared by the integration tests

#![allow(dead_code)]

use crawlcheck_core::node::{GET, POST};
use crawlcheck_core::{CrawlOptions, Rule};
use crawlcheck_scanner::client::AppRequest;
use crawlcheck_scanner::{MemoryApp, Response};
use std::collections::BTreeSet;

/// Every path of the test site reachable by following hyperlinks from `/`.
pub const DIRECTLY_ACCESSIBLE_URLS: &[&str] = &[
    "/",
    "/abort/with/400",
    "/abort/with/500",
    "/page-a",
    "/page-b",
    "/page-c",
    "/page-c?query=foo",
    "/page-d",
    "/page-gallery",
    "/image-map-target",
    "/redirect/with/301",
    "/redirect/with/302",
    "/redirect-target",
];

pub fn directly_accessible() -> BTreeSet<String> {
    DIRECTLY_ACCESSIBLE_URLS.iter().map(|s| s.to_string()).collect()
}

pub fn without(paths: BTreeSet<String>, unwanted: &[&str]) -> BTreeSet<String> {
    paths
        .into_iter()
        .filter(|path| !unwanted.contains(&path.as_str()))
        .collect()
}

const NAV: &str = r#"<nav>
    <a href="/">Home</a>
    <a href="/page-a">Page A</a>
    <a href="/page-b">Page B</a>
    <a href="/page-c">Page C</a>
    <a id="menu-link-page-d-id" class="menu-link-page-d-class" href="/page-d">Page D</a>
    <a href="/page-gallery">Gallery</a>
</nav>"#;

fn layout(title: &str, content: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/style.css\">\n</head>\n\
         <body>\n{NAV}\n<main>\n{content}\n</main>\n</body>\n</html>"
    )
}

const PAGE_B: &str = r#"<p>Some links with query strings and errors.</p>
<a href="/page-c?query=foo">Page C with a query</a>
<a href="/abort/with/400">Bad request</a>
<a href="/abort/with/500">Server error</a>"#;

const PAGE_C: &str = r#"<a href="/redirect/with/301#ignored-fragment">Moved permanently</a>
<a href="/redirect/with/302">Found</a>"#;

const PAGE_D: &str = r#"<form id="form-get-id" class="form-get-class" name="form-get-name" method="get">
    <input type="text" name="get-field" value="get-value">
    <input type="submit">
</form>
<form id="form-post-id" class="form-post-class" name="form-post-name" method="post" action="/page-d">
    <input type="text" name="post-field" value="post-value">
    <input type="hidden" name="empty-field">
    <input type="submit">
</form>"#;

const PAGE_GALLERY: &str = r##"<img src="/image.png" usemap="#gallery-map" alt="gallery">
<map name="gallery-map">
    <area shape="rect" coords="0,0,10,10" href="/image-map-target" alt="target">
</map>"##;

/// The fixture site. Requests to any of `failure_paths` fail inside the
/// application.
pub fn test_site(failure_paths: &[&str]) -> MemoryApp {
    let route = |app: MemoryApp, method: &str, path: &str, respond: Handler| {
        add_route(app, failure_paths, method, path, respond)
    };

    let app = MemoryApp::new();
    let app = route(app, GET, "/", |_| Response::html(200, layout("Index", "<p>Welcome</p>")));
    let app = route(app, GET, "/page-a", |_| {
        Response::html(200, layout("Page A", "<p>We recommend page A.</p>"))
    });
    let app = route(app, GET, "/page-b", |_| Response::html(200, layout("Page B", PAGE_B)));
    let app = route(app, GET, "/page-c", |_| Response::html(200, layout("Page C", PAGE_C)));
    let app = route(app, GET, "/page-d", page_d);
    let app = route(app, POST, "/page-d", page_d);
    let app = route(app, GET, "/page-gallery", |_| {
        Response::html(200, layout("Gallery", PAGE_GALLERY))
    });
    let app = route(app, GET, "/form-submitted-by-get", |_| {
        Response::html(
            200,
            layout(
                "Submitted by GET",
                r#"<a href="/form-submitted-by-get-onward-link">Onward</a>"#,
            ),
        )
    });
    let app = route(app, GET, "/form-submitted-by-get-onward-link", |_| {
        Response::html(200, layout("Onward from GET", ""))
    });
    let app = route(app, GET, "/form-submitted-by-post", |_| {
        Response::html(
            200,
            layout(
                "Submitted by POST",
                r#"<a href="/form-submitted-by-post-onward-link">Onward</a>"#,
            ),
        )
    });
    let app = route(app, GET, "/form-submitted-by-post-onward-link", |_| {
        Response::html(200, layout("Onward from POST", ""))
    });
    let app = route(app, GET, "/redirect/with/301", |_| {
        Response::redirect(301, "/redirect-target")
    });
    let app = route(app, GET, "/redirect/with/302", |_| {
        Response::redirect(302, "/redirect-target")
    });
    let app = route(app, GET, "/redirect-target", |_| {
        Response::html(200, layout("Redirect target", ""))
    });
    let app = route(app, GET, "/image-map-target", |_| {
        Response::html(200, layout("Image map target", ""))
    });
    let app = route(app, GET, "/abort/with/400", |_| {
        Response::html(400, "<h1>Bad Request</h1>")
    });
    let app = route(app, GET, "/abort/with/500", |_| {
        Response::html(500, "<h1>Internal Server Error</h1>")
    });
    let app = route(app, GET, "/style.css", |_| {
        Response::new(200)
            .with_content_type("text/css")
            .with_body("dummy stylesheet")
    });
    route(app, GET, "/image.png", |_| {
        Response::new(200).with_content_type("image/png")
    })
}

type Handler = fn(&AppRequest) -> Response;

fn add_route(
    app: MemoryApp,
    failure_paths: &[&str],
    method: &str,
    path: &str,
    respond: Handler,
) -> MemoryApp {
    let fail = failure_paths.contains(&path);
    app.route(method, path, move |request: &AppRequest| {
        if fail {
            Err(format!("Instructed to fail at {}", request.path))
        } else {
            Ok(respond(request))
        }
    })
}

fn page_d(request: &AppRequest) -> Response {
    if request.params.is_empty() {
        return Response::html(200, layout("Page D", PAGE_D));
    }
    match request.method.as_str() {
        POST => Response::redirect(302, "/form-submitted-by-post"),
        _ => Response::redirect(302, "/form-submitted-by-get"),
    }
}

/// A site without end: every page links to the next one.
pub fn infinite_site(pages: usize) -> MemoryApp {
    (0..pages).fold(
        MemoryApp::new().page("/", r#"<a href="/page/0">start</a>"#),
        |app, i| {
            app.page(
                &format!("/page/{i}"),
                format!(r#"<a href="/page/{}">next</a>"#, i + 1),
            )
        },
    )
}

/// A site whose only link leaves it.
pub fn external_site() -> MemoryApp {
    MemoryApp::new().page(
        "/",
        r#"<a href="https://external.example/">elsewhere</a>"#,
    )
}

/// Options crawling from `/` without printing a summary.
pub fn options(rules: Vec<Rule>) -> CrawlOptions {
    CrawlOptions {
        initial_paths: vec!["/".to_string()],
        rules,
        output_summary: false,
        ..Default::default()
    }
}
