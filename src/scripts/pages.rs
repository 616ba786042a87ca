//! Static diagnostic and help pages.

use html_escape::{encode_double_quoted_attribute, encode_text};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:40rem;margin:3rem auto;padding:0 1rem;line-height:1.5}code{background:#eee;padding:0 .2rem}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLE}</style></head><body>{body}</body></html>\n"
    )
}

fn navigate_form(proxy_domain: &str) -> String {
    format!(
        r#"<form method="get" action="https://{action}/"><label>Host <input name="ophost" placeholder="example.com" required></label> <button type="submit">Go</button></form>"#,
        action = encode_double_quoted_attribute(proxy_domain),
    )
}

/// Served with 400 when no target origin could be resolved.
pub fn missing_origin_page(proxy_domain: &str) -> String {
    let domain = encode_text(proxy_domain);
    page(
        "Missing ophost",
        &format!(
            "<h1>No target host</h1>\
             <p>This request did not name a site to proxy. Add <code>?ophost=&lt;host&gt;</code> \
             to the URL, e.g. <code>https://{domain}/?ophost=example.com</code>.</p>{form}",
            form = navigate_form(proxy_domain),
        ),
    )
}

/// Navigation helper: pick a host to browse through the proxy.
pub fn navigation_page(proxy_domain: &str) -> String {
    page(
        "Navigate",
        &format!(
            "<h1>Navigate</h1><p>Enter the host to browse through <code>{domain}</code>.</p>{form}",
            domain = encode_text(proxy_domain),
            form = navigate_form(proxy_domain),
        ),
    )
}

/// Injection helper: how to attach code to proxied documents.
pub fn inject_help_page(proxy_domain: &str) -> String {
    let domain = encode_text(proxy_domain);
    page(
        "Inject",
        &format!(
            "<h1>Injecting code</h1>\
             <p>Code supplied in the <code>X-Proxy-Inject</code> header, or the \
             <code>x-proxy-inject</code> query parameter of the page or its referer, \
             is appended to every proxied HTML document as a module script.</p>\
             <p>Query values are form encoded: <code>+</code> is a space and \
             <code>%XX</code> escapes are decoded.</p>\
             <p>Example: <code>https://{domain}/?ophost=example.com&amp;x-proxy-inject=console.log(%22hi%22)</code></p>\
             <p>The code is embedded verbatim and is not sanitized.</p>"
        ),
    )
}
