//! Snippets injected into proxied HTML documents.

use crate::origin::TargetOrigin;
use crate::scripts::js_string;

/// Inputs for the HTML bootstrap of one document.
#[derive(Debug, Clone)]
pub struct Bootstrap<'a> {
    pub proxy_domain: &'a str,
    pub service_worker_path: &'a str,
    pub target: &'a TargetOrigin,
    /// The origin did not come from this request's query: move it into the URL.
    pub promote_to_url: bool,
    /// Operator-supplied code, already decoded.
    pub inject: Option<&'a str>,
}

impl Bootstrap<'_> {
    /// All snippets, in injection order.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.promote_to_url {
            out.push_str(&redirect_script(self.target));
        } else {
            out.push_str(&storage_script(self.target));
        }
        out.push_str(&service_worker_registration(
            self.proxy_domain,
            self.service_worker_path,
            self.target,
        ));
        if let Some(code) = self.inject {
            out.push_str(&injected_module(code));
        }
        out.push_str(&anchor_rewrite_script(self.target));

        out
    }
}

/// Re-navigate to the current URL with `ophost` appended.
pub fn redirect_script(target: &TargetOrigin) -> String {
    format!(
        r##"<script>
(() => {{
    const param = "ophost=" + encodeURIComponent({target});
    const href = window.location.href.split("#")[0];
    window.location.href = href.includes("?") ? href + "&" + param : href + "?" + param;
}})();
</script>"##,
        target = js_string(target.as_str()),
    )
}

/// Remember the origin client-side as a fallback channel.
pub fn storage_script(target: &TargetOrigin) -> String {
    format!(
        r#"<script>try {{ window.localStorage.setItem("OP-HOST", {target}); }} catch (_) {{}}</script>"#,
        target = js_string(target.as_str()),
    )
}

/// Register the interception worker for this origin.
pub fn service_worker_registration(
    proxy_domain: &str,
    service_worker_path: &str,
    target: &TargetOrigin,
) -> String {
    let url = format!("https://{proxy_domain}{service_worker_path}?ophost={target}");
    format!(
        r#"<script>
if ("serviceWorker" in navigator) {{
    navigator.serviceWorker.register({url}).then(
        (registration) => console.log("[OPHOST] Service worker registered with scope:", registration.scope),
        (err) => console.log("[OPHOST] Service worker registration failed:", err)
    );
}}
</script>"#,
        url = js_string(&url),
    )
}

/// Operator code as an executable module. Embedded verbatim: trusted input.
pub fn injected_module(code: &str) -> String {
    format!("<script type=\"module\">{code}</script>")
}

/// Point every anchor's query string at the current origin.
pub fn anchor_rewrite_script(target: &TargetOrigin) -> String {
    format!(
        r#"<script>
(() => {{
    const target = {target};
    const tag = () => document.querySelectorAll("a[href]").forEach((a) => {{
        try {{
            const url = new URL(a.href, window.location.href);
            url.searchParams.set("ophost", target);
            a.href = url.href;
        }} catch (_) {{}}
    }});
    if (document.readyState === "loading") {{
        document.addEventListener("DOMContentLoaded", tag);
    }} else {{
        tag();
    }}
}})();
</script>"#,
        target = js_string(target.as_str()),
    )
}

/// Insert `snippet` before the last `</body>`, or append it when there is none.
pub fn insert_before_body_end(html: &str, snippet: &str) -> String {
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + snippet.len());
            out.push_str(&html[..pos]);
            out.push_str(snippet);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}{snippet}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> TargetOrigin {
        TargetOrigin::new("site.test").unwrap()
    }

    #[test]
    fn test_render_order_with_promotion() {
        let target = target();
        let rendered = Bootstrap {
            proxy_domain: "proxy.test",
            service_worker_path: "/.sw.httpsw",
            target: &target,
            promote_to_url: true,
            inject: Some("console.log(1)"),
        }
        .render();

        let redirect = rendered.find("window.location.href =").unwrap();
        let register = rendered.find("serviceWorker.register").unwrap();
        let module = rendered.find("<script type=\"module\">console.log(1)</script>").unwrap();
        let anchors = rendered.find("a[href]").unwrap();
        assert!(redirect < register && register < module && module < anchors);
        assert!(!rendered.contains("localStorage"));
    }

    #[test]
    fn test_render_without_promotion_stores_origin() {
        let target = target();
        let rendered = Bootstrap {
            proxy_domain: "proxy.test",
            service_worker_path: "/.sw.httpsw",
            target: &target,
            promote_to_url: false,
            inject: None,
        }
        .render();

        assert!(rendered.contains(r#"localStorage.setItem("OP-HOST", "site.test")"#));
        assert!(rendered.contains(r#""https://proxy.test/.sw.httpsw?ophost=site.test""#));
        assert!(!rendered.contains("type=\"module\""));
    }

    #[test]
    fn test_redirect_script_drops_fragment_and_appends_origin() {
        let script = redirect_script(&target());
        assert!(script.starts_with("<script>"));
        assert!(script.ends_with("</script>"));
        assert!(script.contains(r##"window.location.href.split("#")[0]"##));
        assert!(script.contains(r#"encodeURIComponent("site.test")"#));
        assert!(script.contains(r#"href + "&" + param : href + "?" + param"#));
    }

    #[test]
    fn test_target_cannot_break_out_of_script() {
        let evil = TargetOrigin::new("x\"</script><img>").unwrap();
        let script = storage_script(&evil);
        assert_eq!(script.matches("</script>").count(), 1);
    }

    #[test]
    fn test_insert_before_last_body_close() {
        assert_eq!(
            insert_before_body_end("<html><BODY>x</BODY></html>", "<s/>"),
            "<html><BODY>x<s/></BODY></html>"
        );
        assert_eq!(insert_before_body_end("<title>t</title>", "<s/>"), "<title>t</title><s/>");
    }
}
