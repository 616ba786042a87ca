//! Service worker generation.
//!
//! # Responsibilities
//! - Claim every client as soon as the worker activates
//! - Intercept each `fetch` issued by a proxied page
//! - Re-address intercepted requests at the proxy with `ophost` set to the
//!   host they were originally bound for
//!
//! # Design Decisions
//! - Requests already addressed to the proxy are left to the network untouched;
//!   wrapping them again would loop forever
//! - Method, headers, credentials mode and body of the intercepted request
//!   are carried over

use chrono::{DateTime, SecondsFormat, Utc};

use crate::origin::TargetOrigin;
use crate::scripts::{js_string, NAVIGATE_PATH};

/// Inputs for one generated worker script.
#[derive(Debug, Clone)]
pub struct ServiceWorkerParams<'a> {
    pub proxy_domain: &'a str,
    pub service_worker_path: &'a str,
    pub target: &'a TargetOrigin,
}

/// Render the worker script served on the service-worker route.
pub fn render_service_worker(params: &ServiceWorkerParams<'_>, generated_at: DateTime<Utc>) -> String {
    let proxy_domain = params.proxy_domain;
    let referrer = format!("https://{proxy_domain}/?ophost={}", params.target);
    let intercept = format!("true; https://{proxy_domain}{}", params.service_worker_path);
    let renav = format!("https://{proxy_domain}{NAVIGATE_PATH}");

    format!(
        r#"// generated {generated}
const PROXY_HOST = {proxy_host};
const PROXY_REFERRER = {referrer};
const SW_INTERCEPT = {intercept};
const RENAV = {renav};

self.addEventListener("install", (event) => {{
    event.waitUntil(self.skipWaiting());
}});

self.addEventListener("activate", (event) => {{
    event.waitUntil(self.clients.claim());
}});

async function proxied(request) {{
    const url = new URL(request.url);
    url.searchParams.set("ophost", url.host);
    url.protocol = "https:";
    url.host = PROXY_HOST;

    const headers = new Headers(request.headers);
    headers.set("x-sw-intercept", SW_INTERCEPT);
    headers.set("x-renav", RENAV);

    const init = {{
        method: request.method,
        headers,
        credentials: request.credentials,
        redirect: request.redirect,
        referrer: PROXY_REFERRER,
    }};
    if (request.method !== "GET" && request.method !== "HEAD") {{
        init.body = await request.clone().arrayBuffer();
    }}

    return fetch(url.href, init);
}}

self.addEventListener("fetch", (event) => {{
    const url = new URL(event.request.url);
    // Already addressed to the proxy: let it through untouched.
    if (url.host === PROXY_HOST) return;
    event.respondWith(proxied(event.request));
}});
"#,
        generated = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        proxy_host = js_string(proxy_domain),
        referrer = js_string(&referrer),
        intercept = js_string(&intercept),
        renav = js_string(&renav),
    )
}
