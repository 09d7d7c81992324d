//! Proxy selection from the usual `*_proxy` / `no_proxy` variables.

use url::Url;

use crate::env::Environment;

/// Look up `name` in lower case first, then upper case, ignoring empties.
fn lookup(env: &dyn Environment, name: &str) -> Option<String> {
    env.var(&name.to_lowercase())
        .filter(|v| !v.is_empty())
        .or_else(|| env.var(&name.to_uppercase()).filter(|v| !v.is_empty()))
}

/// Whether `no_proxy` lets requests to `url` go through a proxy.
fn should_proxy(env: &dyn Environment, host: &str, port: u16) -> bool {
    let Some(no_proxy) = lookup(env, "npm_config_no_proxy").or_else(|| lookup(env, "no_proxy"))
    else {
        return true;
    };
    let no_proxy = no_proxy.to_lowercase();
    if no_proxy == "*" {
        return false;
    }

    no_proxy
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .all(|entry| {
            let (entry_host, entry_port) = match entry.rsplit_once(':') {
                Some((h, p)) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => {
                    (h, p.parse::<u16>().ok())
                }
                _ => (entry, None),
            };
            if entry_port.is_some_and(|p| p != port) {
                return true;
            }
            if !entry_host.starts_with('.') && !entry_host.starts_with('*') {
                return host != entry_host;
            }
            let suffix = entry_host.strip_prefix('*').unwrap_or(entry_host);
            !host.ends_with(suffix)
        })
}

/// Proxy to use for `url`, if any.
pub fn proxy_for_url(url: &Url, env: &dyn Environment) -> Option<Url> {
    let scheme = url.scheme();
    let host = url.host_str()?.to_lowercase();
    let port = url.port_or_known_default().unwrap_or(0);

    if !should_proxy(env, &host, port) {
        return None;
    }

    let raw = lookup(env, &format!("npm_config_{scheme}_proxy"))
        .or_else(|| lookup(env, &format!("{scheme}_proxy")))
        .or_else(|| lookup(env, "npm_config_proxy"))
        .or_else(|| lookup(env, "all_proxy"))?;

    let raw = if raw.contains("://") {
        raw
    } else {
        format!("http://{raw}")
    };

    match Url::parse(&raw) {
        Ok(proxy) => Some(proxy),
        Err(e) => {
            log::warn!("ignoring unparseable proxy {raw}: {e}");
            None
        }
    }
}

/// Percent-decoded `(user, password)` embedded in a proxy URL.
pub fn proxy_credentials(proxy: &Url) -> Option<(String, String)> {
    let user = proxy.username();
    let password = proxy.password()?;
    if user.is_empty() || password.is_empty() {
        return None;
    }
    let user = urlencoding::decode(user).ok()?.into_owned();
    let password = urlencoding::decode(password).ok()?.into_owned();
    Some((user, password))
}
