//! Apache virtual host rendering.
//!
//! [`render_vhost`] produces the full contents of `<domain>.conf`: a port 80 block followed by a
//! port 443 block wrapped in `<IfModule mod_ssl.c>`.
//!
//! With SSL requested the port 80 block only redirects to HTTPS. Without it the port 80 block
//! proxies to the backend directly. The port 443 block is always present and points at the
//! snakeoil certificate until Certbot rewrites it.

/// Self-signed placeholder pair shipped by Debian's `ssl-cert` package.
pub const PLACEHOLDER_CERT: &str = "/etc/ssl/certs/ssl-cert-snakeoil.pem";
pub const PLACEHOLDER_KEY: &str = "/etc/ssl/private/ssl-cert-snakeoil.key";

const SSL_PROTOCOLS: &str = "all -SSLv3 -TLSv1 -TLSv1.1";
const SSL_CIPHERS: &str = "ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:\
                           ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384";
const HSTS: &str = "max-age=63072000; includeSubDomains; preload";
const CSP: &str = "default-src 'self'; script-src 'self' 'unsafe-inline' 'unsafe-eval'; \
                   style-src 'self' 'unsafe-inline';";

/// Render the virtual host configuration for `domain` proxying to `localhost:port`.
#[must_use]
pub fn render_vhost(domain: &str, port: u16, ssl: bool) -> String {
    let http = if ssl {
        http_redirect_block(domain)
    } else {
        http_proxy_block(domain, port)
    };
    format!("{http}\n{}", https_block(domain, port))
}

fn server_names(domain: &str) -> String {
    format!("    ServerName {domain}\n    ServerAlias www.{domain}\n")
}

fn log_directives(domain: &str, suffix: &str) -> String {
    format!(
        "    ErrorLog ${{APACHE_LOG_DIR}}/{domain}-{suffix}error.log\n    \
         CustomLog ${{APACHE_LOG_DIR}}/{domain}-{suffix}access.log combined\n"
    )
}

fn proxy_directives(port: u16, scheme: &str) -> String {
    format!(
        "    ProxyPreserveHost On\n    \
         ProxyPass / http://localhost:{port}/\n    \
         ProxyPassReverse / http://localhost:{port}/\n\
         \n    \
         ProxyAddHeaders On\n    \
         RequestHeader set X-Forwarded-Proto \"{scheme}\"\n    \
         RequestHeader set X-Forwarded-For %{{REMOTE_ADDR}}s\n    \
         RequestHeader set X-Real-IP %{{REMOTE_ADDR}}s\n"
    )
}

fn security_headers() -> &'static str {
    "    Header always set X-Frame-Options DENY\n    \
     Header always set X-Content-Type-Options nosniff\n    \
     Header always set X-XSS-Protection \"1; mode=block\"\n    \
     Header always set Referrer-Policy \"strict-origin-when-cross-origin\"\n"
}

fn http_redirect_block(domain: &str) -> String {
    format!(
        "<VirtualHost *:80>\n{names}\n{logs}\n    \
         RewriteEngine On\n    \
         RewriteCond %{{HTTPS}} off\n    \
         RewriteRule ^(.*)$ https://%{{HTTP_HOST}}%{{REQUEST_URI}} [R=301,L]\n\
         \n    \
         Header always set Strict-Transport-Security \"{HSTS}\"\n\
         </VirtualHost>\n",
        names = server_names(domain),
        logs = log_directives(domain, ""),
    )
}

fn http_proxy_block(domain: &str, port: u16) -> String {
    format!(
        "<VirtualHost *:80>\n{names}\n{logs}\n{proxy}\n{headers}</VirtualHost>\n",
        names = server_names(domain),
        logs = log_directives(domain, ""),
        proxy = proxy_directives(port, "http"),
        headers = security_headers(),
    )
}

fn https_block(domain: &str, port: u16) -> String {
    format!(
        "<IfModule mod_ssl.c>\n\
         <VirtualHost *:443>\n{names}\n{logs}\n{proxy}\n    \
         SSLEngine on\n    \
         SSLCertificateFile {PLACEHOLDER_CERT}\n    \
         SSLCertificateKeyFile {PLACEHOLDER_KEY}\n    \
         SSLProtocol {SSL_PROTOCOLS}\n    \
         SSLCipherSuite {SSL_CIPHERS}\n    \
         SSLHonorCipherOrder off\n    \
         SSLSessionTickets off\n\
         \n    \
         Header always set Strict-Transport-Security \"{HSTS}\"\n\
         {headers}    \
         Header always set Content-Security-Policy \"{CSP}\"\n\
         </VirtualHost>\n\
         </IfModule>\n",
        names = server_names(domain),
        logs = log_directives(domain, "ssl-"),
        proxy = proxy_directives(port, "https"),
        headers = security_headers(),
    )
}
