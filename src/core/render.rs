//! Configuration-file rendering.
//!
//! Each remote config file is produced from a named-field record and a
//! fixed template, so the exact text is testable without a connection.

use crate::utils::template;

/// The application environment file written to `<app_dir>/.env`.
#[derive(Debug, Clone)]
pub struct EnvFile {
    pub secret_key: String,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub csrf_trusted_origins: Vec<String>,
}

const ENV_FILE_TEMPLATE: &str = "\
DJANGO_SECRET_KEY={{secretKey}}
DJANGO_DEBUG={{debug}}
DJANGO_ALLOWED_HOSTS={{allowedHosts}}
DJANGO_CSRF_TRUSTED_ORIGINS={{trustedOrigins}}
";

impl EnvFile {
    /// Production settings for a deployed site: debug off, the domain and
    /// raw host allowed, HTTPS origin trusted.
    pub fn production(secret_key: String, domain: &str, host: &str) -> Self {
        Self {
            secret_key,
            debug: false,
            allowed_hosts: vec![domain.to_string(), host.to_string()],
            csrf_trusted_origins: vec![format!("https://{}", domain)],
        }
    }

    pub fn render(&self) -> String {
        template::render(
            ENV_FILE_TEMPLATE,
            &[
                ("secretKey", self.secret_key.as_str()),
                ("debug", if self.debug { "true" } else { "false" }),
                ("allowedHosts", &self.allowed_hosts.join(",")),
                ("trustedOrigins", &self.csrf_trusted_origins.join(",")),
            ],
        )
    }
}

/// The gunicorn systemd unit.
#[derive(Debug, Clone)]
pub struct ServiceUnit {
    pub app_dir: String,
}

const SERVICE_UNIT_TEMPLATE: &str = "\
[Unit]
Description=gunicorn daemon
After=network.target

[Service]
User=www-data
Group=www-data
WorkingDirectory={{appDir}}
EnvironmentFile={{appDir}}/.env
ExecStart={{appDir}}/.venv/bin/gunicorn core.wsgi:application --bind 127.0.0.1:8001 --workers 3

[Install]
WantedBy=multi-user.target
";

impl ServiceUnit {
    pub fn render(&self) -> String {
        template::render(SERVICE_UNIT_TEMPLATE, &[("appDir", self.app_dir.as_str())])
    }
}

/// The nginx site: static and media aliases, everything else proxied to
/// the local backend port with the standard forwarding headers.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub domain: String,
    pub host: String,
    pub app_dir: String,
}

const SITE_TEMPLATE: &str = "\
server {
    listen 80;
    server_name {{domain}} {{host}};

    location /static/ { alias {{appDir}}/staticfiles/; }
    location /media/  { alias {{appDir}}/media/; }

    location / {
        proxy_pass http://127.0.0.1:8001;
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }
}
";

impl SiteConfig {
    pub fn render(&self) -> String {
        template::render(
            SITE_TEMPLATE,
            &[
                ("domain", self.domain.as_str()),
                ("host", self.host.as_str()),
                ("appDir", self.app_dir.as_str()),
            ],
        )
    }
}

/// The fixed upload-size fragment for `/etc/nginx/conf.d/`.
pub const BODY_SIZE_CONF: &str = "client_max_body_size 20M;\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_file_renders_all_four_keys() {
        let env = EnvFile::production("k3y".into(), "example.com", "203.0.113.9");
        let text = env.render();
        assert_eq!(
            text,
            "DJANGO_SECRET_KEY=k3y\n\
             DJANGO_DEBUG=false\n\
             DJANGO_ALLOWED_HOSTS=example.com,203.0.113.9\n\
             DJANGO_CSRF_TRUSTED_ORIGINS=https://example.com\n"
        );
    }

    #[test]
    fn service_unit_injects_app_dir_everywhere() {
        let unit = ServiceUnit {
            app_dir: "/opt/app/webapp".into(),
        };
        let text = unit.render();
        assert!(text.contains("WorkingDirectory=/opt/app/webapp\n"));
        assert!(text.contains("EnvironmentFile=/opt/app/webapp/.env\n"));
        assert!(text.contains(
            "ExecStart=/opt/app/webapp/.venv/bin/gunicorn core.wsgi:application \
             --bind 127.0.0.1:8001 --workers 3"
        ));
        assert!(text.ends_with("WantedBy=multi-user.target\n"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn site_config_routes_static_media_and_proxy() {
        let site = SiteConfig {
            domain: "example.com".into(),
            host: "203.0.113.9".into(),
            app_dir: "/opt/app/webapp".into(),
        };
        let text = site.render();
        assert!(text.contains("server_name example.com 203.0.113.9;"));
        assert!(text.contains("location /static/ { alias /opt/app/webapp/staticfiles/; }"));
        assert!(text.contains("location /media/  { alias /opt/app/webapp/media/; }"));
        assert!(text.contains("proxy_pass http://127.0.0.1:8001;"));
        assert!(text.contains("proxy_set_header X-Forwarded-Proto $scheme;"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn body_size_fragment_is_exact() {
        assert_eq!(BODY_SIZE_CONF, "client_max_body_size 20M;\n");
    }
}
