// src/core/knowledge_base.rs

//! Static, read-only catalog of mitigation guidance.
//!
//! Each entry is keyed by the rule id it answers and the service family it
//! belongs to. Keeping the advice as data means a new rule only needs a new
//! row here to show up in every report.

use serde::Serialize;

/// Service tag that matches every requested service.
pub const ANY_SERVICE: &str = "any";

/// Human-readable guidance for one kind of finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Rule id this entry answers (e.g. "missing_csp").
    pub rule_id: &'static str,
    /// Service family the entry is filed under ("http", "ssh", "generic", ...).
    pub service: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Concrete, actionable steps.
    pub fix: &'static str,
    pub references: &'static [&'static str],
}

static RECOMMENDATIONS: &[Recommendation] = &[
    // --- HTTP: Hardening the Application Layer ---
    Recommendation {
        rule_id: "missing_csp",
        service: "http",
        title: "Content-Security-Policy Missing",
        description: "Without a CSP the browser will execute any script injected into the page, so a single XSS flaw can take over user sessions.",
        fix: "Send a Content-Security-Policy header. Start with \"default-src 'self'\" in report-only mode, review violations, then enforce it.",
        references: &[
            "https://owasp.org/www-project-secure-headers/",
            "https://developer.mozilla.org/en-US/docs/Web/HTTP/CSP",
        ],
    },
    Recommendation {
        rule_id: "missing_x_frame_options",
        service: "http",
        title: "X-Frame-Options Missing",
        description: "Pages that can be embedded in a frame by any origin are exposed to clickjacking, where users are tricked into clicking hidden controls.",
        fix: "Send \"X-Frame-Options: DENY\" (or SAMEORIGIN if the site frames itself), or the CSP directive \"frame-ancestors 'none'\".",
        references: &["https://owasp.org/www-community/attacks/Clickjacking"],
    },
    Recommendation {
        rule_id: "missing_security_headers",
        service: "http",
        title: "Security Headers Not Configured",
        description: "The web server omits the standard browser hardening headers, leaving users without defense-in-depth against common client-side attacks.",
        fix: "Configure CSP, X-Frame-Options, X-Content-Type-Options: nosniff and Referrer-Policy at the web server or reverse proxy.",
        references: &["https://owasp.org/www-project-secure-headers/"],
    },
    // --- TLS ---
    Recommendation {
        rule_id: "missing_hsts",
        service: "https",
        title: "HSTS Header Missing",
        description: "Without Strict-Transport-Security a network attacker can downgrade the first request to plain HTTP and intercept the session.",
        fix: "Send \"Strict-Transport-Security: max-age=31536000; includeSubDomains\" on every HTTPS response once all subdomains serve HTTPS.",
        references: &["https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Strict-Transport-Security"],
    },
    Recommendation {
        rule_id: "tls_missing_hsts",
        service: "tls",
        title: "TLS Endpoint Without HSTS",
        description: "The TLS endpoint does not instruct browsers to refuse plaintext connections, so users following http:// links remain exposed.",
        fix: "Enable HSTS on the TLS terminator and consider submitting the domain to the HSTS preload list.",
        references: &["https://hstspreload.org/"],
    },
    Recommendation {
        rule_id: "weak_tls_configuration",
        service: "tls",
        title: "Weak TLS Configuration",
        description: "Legacy protocol versions and cipher suites allow downgrade attacks and can be broken by a well-resourced attacker.",
        fix: "Disable SSLv3, TLS 1.0 and TLS 1.1. Prefer TLS 1.2+ with AEAD cipher suites and forward secrecy.",
        references: &["https://ssl-config.mozilla.org/"],
    },
    // --- Remote Access ---
    Recommendation {
        rule_id: "open_ssh",
        service: "ssh",
        title: "SSH Exposed to the Network",
        description: "An internet-facing SSH service is a constant target for credential stuffing and brute-force attempts.",
        fix: "Restrict SSH to a VPN or allow-listed addresses, disable password and root login, and require key-based authentication.",
        references: &["https://www.ssh.com/academy/ssh/sshd_config"],
    },
    // --- Cleartext Protocols ---
    Recommendation {
        rule_id: "unencrypted_service",
        service: "generic",
        title: "Unencrypted Service Exposed",
        description: "The protocol sends credentials and data in cleartext, so anyone on the network path can read or alter them.",
        fix: "Replace the service with its encrypted counterpart (SFTP, SSH, POP3S, IMAPS) or wrap it in TLS, then close the cleartext port.",
        references: &["https://cwe.mitre.org/data/definitions/319.html"],
    },
    Recommendation {
        rule_id: "ftp_cleartext_auth",
        service: "ftp",
        title: "FTP Cleartext Authentication",
        description: "FTP logins travel unencrypted and are trivially captured by passive network sniffing.",
        fix: "Migrate transfers to SFTP or enforce FTPS with explicit TLS for both control and data channels.",
        references: &["https://datatracker.ietf.org/doc/html/rfc4217"],
    },
    Recommendation {
        rule_id: "ftp_anonymous_enabled",
        service: "ftp",
        title: "Anonymous FTP Enabled",
        description: "Anonymous access lets anyone list and download files, and sometimes upload them.",
        fix: "Disable anonymous login unless it is a deliberate public mirror, and never allow anonymous writes.",
        references: &["https://cwe.mitre.org/data/definitions/284.html"],
    },
    // --- Databases ---
    Recommendation {
        rule_id: "db_exposed_service",
        service: "database",
        title: "Database Reachable From the Network",
        description: "Database engines are not designed to face untrusted networks; exposure invites data theft and ransomware.",
        fix: "Bind the database to a private interface, firewall the port, and reach it only through the application tier or a bastion.",
        references: &["https://cwe.mitre.org/data/definitions/668.html"],
    },
    Recommendation {
        rule_id: "db_weak_authentication",
        service: "database",
        title: "Weak Database Authentication",
        description: "Default or empty database credentials are the first thing automated attacks try.",
        fix: "Enable authentication, rotate default credentials, and give each application a least-privilege account.",
        references: &["https://cwe.mitre.org/data/definitions/521.html"],
    },
    // --- General ---
    Recommendation {
        rule_id: "sensitive_port_exposed",
        service: "generic",
        title: "Sensitive Service Port Exposed",
        description: "The port belongs to a service (database, file sharing, remote desktop) that should never be reachable from untrusted networks.",
        fix: "Close the port at the firewall or security group and expose the service only through a VPN or private network.",
        references: &["https://www.cisa.gov/news-events/news/securing-network-infrastructure-devices"],
    },
    Recommendation {
        rule_id: "service_version_disclosure",
        service: "generic",
        title: "Service Version Disclosed",
        description: "The banner reveals the exact product version, letting attackers match it against known vulnerabilities without probing further.",
        fix: "Suppress or genericize the version banner in the service configuration and keep the software patched.",
        references: &["https://cwe.mitre.org/data/definitions/200.html"],
    },
    Recommendation {
        rule_id: "weak_authentication",
        service: "generic",
        title: "Weak Authentication",
        description: "Services that accept weak or default credentials can be taken over by automated guessing.",
        fix: "Enforce strong credentials, rate-limit login attempts, and enable multi-factor authentication where available.",
        references: &["https://owasp.org/www-project-top-ten/"],
    },
    Recommendation {
        rule_id: "outdated_software",
        service: "generic",
        title: "Outdated Software",
        description: "Unpatched software carries publicly documented vulnerabilities with ready-made exploits.",
        fix: "Track vendor advisories and apply security updates on a fixed schedule.",
        references: &["https://www.cisa.gov/known-exploited-vulnerabilities-catalog"],
    },
    Recommendation {
        rule_id: "excessive_port_exposure",
        service: "generic",
        title: "Excessive Port Exposure",
        description: "Every reachable port widens the attack surface, and forgotten services are rarely patched.",
        fix: "Default-deny inbound traffic and open only the ports the host's role requires.",
        references: &["https://cwe.mitre.org/data/definitions/1327.html"],
    },
    Recommendation {
        rule_id: "default_configuration",
        service: "generic",
        title: "Default Configuration",
        description: "Out-of-the-box settings favor convenience over security and are well known to attackers.",
        fix: "Apply a hardening baseline (for example the relevant CIS benchmark) before exposing the service.",
        references: &["https://www.cisecurity.org/cis-benchmarks"],
    },
];

/// Filters the catalog by rule id and service.
///
/// `None` for either argument means "no constraint". An entry filed under
/// [`ANY_SERVICE`] matches every requested service. The result keeps catalog
/// order and is empty when nothing matches.
pub fn get_recommendations(rule_id: Option<&str>, service: Option<&str>) -> Vec<Recommendation> {
    RECOMMENDATIONS
        .iter()
        .filter(|r| rule_id.is_none_or(|id| r.rule_id == id))
        .filter(|r| service.is_none_or(|s| r.service == ANY_SERVICE || r.service == s))
        .cloned()
        .collect()
}
