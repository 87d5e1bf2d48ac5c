// ABOUTME: Text renderings of stored connections for listing and for ~/.ssh/config stanzas
// ABOUTME: Port detection is a literal `-p` to `Port` substitution over the raw extra args

use crate::storage::ConnectionRecord;

/// `name: [extra_args ]target`
pub fn listing_line(record: &ConnectionRecord) -> String {
    match record.extra_args.as_deref() {
        Some(extra_args) => format!("{}: {} {}", record.name, extra_args, record.target),
        None => format!("{}: {}", record.name, record.target),
    }
}

/// Renders a `Host` block ending in a blank line, so stanzas can be concatenated.
pub fn config_stanza(record: &ConnectionRecord) -> String {
    let mut stanza = format!("Host {}\n", record.name);

    match record.target.split_once('@') {
        Some((user, host)) => {
            stanza.push_str(&format!("HostName {host}\nUser {user}\n"));
        }
        None => {
            tracing::debug!("Target for {} has no user part", record.name);
            stanza.push_str(&format!("HostName {}\n", record.target));
        }
    }

    if let Some(extra_args) = record.extra_args.as_deref()
        && extra_args.contains("-p")
    {
        stanza.push_str(&extra_args.replace("-p", "Port"));
        stanza.push('\n');
    }

    stanza.push('\n');
    stanza
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, target: &str, extra_args: Option<&str>) -> ConnectionRecord {
        ConnectionRecord::new(
            name.to_string(),
            target.to_string(),
            extra_args.map(str::to_string),
        )
    }

    #[test]
    fn test_listing_without_extra_args() {
        let line = listing_line(&record("db", "admin@db.local", None));
        assert_eq!(line, "db: admin@db.local");
    }

    #[test]
    fn test_listing_with_extra_args() {
        let line = listing_line(&record("web", "deploy@web", Some("-p 2222 -A")));
        assert_eq!(line, "web: -p 2222 -A deploy@web");
    }

    #[test]
    fn test_export_with_port() {
        let stanza = config_stanza(&record("alice", "alice@example.com", Some("-p 2222")));

        assert!(stanza.contains("Host alice\n"));
        assert!(stanza.contains("HostName example.com\n"));
        assert!(stanza.contains("User alice\n"));
        assert!(stanza.contains("Port 2222\n"));
        assert_eq!(
            stanza,
            "Host alice\nHostName example.com\nUser alice\nPort 2222\n\n"
        );
    }

    #[test]
    fn test_export_without_port() {
        let stanza = config_stanza(&record("db", "admin@db.local", Some("-A")));
        assert_eq!(stanza, "Host db\nHostName db.local\nUser admin\n\n");
    }

    #[test]
    fn test_export_port_substitution_is_textual() {
        let stanza = config_stanza(&record("web", "deploy@web", Some("-A -p 22")));
        assert!(stanza.contains("-A Port 22\n"));
    }

    #[test]
    fn test_export_target_without_user() {
        let stanza = config_stanza(&record("bare", "bare.example.com", None));
        assert_eq!(stanza, "Host bare\nHostName bare.example.com\n\n");
    }
}
