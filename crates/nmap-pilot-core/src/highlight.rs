use colored::Colorize;

/// Categories assigned to nmap output lines. Classification is an ordered
/// first-match-wins substring table; case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    OpenPort,
    ClosedPort,
    FilteredPort,
    ReportHeader,
    ScanStart,
    HostUp,
    HostDown,
    MacAddress,
    Plain,
}

const RULES: &[(&str, LineClass)] = &[
    ("open", LineClass::OpenPort),
    ("closed", LineClass::ClosedPort),
    ("filtered", LineClass::FilteredPort),
    ("Nmap scan report for", LineClass::ReportHeader),
    ("Starting Nmap", LineClass::ScanStart),
    ("Host is up", LineClass::HostUp),
    ("Host seems down", LineClass::HostDown),
    ("MAC Address", LineClass::MacAddress),
];

/// Classify a single output line. The first rule whose substring occurs in
/// the line wins; lines matching nothing are `Plain`.
pub fn classify(line: &str) -> LineClass {
    RULES
        .iter()
        .find(|(needle, _)| line.contains(needle))
        .map(|(_, class)| *class)
        .unwrap_or(LineClass::Plain)
}

/// Decorate a line according to its class. Pure: `Plain` lines pass through
/// unchanged, everything else gains a marker and/or color.
pub fn render(line: &str) -> String {
    match classify(line) {
        LineClass::OpenPort => format!("[+] {line}").green().to_string(),
        LineClass::ClosedPort => format!("[-] {line}").red().to_string(),
        LineClass::FilteredPort => format!("[!] {line}").yellow().to_string(),
        LineClass::ReportHeader => format!("\n{}", line.cyan().bold()),
        LineClass::ScanStart => line.cyan().bold().to_string(),
        LineClass::HostUp => line.green().to_string(),
        LineClass::HostDown => line.red().to_string(),
        LineClass::MacAddress => line.cyan().to_string(),
        LineClass::Plain => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_port_states() {
        assert_eq!(classify("22/tcp open ssh"), LineClass::OpenPort);
        assert_eq!(classify("23/tcp closed telnet"), LineClass::ClosedPort);
        assert_eq!(classify("53/udp filtered domain"), LineClass::FilteredPort);
    }

    #[test]
    fn classifies_report_lines() {
        assert_eq!(
            classify("Nmap scan report for 192.168.1.1"),
            LineClass::ReportHeader
        );
        assert_eq!(
            classify("Starting Nmap 7.95 ( https://nmap.org )"),
            LineClass::ScanStart
        );
        assert_eq!(classify("Host is up (0.0010s latency)."), LineClass::HostUp);
        assert_eq!(
            classify("Note: Host seems down. If it is really up, ..."),
            LineClass::HostDown
        );
        assert_eq!(
            classify("MAC Address: 00:11:22:33:44:55 (Vendor)"),
            LineClass::MacAddress
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        // contains both "open" and "MAC Address"; "open" sits earlier in the table
        assert_eq!(
            classify("open port reported near MAC Address 00:11:22:33:44:55"),
            LineClass::OpenPort
        );
        // "closed" outranks "Host is up"
        assert_eq!(
            classify("Host is up but 80/tcp closed http"),
            LineClass::ClosedPort
        );
    }

    #[test]
    fn classification_is_case_sensitive() {
        assert_eq!(classify("22/tcp OPEN ssh"), LineClass::Plain);
        assert_eq!(classify("mac address: aa:bb"), LineClass::Plain);
    }

    #[test]
    fn open_lines_gain_the_positive_marker_and_keep_their_text() {
        let rendered = render("22/tcp open ssh");
        assert!(rendered.contains("[+] 22/tcp open ssh"));
    }

    #[test]
    fn negative_and_uncertain_markers() {
        assert!(render("23/tcp closed telnet").contains("[-] 23/tcp closed telnet"));
        assert!(render("53/udp filtered domain").contains("[!] 53/udp filtered domain"));
    }

    #[test]
    fn report_header_is_preceded_by_a_blank_line() {
        let rendered = render("Nmap scan report for 192.168.1.1");
        assert!(rendered.starts_with('\n'));
        assert!(rendered.contains("Nmap scan report for 192.168.1.1"));
    }

    #[test]
    fn unclassified_lines_pass_through_unchanged() {
        for line in [
            "Not shown: 997 ignored states",
            "PORT    STATE SERVICE",
            "",
            "Read data files from: /usr/bin/../share/nmap",
        ] {
            assert_eq!(render(line), line);
        }
    }
}
